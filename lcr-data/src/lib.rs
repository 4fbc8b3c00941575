//! In-memory SQLite store for Lower Colorado River source data.
//!
//! The accounting engine does not fetch or scrape anything itself. Annual
//! report volumes and daily gauge/storage readings are produced elsewhere,
//! exported as CSV and loaded here. The engine then reads series by key.
//!
//! # Key conventions
//!
//! - Lakes: `{lake}.inflow`, `{lake}.release`, `{lake}.release.rise`,
//!   `{lake}.side_inflow`, `{lake}.bypass`, `{lake}.evaporation`,
//!   `{lake}.storage` (daily)
//! - USGS gauges: `usgs.grand_canyon`, `usgs.virgin_river`, `usgs.las_vegas_wash`
//! - Water users: `{state}.{user}.diversion`, `{state}.{user}.returns`,
//!   `{state}.{user}.cu`
//!
//! # Usage
//!
//! ```rust
//! use lcr_data::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_annual("mead.release,2020,8500000\nmead.release,2021,8200000\n").unwrap();
//! let release = db.query_annual("mead.release").unwrap().unwrap();
//! assert_eq!(release.len(), 2);
//! ```

mod loader;
pub mod module;
mod queries;
pub mod schema;

pub use module::{StateModule, UserSeries};

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database of keyed annual and daily series.
///
/// Cheaply cloneable (via `Rc`); every clone sees the same connection.
/// The engine is single-threaded so no locking is involved.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new, empty in-memory database with the schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
