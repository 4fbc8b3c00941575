//! Lake/reach flow accounting and consumptive-use loss apportionment for
//! the Lower Colorado River.
//!
//! A [`Model`] owns a chain of [`Lake`]s and the [`Reach`]es between them,
//! and four [`State`]s whose users divert from specific reaches. Each
//! reach carries a fixed annual loss (evaporation, corridor losses). A run
//! charges that loss to every user active at or below the reach, first
//! per state and then per user, in proportion to average consumptive use.
//!
//! ```rust
//! use lcr_data::Database;
//! use lcr_model::Model;
//!
//! let db = Database::new().unwrap();
//! db.load_annual("nv.snwa.cu,2020,200000\naz.cap.cu,2020,1500000\n").unwrap();
//!
//! let mut model = Model::new("base");
//! model.initialize(&db, 2020, 2020, 10).unwrap();
//! let result = model.run(2020, 2020).unwrap();
//! // Nevada shares Reach1's Lake Mead evaporation with CAP, downstream.
//! let nevada = result.state("nv").unwrap();
//! assert!((nevada.loss_assessment - 200_000.0 / 1_700_000.0 * 580_000.0).abs() < 1e-6);
//! ```

pub mod apportionment;
pub mod error;
pub mod lake;
pub mod model;
pub mod options;
pub mod reach;
pub mod roster;
pub mod state;
pub mod user;

pub use apportionment::{Apportionment, StateTotal, Summary, UserAssessment, UserTotal};
pub use error::ModelError;
pub use lake::{Lake, LakeRegistry, LakeSpec};
pub use model::Model;
pub use options::{LossConstants, ModelOptions};
pub use reach::{Reach, ReachKind, ReachRun, StateAssessment};
pub use state::{State, StateRegistry};
pub use user::{User, UserId};
