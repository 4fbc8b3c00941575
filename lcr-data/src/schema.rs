//! SQL schema for the in-memory series store.

/// Returns the full SQL schema as a single batch string.
///
/// - `annual_series` - one value per (key, year), acre-feet
/// - `daily_series` - one value per (key, date), date as `YYYYMMDD`
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS annual_series (
        key TEXT NOT NULL,
        year INTEGER NOT NULL,
        value REAL NOT NULL,
        PRIMARY KEY (key, year)
    );
    CREATE INDEX IF NOT EXISTS idx_annual_key ON annual_series(key);

    CREATE TABLE IF NOT EXISTS daily_series (
        key TEXT NOT NULL,
        date TEXT NOT NULL,
        value REAL NOT NULL,
        PRIMARY KEY (key, date)
    );
    CREATE INDEX IF NOT EXISTS idx_daily_key ON daily_series(key);
    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema())
            .expect("Schema SQL should be valid");
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        for table in &["annual_series", "daily_series"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table '{}' should exist", table);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute_batch(create_schema())
            .expect("Applying schema twice should succeed due to IF NOT EXISTS");
    }
}
