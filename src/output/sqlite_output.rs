//! SQLite product export
//!
//! Each harvest is recorded as a row in `runs`; its products reference it.

use crate::output::traits::{OutputResult, ProductSink};
use crate::product::ProductRecord;
use crate::state::RunStatus;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL schema for the product database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Harvested products
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    name TEXT NOT NULL,
    url TEXT,
    price TEXT,
    image TEXT,
    in_stock TEXT NOT NULL,
    category TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_run ON products(run_id);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
"#;

/// Status of a run whose products are still being written
const RUNNING: &str = "running";

/// SQLite product sink bound to one run
pub struct SqliteOutput {
    conn: Connection,
    run_id: i64,
}

impl SqliteOutput {
    /// Opens (or creates) the database and starts a run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration used for the run
    /// * `started_at` - When the harvest started
    pub fn open(path: &Path, config_hash: &str, started_at: DateTime<Utc>) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        Self::start(conn, config_hash, started_at)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start(conn, config_hash, Utc::now())
    }

    fn start(conn: Connection, config_hash: &str, started_at: DateTime<Utc>) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![started_at.to_rfc3339(), config_hash, RUNNING],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Started database run {}", run_id);
        Ok(Self { conn, run_id })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Marks the run finished with the given status
    pub fn finish_run(&mut self, status: RunStatus) -> OutputResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, self.run_id],
        )?;
        Ok(())
    }

    /// Number of products stored for this run
    pub fn count_products(&self) -> OutputResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Stored status of this run
    pub fn run_status(&self) -> OutputResult<Option<RunStatus>> {
        let status: String = self.conn.query_row(
            "SELECT status FROM runs WHERE id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(RunStatus::from_db_string(&status))
    }
}

impl ProductSink for SqliteOutput {
    fn write_products(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO products (run_id, name, url, price, image, in_stock, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in records {
                stmt.execute(params![
                    self.run_id,
                    record.name,
                    record.url.as_ref().map(|u| u.as_str()),
                    record.price,
                    record.image.as_ref().map(|u| u.as_str()),
                    record.in_stock,
                    record.category,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Stored {} records in run {}", records.len(), self.run_id);
        Ok(())
    }
}
