//! Output module for exporting harvested products
//!
//! This module handles:
//! - Writing the product set as JSON
//! - Writing the product set as a CSV table
//! - Recording runs and products in SQLite
//! - Computing and printing harvest statistics

mod csv_output;
mod json_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::{CsvOutput, CSV_HEADERS};
pub use json_output::JsonOutput;
pub use sqlite_output::SqliteOutput;
pub use stats::{print_statistics, HarvestStatistics};
pub use traits::{OutputError, OutputResult, ProductSink};

use crate::config::OutputConfig;
use crate::crawler::CrawlReport;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Writes the report to every configured sink
///
/// # Arguments
///
/// * `config` - Output section of the configuration
/// * `report` - The finished harvest report
/// * `config_hash` - Hash of the configuration, recorded with the database run
/// * `started_at` - When the harvest started
///
/// # Returns
///
/// * `Ok(())` - Every configured sink was written
/// * `Err(OutputError)` - A sink could not be written
pub fn write_outputs(
    config: &OutputConfig,
    report: &CrawlReport,
    config_hash: &str,
    started_at: DateTime<Utc>,
) -> OutputResult<()> {
    if let Some(path) = &config.json_path {
        JsonOutput::new(path).write_products(report.records())?;
    }

    if let Some(path) = &config.csv_path {
        CsvOutput::new(path).write_products(report.records())?;
    }

    if let Some(path) = &config.database_path {
        let mut output = SqliteOutput::open(Path::new(path), config_hash, started_at)?;
        output.write_products(report.records())?;
        output.finish_run(report.status())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_outputs_to_both_sinks() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("products.json");
        let csv_path = dir.path().join("products.csv");
        let db_path = dir.path().join("products.db");
        let config = OutputConfig {
            json_path: Some(json_path.to_string_lossy().into_owned()),
            csv_path: Some(csv_path.to_string_lossy().into_owned()),
            database_path: Some(db_path.to_string_lossy().into_owned()),
        };

        write_outputs(&config, &CrawlReport::new(), "hash", Utc::now()).unwrap();

        assert!(json_path.exists());
        assert!(csv_path.exists());
        assert!(db_path.exists());
    }

    #[test]
    fn test_write_outputs_without_sinks() {
        let config = OutputConfig {
            json_path: None,
            csv_path: None,
            database_path: None,
        };
        write_outputs(&config, &CrawlReport::new(), "hash", Utc::now()).unwrap();
    }
}
