//! Tabular product export
//!
//! One row per product, columns in a fixed order under Russian headers so the
//! file opens directly in a spreadsheet.

use crate::output::traits::{OutputResult, ProductSink};
use crate::product::ProductRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Column headers, in export order
pub const CSV_HEADERS: [&str; 6] = [
    "Название",
    "Цена",
    "Наличие",
    "Категория",
    "Ссылка",
    "Изображение",
];

/// Writes records as a CSV table
#[derive(Debug, Clone)]
pub struct CsvOutput {
    path: PathBuf,
}

impl CsvOutput {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProductSink for CsvOutput {
    fn write_products(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADERS)?;
        for record in records {
            writer.write_record(csv_row(record))?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(())
    }
}

fn csv_row(record: &ProductRecord) -> [&str; 6] {
    [
        record.name.as_str(),
        record.price.as_deref().unwrap_or_default(),
        record.in_stock.as_str(),
        record.category.as_str(),
        record.url.as_ref().map(|u| u.as_str()).unwrap_or_default(),
        record.image.as_ref().map(|u| u.as_str()).unwrap_or_default(),
    ]
}
