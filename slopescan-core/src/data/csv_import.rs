//! Local CSV directory provider.
//!
//! One file per symbol, `{dir}/{symbol}.csv`, with a `date,close,volume`
//! header. Extra columns are ignored. Volume may be written as a float.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    close: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

/// Read every row of a close/volume CSV file.
pub fn read_csv_bars(path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let csv_err = |message: String| DataError::Csv {
        path: path.display().to_string(),
        message,
    };
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_err(e.to_string()))?;
    reader
        .deserialize::<CsvRow>()
        .map(|row| {
            let row = row.map_err(|e| csv_err(e.to_string()))?;
            Ok(PriceBar::new(
                row.date,
                row.close.unwrap_or(f64::NAN),
                row.volume.map(|v| v.max(0.0).round() as u64).unwrap_or(0),
            ))
        })
        .collect()
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars: Vec<PriceBar> = read_csv_bars(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        if bars.is_empty() {
            return Err(DataError::EmptyRange {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}
