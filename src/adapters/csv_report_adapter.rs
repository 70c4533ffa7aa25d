//! CSV report adapter.
//!
//! Appends one row per (symbol, variant) record. The header is written only
//! when the file does not yet have content, so reruns accumulate rows.

use crate::domain::error::MasweepError;
use crate::domain::stats::BacktestRecord;
use crate::ports::report_port::ReportPort;
use std::fs::OpenOptions;
use std::path::PathBuf;

pub struct CsvReportAdapter {
    path: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReportPort for CsvReportAdapter {
    fn append(&self, records: &[BacktestRecord]) -> Result<(), MasweepError> {
        if records.is_empty() {
            return Ok(());
        }

        let existing = std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MasweepError::Report {
                reason: format!("{}: {e}", self.path.display()),
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!existing)
            .from_writer(file);

        for record in records {
            writer.serialize(record).map_err(|e| MasweepError::Report {
                reason: e.to_string(),
            })?;
        }
        writer.flush().map_err(|e| MasweepError::Report {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::RawAccountStatistics;
    use crate::domain::variant::{AveragingMethod, StrategyVariant};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_record(symbol: &str) -> BacktestRecord {
        let raw = RawAccountStatistics {
            start_balance: 10_000.0,
            end_balance: 10_500.0,
            max_drawdown: 0.05,
            profit_loss_ratio: 1.3,
            win_rate: 0.55,
        };
        let variant = StrategyVariant::new(AveragingMethod::Sma, 5, 20, 0.2).unwrap();
        crate::domain::stats::derive(
            &raw,
            1000.0,
            10,
            &variant,
            symbol,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let adapter = CsvReportAdapter::new(path.clone());

        adapter.append(&[sample_record("A"), sample_record("B")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("method,short_window,long_window,symbol"));
        assert!(lines[1].contains(",A,"));
    }

    #[test]
    fn append_does_not_duplicate_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let adapter = CsvReportAdapter::new(path.clone());

        adapter.append(&[sample_record("A")]).unwrap();
        adapter.append(&[sample_record("B")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("method,"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn empty_batch_creates_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let adapter = CsvReportAdapter::new(path.clone());

        adapter.append(&[]).unwrap();
        assert!(!path.exists());
    }
}
