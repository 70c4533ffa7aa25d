//! Record output port trait.

use crate::domain::error::MasweepError;
use crate::domain::stats::BacktestRecord;

/// Port for persisting backtest records.
pub trait ReportPort {
    /// Append `records` to the report, preserving rows from earlier runs.
    fn append(&self, records: &[BacktestRecord]) -> Result<(), MasweepError>;
}
