//! Market simulation engine port traits.
//!
//! The engine owns order matching, margin calculation, fill simulation, and
//! realized P&L bookkeeping; this crate only drives it bar by bar and reads
//! its statistics at the end. One session covers one symbol's full date range
//! with one simulated account per strategy variant.

use crate::domain::bar::Bar;
use crate::domain::config::Credentials;
use crate::domain::error::MasweepError;
use crate::domain::stats::RawAccountStatistics;
use chrono::NaiveDate;

/// Daily bar granularity, in seconds.
pub const DAILY_BAR_SECONDS: u64 = 60 * 60 * 24;

/// Result of one blocking engine update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    /// New market/simulation state is available.
    Market,
    /// The configured date range is exhausted; terminal.
    Finished,
}

#[derive(Debug, Clone)]
pub struct SessionRequest<'a> {
    /// Number of independent simulated accounts (one per variant).
    pub accounts: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub credentials: &'a Credentials,
}

/// One open simulation session. Not shared across threads; each orchestrator
/// worker exclusively owns its session.
pub trait SimSession: Send {
    /// Subscribe to a symbol's bar stream with `depth` bars of trailing
    /// history.
    fn subscribe_bars(
        &mut self,
        symbol: &str,
        bar_seconds: u64,
        depth: usize,
    ) -> Result<(), MasweepError>;

    /// Per-unit margin requirement for the subscribed instrument.
    fn margin(&self, symbol: &str) -> Result<f64, MasweepError>;

    /// Block until the engine reports new state or termination.
    fn wait_update(&mut self) -> Result<SessionUpdate, MasweepError>;

    /// Current trailing bar window, oldest to newest. The last element is
    /// the most recent bar; its timestamp changes exactly when a new bar
    /// arrives.
    fn bars(&self) -> &[Bar];

    /// Forward a target-position command to one account.
    fn set_target_volume(
        &mut self,
        symbol: &str,
        account: usize,
        volume: i64,
    ) -> Result<(), MasweepError>;

    /// Lifetime statistics for one account; read after termination.
    fn read_statistics(&self, account: usize) -> Result<RawAccountStatistics, MasweepError>;

    fn close(&mut self);
}

/// Factory for simulation sessions. Shared across worker threads.
pub trait SimulationPort: Send + Sync {
    fn open_session(&self, request: &SessionRequest<'_>)
    -> Result<Box<dyn SimSession>, MasweepError>;
}
