//! Concurrent moving-average crossover sweep backtester.
//!
//! Laid out hexagonally: core logic lives in [`domain`] and talks to the
//! outside world only through the traits in [`ports`], which [`adapters`]
//! implement.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
