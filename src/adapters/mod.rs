//! Concrete port implementations.

pub mod csv_report_adapter;
pub mod json_checkpoint_adapter;
pub mod json_config_adapter;
pub mod replay_engine;
