//! Core domain types and logic.

pub mod averaging;
pub mod bar;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod signal;
pub mod stats;
pub mod variant;
