//! Bar representation and the trailing bar window.

use chrono::NaiveDateTime;
use std::collections::VecDeque;

/// One closed price/volume observation for a fixed interval (here, one
/// trading day).
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub volume: f64,
}

/// Fixed-capacity trailing sequence of bars, oldest first.
///
/// Owned exclusively by one orchestrator session. Appending beyond capacity
/// evicts the oldest bar. Capacity is sized to the longest variant window on
/// the symbol plus 3 trailing points for crossover lookback.
#[derive(Debug, Clone)]
pub struct BarWindow {
    capacity: usize,
    bars: VecDeque<Bar>,
}

impl BarWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bars: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, bar: Bar) {
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.back().map(|b| b.timestamp)
    }

    /// Closing prices, oldest to newest.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, oldest to newest.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }
}
