//! Dining philosophers resource-ordering protocol.
//!
//! The classic deadlock-free formulation: a single table lock, a condition
//! variable per seat, and a grant predicate checked against the full state
//! vector. A philosopher transitions `Thinking -> Hungry -> Eating ->
//! Thinking`; eating is granted only when neither neighbor is eating, so no
//! seat ever holds one fork while waiting for the other.

mod error;
mod table;

pub use error::{TableError, TableResult};
pub use table::{DiningTable, PhilosopherState};

use serde::Serialize;

/// Snapshot of per-seat dining statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableStats {
    /// Number of seats.
    pub seats: usize,
    /// Meals eaten per seat.
    pub meals: Vec<u64>,
    /// Running mean wait before eating per seat, in seconds.
    pub avg_wait_secs: Vec<f64>,
    /// Meals per minute per seat, over the table lifetime.
    pub meals_per_min: Vec<f64>,
    /// Seconds since the table was constructed.
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize() {
        let stats = TableStats {
            seats: 5,
            meals: vec![3, 3, 3, 3, 3],
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["seats"], 5);
        assert_eq!(json["meals"][4], 3);
    }
}
