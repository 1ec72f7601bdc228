use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One discharging interval from the sleep-study trace: the battery charge
/// capacity observed at its start and end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerConsumptionInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub start_capacity: f64,
    pub end_capacity: f64,
}

impl PowerConsumptionInterval {
    /// Charge capacity drained over the interval, in mWh.
    pub fn drained(&self) -> f64 {
        self.start_capacity - self.end_capacity
    }

    pub fn elapsed(&self) -> Duration {
        self.end - self.start
    }
}
