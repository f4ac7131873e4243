//! Visit models.

use serde::{Deserialize, Serialize};

/// One clinical encounter in a patient's history.
///
/// A visit has no identity of its own; it is addressed only by its position
/// in the owning patient's visit sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Diagnosis text
    pub diagnosis: String,
    /// Assigned doctor
    pub doctor: String,
    /// Calendar date token (`YYYY-MM-DD`), stored opaquely
    pub date: String,
    /// Billed amount, never negative
    pub amount: f64,
    /// Emergency admission flag
    pub emergency: bool,
}

impl Visit {
    /// Create a visit. A negative amount is clamped to zero rather than
    /// rejected.
    pub fn new(diagnosis: String, doctor: String, date: String, amount: f64, emergency: bool) -> Self {
        Self {
            diagnosis,
            doctor,
            date,
            amount: amount.max(0.0),
            emergency,
        }
    }
}

/// Date token for a visit recorded today, in the `YYYY-MM-DD` form the
/// core stores opaquely.
pub fn today_token() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
