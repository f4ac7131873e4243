//! Domain models for the patient record system.

mod patient;
mod visit;

pub use patient::*;
pub use visit::*;
