//! Medrec Core Library
//!
//! Single-user, in-process patient record manager. The store keeps every
//! patient (and that patient's ordered visit history) in memory; the codec
//! persists the whole store to a line-oriented text file between runs.
//!
//! # Persisted format
//!
//! ```text
//! PATIENT,<id>,<fullName>,<age>,<M|F>
//! VISIT,<ownerId>,<diagnosis>,<doctor>,<YYYY-MM-DD>,<amount>,<0|1>
//! ```
//!
//! Each patient line is followed by that patient's visit lines in recording
//! order. Fields are comma-separated with no escaping; free text containing
//! the separator corrupts parsing on reload. This is an accepted constraint
//! of the native format (the [`export`] formats do escape).
//!
//! # Modules
//!
//! - [`models`]: domain types (Patient, Visit, Gender)
//! - [`store`]: in-memory record store and identifier allocator
//! - [`codec`]: line-oriented save/load with per-line error recovery
//! - [`export`]: JSON and CSV snapshot export

pub mod codec;
pub mod export;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use codec::{load_file, save_file, CodecError, FormatError, LineIssue, LoadReport};
pub use models::{today_token, Gender, Patient, PatientId, Visit};
pub use store::{IdAllocator, PatientField, RecordStore, StoreError, ValidationError};
