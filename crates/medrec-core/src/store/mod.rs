//! In-memory record store and identifier allocator.

use thiserror::Error;

use crate::models::{Gender, Patient, PatientId, Visit};

/// Field-level validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name must contain only alphabetic characters and spaces: {0}")]
    InvalidName(String),

    #[error("gender must be M or F, got: {0}")]
    InvalidGender(char),
}

/// Store errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no patient with id {0}")]
    NotFound(PatientId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A single mutable patient field with its replacement value.
#[derive(Debug, Clone)]
pub enum PatientField {
    Name(String),
    Age(u32),
    Gender(Gender),
}

/// Monotonically increasing patient-identifier allocator.
///
/// Issues identifiers starting at 1. Never reissues a value that has been
/// allocated or observed, except through [`IdAllocator::release`] of the
/// most recently issued one.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: PatientId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next identifier.
    pub fn allocate(&mut self) -> PatientId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Reclaim `id` if it is the most recently issued value and nothing
    /// higher has been issued or observed since; otherwise a no-op.
    pub fn release(&mut self, id: PatientId) {
        if self.next == id + 1 {
            self.next = id;
        }
    }

    /// Ensure the next issued identifier exceeds `id`.
    pub fn advance_past(&mut self, id: PatientId) {
        if id >= self.next {
            self.next = id + 1;
        }
    }

    /// The value the next call to [`IdAllocator::allocate`] would return.
    pub fn peek(&self) -> PatientId {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of all patient records.
///
/// Patients are kept in insertion order; every lookup is a linear scan.
/// The allocator is per-store state, so independent stores never share
/// identifier sequences.
#[derive(Debug, Default)]
pub struct RecordStore {
    patients: Vec<Patient>,
    allocator: IdAllocator,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// All patients in insertion order.
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Iterate patients in insertion order (the save path relies on this).
    pub fn iter(&self) -> std::slice::Iter<'_, Patient> {
        self.patients.iter()
    }

    /// Issue the next patient identifier.
    pub fn allocate_id(&mut self) -> PatientId {
        self.allocator.allocate()
    }

    /// Reclaim an identifier after a registration attempt failed validation.
    /// Only effective for the most recently issued identifier.
    pub fn release_id(&mut self, id: PatientId) {
        self.allocator.release(id);
    }

    /// Advance the allocator past `id` so later registrations never collide
    /// with persisted identifiers.
    pub fn advance_allocator_past(&mut self, id: PatientId) {
        self.allocator.advance_past(id);
    }

    /// Append a patient record verbatim.
    ///
    /// Performs no uniqueness check; callers must supply an identifier from
    /// [`RecordStore::allocate_id`] or one known not to collide (load path).
    pub fn add_patient(&mut self, patient: Patient) {
        self.patients.push(patient);
    }

    /// Look up a patient by identifier.
    pub fn find_by_id(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    fn find_by_id_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.patients.iter_mut().find(|p| p.id == id)
    }

    /// All patients whose full name exactly equals `name` (case-sensitive).
    pub fn find_by_name(&self, name: &str) -> Vec<&Patient> {
        self.patients.iter().filter(|p| p.name == name).collect()
    }

    /// Validate and register a new patient, returning its identifier.
    ///
    /// A failed registration does not consume an identifier.
    pub fn register_patient(
        &mut self,
        name: &str,
        age: u32,
        gender: Gender,
    ) -> Result<PatientId, ValidationError> {
        validate_name(name)?;
        let id = self.allocator.allocate();
        self.patients
            .push(Patient::new(id, name.to_string(), age, gender));
        Ok(id)
    }

    /// Append a visit to the identified patient's history.
    pub fn record_visit(&mut self, id: PatientId, visit: Visit) -> StoreResult<()> {
        let patient = self.find_by_id_mut(id).ok_or(StoreError::NotFound(id))?;
        patient.visits.push(visit);
        Ok(())
    }

    /// Replace one scalar field of the identified patient.
    ///
    /// Applies the same validation as registration; on failure the record is
    /// left unchanged.
    pub fn update_field(&mut self, id: PatientId, field: PatientField) -> StoreResult<()> {
        if let PatientField::Name(name) = &field {
            validate_name(name)?;
        }
        let patient = self.find_by_id_mut(id).ok_or(StoreError::NotFound(id))?;
        match field {
            PatientField::Name(name) => patient.name = name,
            PatientField::Age(age) => patient.age = age,
            PatientField::Gender(gender) => patient.gender = gender,
        }
        Ok(())
    }
}

/// Names must be non-empty and contain only alphabetic characters and
/// whitespace.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !name.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}
