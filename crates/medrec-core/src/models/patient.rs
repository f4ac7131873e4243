//! Patient models.

use serde::{Deserialize, Serialize};

use super::Visit;
use crate::store::ValidationError;

/// Identifier assigned to a patient by the store's allocator.
///
/// Strictly positive, unique across a store, never reused.
pub type PatientId = u32;

/// Patient gender as recorded at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the single-character wire form (`M`/`F`).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'M' => Some(Self::Male),
            'F' => Some(Self::Female),
            _ => None,
        }
    }

    /// Single-character wire form.
    pub fn as_char(&self) -> char {
        match self {
            Self::Male => 'M',
            Self::Female => 'F',
        }
    }
}

impl TryFrom<char> for Gender {
    type Error = ValidationError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or(ValidationError::InvalidGender(c))
    }
}

/// A patient record with its full visit history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Allocator-assigned identifier
    pub id: PatientId,
    /// Full name (alphabetic characters and whitespace only)
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender
    pub gender: Gender,
    /// Visit history in recording order (append-only)
    pub visits: Vec<Visit>,
}

impl Patient {
    /// Create a patient with an empty visit history.
    pub fn new(id: PatientId, name: String, age: u32, gender: Gender) -> Self {
        Self {
            id,
            name,
            age,
            gender,
            visits: Vec::new(),
        }
    }

    /// Number of recorded visits.
    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    /// Sum of all visit amounts.
    pub fn total_billed(&self) -> f64 {
        self.visits.iter().map(|v| v.amount).sum()
    }
}
