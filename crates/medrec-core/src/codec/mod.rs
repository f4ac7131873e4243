//! Line-oriented persistence for the record store.
//!
//! Save emits one `PATIENT` line per patient in store order, each followed
//! by that patient's `VISIT` lines in history order. Load is best-effort:
//! a line that cannot be parsed, or a visit whose owner cannot be found, is
//! skipped and reported in the [`LoadReport`] rather than aborting the run.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Gender, Patient, PatientId, Visit};
use crate::store::RecordStore;

const PATIENT_TAG: &str = "PATIENT";
const VISIT_TAG: &str = "VISIT";
const PATIENT_FIELDS: usize = 5;
const VISIT_FIELDS: usize = 7;

/// Per-line parse failures.
#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("unknown record tag: {0}")]
    UnknownTag(String),

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid {field}: {value}")]
    InvalidInt { field: &'static str, value: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid gender: {0}")]
    InvalidGender(String),

    #[error("invalid emergency flag: {0}")]
    InvalidFlag(String),

    #[error("visit references unknown patient {0}")]
    UnknownOwner(PatientId),

    #[error("visit record before any patient record")]
    VisitBeforePatient,
}

/// Codec errors. Per-line problems are not errors; see [`LoadReport`].
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// One skipped input line.
#[derive(Debug)]
pub struct LineIssue {
    /// 1-based line number in the input file
    pub line: usize,
    pub error: FormatError,
}

/// Outcome of a load: record counts plus the lines that were skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub patients: usize,
    pub visits: usize,
    pub issues: Vec<LineIssue>,
}

impl LoadReport {
    /// True when every line of the input was consumed.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Write the whole store to `path`, replacing any existing file.
///
/// The in-memory store is never modified; a mid-write failure surfaces as
/// an [`CodecError::Io`] and leaves whatever was written on disk.
pub fn save_file<P: AsRef<Path>>(store: &RecordStore, path: P) -> CodecResult<()> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    for patient in store.iter() {
        writeln!(out, "{}", patient_line(patient))?;
        for visit in &patient.visits {
            writeln!(out, "{}", visit_line(patient.id, visit))?;
        }
    }
    out.flush()?;
    debug!(path = %path.as_ref().display(), patients = store.len(), "store saved");
    Ok(())
}

/// Read `path` into `store`, line by line.
///
/// A missing file is an empty store, not an error. After the last line the
/// store's allocator is advanced past the largest loaded identifier, so
/// later registrations never collide with persisted ones.
pub fn load_file<P: AsRef<Path>>(store: &mut RecordStore, path: P) -> CodecResult<LoadReport> {
    let file = match File::open(path.as_ref()) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.as_ref().display(), "record file absent, starting empty");
            return Ok(LoadReport::default());
        }
        Err(e) => return Err(e.into()),
    };

    let reader = BufReader::new(file);
    let mut report = LoadReport::default();
    let mut max_id: PatientId = 0;
    let mut seen_patient = false;

    for (idx, raw) in reader.lines().enumerate() {
        let raw = raw?;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;

        match parse_line(line) {
            Ok(Record::Patient(patient)) => {
                max_id = max_id.max(patient.id);
                store.add_patient(patient);
                seen_patient = true;
                report.patients += 1;
            }
            Ok(Record::Visit { owner, visit }) => {
                // record_visit can only fail with NotFound here
                match store.record_visit(owner, visit) {
                    Ok(()) => report.visits += 1,
                    Err(_) => {
                        let error = if seen_patient {
                            FormatError::UnknownOwner(owner)
                        } else {
                            FormatError::VisitBeforePatient
                        };
                        warn!(line = line_no, %error, "skipping visit record");
                        report.issues.push(LineIssue { line: line_no, error });
                    }
                }
            }
            Err(error) => {
                warn!(line = line_no, %error, "skipping malformed record");
                report.issues.push(LineIssue { line: line_no, error });
            }
        }
    }

    store.advance_allocator_past(max_id);
    Ok(report)
}

#[derive(Debug)]
enum Record {
    Patient(Patient),
    Visit { owner: PatientId, visit: Visit },
}

fn patient_line(patient: &Patient) -> String {
    format!(
        "{},{},{},{},{}",
        PATIENT_TAG,
        patient.id,
        patient.name,
        patient.age,
        patient.gender.as_char()
    )
}

fn visit_line(owner: PatientId, visit: &Visit) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        VISIT_TAG,
        owner,
        visit.diagnosis,
        visit.doctor,
        visit.date,
        visit.amount,
        u8::from(visit.emergency)
    )
}

fn parse_line(line: &str) -> Result<Record, FormatError> {
    let fields: Vec<&str> = line.split(',').collect();
    match fields[0] {
        PATIENT_TAG => parse_patient(&fields).map(Record::Patient),
        VISIT_TAG => parse_visit(&fields).map(|(owner, visit)| Record::Visit { owner, visit }),
        tag => Err(FormatError::UnknownTag(tag.to_string())),
    }
}

fn parse_patient(fields: &[&str]) -> Result<Patient, FormatError> {
    if fields.len() != PATIENT_FIELDS {
        return Err(FormatError::FieldCount {
            expected: PATIENT_FIELDS,
            found: fields.len(),
        });
    }
    let id = parse_id(fields[1])?;
    let age = parse_u32("age", fields[3])?;
    let gender = parse_gender(fields[4])?;
    Ok(Patient::new(id, fields[2].to_string(), age, gender))
}

fn parse_visit(fields: &[&str]) -> Result<(PatientId, Visit), FormatError> {
    if fields.len() != VISIT_FIELDS {
        return Err(FormatError::FieldCount {
            expected: VISIT_FIELDS,
            found: fields.len(),
        });
    }
    let owner = parse_id(fields[1])?;
    let amount = parse_amount(fields[5])?;
    let emergency = parse_flag(fields[6])?;
    Ok((
        owner,
        Visit::new(
            fields[2].to_string(),
            fields[3].to_string(),
            fields[4].to_string(),
            amount,
            emergency,
        ),
    ))
}

fn parse_u32(field: &'static str, value: &str) -> Result<u32, FormatError> {
    value.parse().map_err(|_| FormatError::InvalidInt {
        field,
        value: value.to_string(),
    })
}

/// Identifiers are strictly positive.
fn parse_id(value: &str) -> Result<PatientId, FormatError> {
    match parse_u32("id", value)? {
        0 => Err(FormatError::InvalidInt {
            field: "id",
            value: value.to_string(),
        }),
        id => Ok(id),
    }
}

fn parse_amount(value: &str) -> Result<f64, FormatError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormatError::InvalidAmount(value.to_string())),
    }
}

fn parse_gender(value: &str) -> Result<Gender, FormatError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            Gender::from_char(c).ok_or_else(|| FormatError::InvalidGender(value.to_string()))
        }
        _ => Err(FormatError::InvalidGender(value.to_string())),
    }
}

fn parse_flag(value: &str) -> Result<bool, FormatError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(FormatError::InvalidFlag(other.to_string())),
    }
}
