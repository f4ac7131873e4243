//! Read-only snapshot export.
//!
//! Unlike the native persistence format, export output escapes embedded
//! separators; these formats are write-only and never reloaded.

use crate::store::RecordStore;

/// Export every patient (with visit history) as pretty-printed JSON.
pub fn snapshot_json(store: &RecordStore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(store.patients())
}

/// Export one CSV row per visit, with a header row.
pub fn visits_csv(store: &RecordStore) -> String {
    let mut csv = String::new();

    csv.push_str("patient_id,name,date,diagnosis,doctor,amount,emergency\n");

    for patient in store.iter() {
        for visit in &patient.visits {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                patient.id,
                escape_csv(&patient.name),
                escape_csv(&visit.date),
                escape_csv(&visit.diagnosis),
                escape_csv(&visit.doctor),
                visit.amount,
                u8::from(visit.emergency),
            ));
        }
    }

    csv
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
