//! Save/load round-trip and recovery tests against real files.

use std::fs;
use std::path::PathBuf;

use medrec_core::{load_file, save_file, FormatError, Gender, RecordStore, Visit};
use proptest::prelude::*;
use tempfile::TempDir;

fn record_path(dir: &TempDir) -> PathBuf {
    dir.path().join("records.txt")
}

#[test]
fn test_round_trip_preserves_patients_and_visits() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);

    let mut store = RecordStore::new();
    let alice = store.register_patient("Alice Smith", 30, Gender::Female).unwrap();
    let bob = store.register_patient("Bob Jones", 45, Gender::Male).unwrap();
    store
        .record_visit(
            alice,
            Visit::new("flu".into(), "Dr House".into(), "2026-01-05".into(), 120.5, true),
        )
        .unwrap();
    store
        .record_visit(
            alice,
            Visit::new("follow up".into(), "Dr Grey".into(), "2026-02-10".into(), 80.0, false),
        )
        .unwrap();
    store
        .record_visit(
            bob,
            Visit::new("sprain".into(), "Dr Lee".into(), "2026-03-15".into(), 60.0, false),
        )
        .unwrap();

    save_file(&store, &path).unwrap();

    let mut reloaded = RecordStore::new();
    let report = load_file(&mut reloaded, &path).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.patients, 2);
    assert_eq!(report.visits, 3);
    assert_eq!(reloaded.patients(), store.patients());
}

#[test]
fn test_worked_example_with_clamped_amount() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);

    let mut store = RecordStore::new();
    let alice = store.register_patient("Alice Smith", 30, Gender::Female).unwrap();
    assert_eq!(alice, 1);
    let bob = store.register_patient("Bob Jones", 45, Gender::Male).unwrap();
    assert_eq!(bob, 2);

    store
        .record_visit(
            alice,
            Visit::new("checkup".into(), "Dr Lee".into(), "2026-04-01".into(), -5.0, false),
        )
        .unwrap();

    save_file(&store, &path).unwrap();
    let mut reloaded = RecordStore::new();
    load_file(&mut reloaded, &path).unwrap();

    assert_eq!(reloaded.len(), 2);
    let alice = reloaded.find_by_id(1).unwrap();
    assert_eq!(alice.name, "Alice Smith");
    assert_eq!(alice.visits.len(), 1);
    assert_eq!(alice.visits[0].amount, 0.0);
    let bob = reloaded.find_by_id(2).unwrap();
    assert_eq!(bob.name, "Bob Jones");
    assert_eq!(bob.age, 45);
}

#[test]
fn test_missing_file_loads_empty_store() {
    let dir = TempDir::new().unwrap();
    let mut store = RecordStore::new();

    let report = load_file(&mut store, dir.path().join("absent.txt")).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.patients, 0);
    assert!(store.is_empty());
}

#[test]
fn test_allocator_advanced_past_loaded_ids() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);
    fs::write(&path, "PATIENT,7,Carol White,52,F\nPATIENT,3,Dan Black,40,M\n").unwrap();

    let mut store = RecordStore::new();
    load_file(&mut store, &path).unwrap();

    let next = store.register_patient("Eve Green", 25, Gender::Female).unwrap();
    assert_eq!(next, 8);
}

#[test]
fn test_out_of_order_visit_falls_back_to_owner_lookup() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);
    fs::write(
        &path,
        "PATIENT,1,Alice Smith,30,F\n\
         PATIENT,2,Bob Jones,45,M\n\
         VISIT,1,flu,Dr House,2026-01-05,120.5,1\n\
         VISIT,2,sprain,Dr Lee,2026-03-15,60,0\n",
    )
    .unwrap();

    let mut store = RecordStore::new();
    let report = load_file(&mut store, &path).unwrap();

    assert!(report.is_clean());
    assert_eq!(store.find_by_id(1).unwrap().visits.len(), 1);
    assert_eq!(store.find_by_id(2).unwrap().visits.len(), 1);
}

#[test]
fn test_orphan_visit_is_skipped_and_reported() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);
    fs::write(
        &path,
        "PATIENT,1,Alice Smith,30,F\n\
         VISIT,9,flu,Dr House,2026-01-05,120.5,1\n\
         VISIT,1,checkup,Dr Lee,2026-02-01,40,0\n",
    )
    .unwrap();

    let mut store = RecordStore::new();
    let report = load_file(&mut store, &path).unwrap();

    assert_eq!(report.patients, 1);
    assert_eq!(report.visits, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].line, 2);
    assert_eq!(report.issues[0].error, FormatError::UnknownOwner(9));
    assert_eq!(store.find_by_id(1).unwrap().visits.len(), 1);
}

#[test]
fn test_visit_before_any_patient_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);
    fs::write(
        &path,
        "VISIT,1,flu,Dr House,2026-01-05,120.5,1\n\
         PATIENT,1,Alice Smith,30,F\n",
    )
    .unwrap();

    let mut store = RecordStore::new();
    let report = load_file(&mut store, &path).unwrap();

    assert_eq!(report.patients, 1);
    assert_eq!(report.visits, 0);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].error, FormatError::VisitBeforePatient);
    assert!(store.find_by_id(1).unwrap().visits.is_empty());
}

#[test]
fn test_malformed_lines_do_not_block_the_rest() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);
    fs::write(
        &path,
        "PATIENT,1,Alice Smith,30,F\n\
         PATIENT,two,Bob Jones,45,M\n\
         GARBAGE LINE\n\
         VISIT,1,flu,Dr House,2026-01-05,lots,1\n\
         PATIENT,2,Carol White,52,F\n\
         VISIT,2,sprain,Dr Lee,2026-03-15,60,0\n",
    )
    .unwrap();

    let mut store = RecordStore::new();
    let report = load_file(&mut store, &path).unwrap();

    assert_eq!(report.patients, 2);
    assert_eq!(report.visits, 1);
    assert_eq!(report.issues.len(), 3);
    let lines: Vec<usize> = report.issues.iter().map(|i| i.line).collect();
    assert_eq!(lines, vec![2, 3, 4]);
    assert!(store.find_by_id(1).is_some());
    assert!(store.find_by_id(2).is_some());
}

#[test]
fn test_save_order_matches_store_order() {
    let dir = TempDir::new().unwrap();
    let path = record_path(&dir);

    let mut store = RecordStore::new();
    let a = store.register_patient("Alice Smith", 30, Gender::Female).unwrap();
    store.register_patient("Bob Jones", 45, Gender::Male).unwrap();
    store
        .record_visit(
            a,
            Visit::new("flu".into(), "Dr House".into(), "2026-01-05".into(), 120.5, true),
        )
        .unwrap();

    save_file(&store, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "PATIENT,1,Alice Smith,30,F");
    assert_eq!(lines[1], "VISIT,1,flu,Dr House,2026-01-05,120.5,1");
    assert_eq!(lines[2], "PATIENT,2,Bob Jones,45,M");
}

fn visit_strategy() -> impl Strategy<Value = Visit> {
    (
        "[A-Za-z0-9 ]{1,20}",
        "[A-Za-z ]{1,15}",
        "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        0.0f64..10_000.0,
        any::<bool>(),
    )
        .prop_map(|(diagnosis, doctor, date, amount, emergency)| {
            Visit::new(diagnosis, doctor, date, amount, emergency)
        })
}

fn patient_strategy() -> impl Strategy<Value = (String, u32, bool, Vec<Visit>)> {
    (
        "[A-Za-z]{1,12}( [A-Za-z]{1,12})?",
        0u32..120,
        any::<bool>(),
        proptest::collection::vec(visit_strategy(), 0..4),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_equality(entries in proptest::collection::vec(patient_strategy(), 0..8)) {
        let mut store = RecordStore::new();
        for (name, age, is_male, visits) in &entries {
            let gender = if *is_male { Gender::Male } else { Gender::Female };
            let id = store.register_patient(name, *age, gender).unwrap();
            for visit in visits {
                store.record_visit(id, visit.clone()).unwrap();
            }
        }

        let dir = TempDir::new().unwrap();
        let path = record_path(&dir);
        save_file(&store, &path).unwrap();

        let mut reloaded = RecordStore::new();
        let report = load_file(&mut reloaded, &path).unwrap();

        prop_assert!(report.is_clean());
        prop_assert_eq!(reloaded.patients(), store.patients());
    }
}
