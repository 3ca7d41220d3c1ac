use std::collections::BTreeMap;
use std::fs;

use muse_flow::ResponseRecord;
use muse_store::{export, read_table, CsvStore};
use tempfile::tempdir;

fn record(pairs: &[(&str, &str)]) -> ResponseRecord {
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ResponseRecord::from_fields(fields)
}

#[test]
fn append_then_load_returns_the_row() {
    let dir = tempdir().expect("tempdir");
    let store = CsvStore::new(dir.path().join("responses.csv"));

    store
        .append(&record(&[
            ("participant_id", "p-001"),
            ("science_technology_response", "Fast Charge Wins"),
        ]))
        .expect("append");

    let table = store.load().expect("load");
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.columns,
        vec!["participant_id", "science_technology_response"]
    );
    assert_eq!(table.rows[0], vec!["p-001", "Fast Charge Wins"]);
}

#[test]
fn schema_drift_union_pads_with_empty_cells() {
    let dir = tempdir().expect("tempdir");
    let store = CsvStore::new(dir.path().join("responses.csv"));

    store
        .append(&record(&[("participant_id", "p-001"), ("age", "29")]))
        .expect("append first");
    // Second record drops a column and introduces a new one.
    store
        .append(&record(&[
            ("participant_id", "p-002"),
            ("overall_trust", "4"),
        ]))
        .expect("append second");

    let table = store.load().expect("load");
    assert_eq!(table.len(), 2);
    assert_eq!(table.columns, vec!["age", "participant_id", "overall_trust"]);
    assert_eq!(table.rows[0], vec!["29", "p-001", ""]);
    assert_eq!(table.rows[1], vec!["", "p-002", "4"]);
}

#[test]
fn export_load_round_trip_is_exact() {
    let dir = tempdir().expect("tempdir");
    let store = CsvStore::new(dir.path().join("responses.csv"));
    store
        .append(&record(&[("a", "1"), ("b", "with, comma and \"quotes\"")]))
        .expect("append");
    store.append(&record(&[("a", "2"), ("c", "new")])).expect("append");

    let table = store.load().expect("load");
    let bytes = export(&table).expect("export");
    let reloaded = read_table(&bytes).expect("parse");
    assert_eq!(reloaded, table);
}

#[test]
fn exported_fields_are_all_quoted_utf8() {
    let dir = tempdir().expect("tempdir");
    let store = CsvStore::new(dir.path().join("responses.csv"));
    store
        .append(&record(&[("headline", "Überschrift"), ("rating", "5")]))
        .expect("append");

    let bytes = export(&store.load().expect("load")).expect("export");
    let text = String::from_utf8(bytes).expect("utf-8");
    assert_eq!(text, "\"headline\",\"rating\"\n\"Überschrift\",\"5\"\n");
}

#[test]
fn missing_file_loads_as_an_empty_table() {
    let dir = tempdir().expect("tempdir");
    let store = CsvStore::new(dir.path().join("responses.csv"));
    let table = store.load().expect("load");
    assert!(table.is_empty());
    assert!(table.columns.is_empty());
}

#[test]
fn corrupt_store_is_quarantined_and_reset() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("responses.csv");
    // Ragged row: structural corruption for the strict reader.
    fs::write(&path, "col1,col2\nonly_one_field\n").expect("seed corruption");

    let store = CsvStore::new(&path);
    let table = store.load().expect("load must not fail the caller");
    assert!(table.is_empty());
    assert!(!path.exists(), "corrupt file must be renamed away");

    let quarantined: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .contains("corrupt-")
        })
        .collect();
    assert_eq!(quarantined.len(), 1);

    // The store keeps working after the reset.
    store
        .append(&record(&[("participant_id", "p-003")]))
        .expect("append after quarantine");
    assert_eq!(store.load().expect("load").len(), 1);
}
