use std::fs;

use harvester_core::{AddressScheme, ContentRecord, Extraction, RecordMeta, SectionAddress, SubUnits};
use harvester_engine::{ensure_output_dir, AtomicFileWriter, PersistError, RecordStore};
use tempfile::TempDir;

fn record(units: &[(&str, &str)]) -> ContentRecord {
    let content: SubUnits = units.iter().copied().collect();
    ContentRecord::new(
        RecordMeta {
            title: "Gênesis".into(),
            abbrev: "gn".into(),
        },
        1,
        Extraction::new(content),
    )
    .unwrap()
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("1.json", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "1.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("1.json", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("1.json", "data");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!file_path.with_file_name("1.json").exists());
}

#[test]
fn store_writes_compact_record_under_its_address() {
    let temp = TempDir::new().unwrap();
    let store = RecordStore::new(AddressScheme::new(temp.path()));
    let address = SectionAddress::new("acf", "gn", 1);

    let path = store.write(&address, &record(&[("1", "No princípio")])).unwrap();
    assert_eq!(path, temp.path().join("acf").join("gn").join("1.json"));

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains('\n'));
    assert_eq!(
        raw,
        r#"{"meta":{"title":"Gênesis","abbrev":"gn"},"chapter":1,"content":{"1":"No princípio"}}"#
    );
    assert_eq!(store.read(&address).unwrap(), Some(record(&[("1", "No princípio")])));
}

#[test]
fn skip_check_requires_non_empty_content_when_validating() {
    let temp = TempDir::new().unwrap();
    let store = RecordStore::new(AddressScheme::new(temp.path()));
    let address = SectionAddress::new("acf", "gn", 2);
    assert!(!store.is_harvested(&address, true));

    let dir = temp.path().join("acf").join("gn");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("2.json"),
        r#"{"meta":{"title":"Gênesis","abbrev":"gn"},"chapter":2,"content":{}}"#,
    )
    .unwrap();

    assert!(store.is_harvested(&address, false));
    assert!(!store.is_harvested(&address, true));

    store.write(&address, &record(&[("1", "E a terra")])).unwrap();
    assert!(store.is_harvested(&address, true));
}

#[test]
fn corrupt_record_is_reported_as_unreadable() {
    let temp = TempDir::new().unwrap();
    let store = RecordStore::new(AddressScheme::new(temp.path()));
    let address = SectionAddress::new("acf", "gn", 3);
    let dir = temp.path().join("acf").join("gn");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("3.json"), "{not json").unwrap();

    assert!(matches!(
        store.read(&address),
        Err(PersistError::Unreadable { .. })
    ));
    assert!(!store.is_harvested(&address, true));
}
