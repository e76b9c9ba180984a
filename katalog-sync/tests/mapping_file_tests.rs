//! Mapping-table loading tests

use std::io::Write;
use std::path::Path;

use katalog_sync::services::CategoryMapping;

#[test]
fn loads_mapping_document_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "6204": {{"215062": "Юбки и юбки-брюки", "215061": "Брюки тканые"}},
            "6109100000": {{"215070": "Футболки трикотажные"}}
        }}"#
    )
    .unwrap();

    let mapping = CategoryMapping::load(file.path()).unwrap();
    assert_eq!(mapping.len(), 2);

    // document order survives the round trip
    let ids: Vec<u32> = mapping
        .candidates("6204")
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![215062, 215061]);
}

#[test]
fn group_key_serves_full_codes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"6204": {{"215061": "Брюки тканые"}}}}"#).unwrap();

    let mapping = CategoryMapping::load(file.path()).unwrap();
    let by_group: Vec<u32> = mapping
        .candidates("6204")
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    let by_full: Vec<u32> = mapping
        .candidates("6204631800")
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(by_group, by_full);
}

#[test]
fn missing_file_is_fatal_config_error() {
    let result = CategoryMapping::load(Path::new("/nonexistent/mapping.json"));
    assert!(matches!(result, Err(katalog_common::Error::Config(_))));
}

#[test]
fn malformed_document_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"6204": ["not", "an", "object"]}}"#).unwrap();

    assert!(CategoryMapping::load(file.path()).is_err());
}
