use std::fs;

use schemap_model::{FieldMapping, MappingKey};
use schemap_sync::{MappingRepository, RepositoryError, StoredMappingSet};

fn sample() -> Vec<FieldMapping> {
    vec![
        FieldMapping::direct("email", "email", 1.0),
        FieldMapping::transformed("user_id", "id", "CAST({field} AS INTEGER)", 0.84),
    ]
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let repo = MappingRepository::new(dir.path().join("mappings")).unwrap();
    let key = MappingKey::new("crm_users", "dw.users");

    assert!(!repo.exists(&key));
    assert_eq!(repo.load(&key).unwrap(), None);

    let path = repo.save(&key, &sample()).unwrap();
    assert!(path.ends_with("crm_5Fusers__dw.users.json"));
    assert!(repo.exists(&key));
    assert_eq!(repo.load(&key).unwrap(), Some(sample()));

    let stored = repo.load_stored(&key).unwrap().unwrap();
    assert_eq!(stored.version, "1.0");
    assert_eq!(stored.target_id, "dw.users");
}

#[test]
fn list_is_sorted_and_skips_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let repo = MappingRepository::new(dir.path()).unwrap();
    repo.save_stored(
        &StoredMappingSet::new(&MappingKey::new("orders", "dw_orders"), sample())
            .with_description("nightly"),
    )
    .unwrap();
    repo.save(&MappingKey::new("crm", "dw_users"), &sample()[..1]).unwrap();
    fs::write(dir.path().join("notes.json"), "{ not a mapping set").unwrap();
    fs::write(dir.path().join("README.txt"), "hello").unwrap();

    let listed = repo.list().unwrap();
    let ids: Vec<_> = listed
        .iter()
        .map(|m| (m.source_id.as_str(), m.mapping_count))
        .collect();
    assert_eq!(ids, vec![("crm", 1), ("orders", 2)]);
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = MappingRepository::new(dir.path()).unwrap();
    let key = MappingKey::new("a", "b");
    fs::write(dir.path().join("a__b.json"), "[]").unwrap();
    let err = repo.load(&key).unwrap_err();
    assert!(matches!(err, RepositoryError::Deserialize { .. }));
}

#[test]
fn keys_sharing_underscores_keep_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let repo = MappingRepository::new(dir.path()).unwrap();
    let first = MappingKey::new("crm_users", "dw");
    let second = MappingKey::new("crm", "users_dw");

    repo.save(&first, &sample()[..1]).unwrap();
    repo.save(&second, &[]).unwrap();

    assert_eq!(repo.load(&first).unwrap().map(|m| m.len()), Some(1));
    assert_eq!(repo.load(&second).unwrap().map(|m| m.len()), Some(0));
    let listed: Vec<_> = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|m| (m.source_id, m.target_id))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("crm".to_string(), "users_dw".to_string()),
            ("crm_users".to_string(), "dw".to_string()),
        ]
    );
}

#[test]
fn file_for_another_key_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let repo = MappingRepository::new(dir.path()).unwrap();
    let key = MappingKey::new("a", "b");
    let other = StoredMappingSet::new(&MappingKey::new("x", "y"), sample());
    fs::write(
        dir.path().join("a__b.json"),
        serde_json::to_string(&other).unwrap(),
    )
    .unwrap();

    assert_eq!(repo.load(&key).unwrap(), None);
}
