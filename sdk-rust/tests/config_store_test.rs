use serde_json::json;
use std::fs;
use vertex_sdk::{ConfigFile, ConfigStore, GenerationConfig, VertexConfig, VertexError};

fn vertex_config() -> VertexConfig {
    VertexConfig {
        project_id: "my-project".to_string(),
        location: "europe-west4".to_string(),
        service_account_path: "/keys/sa.json".to_string(),
        api_key: String::new(),
    }
}

#[test]
fn save_then_load_returns_the_same_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    let data = ConfigFile {
        vertex_config: Some(vertex_config()),
        generation_config: Some(GenerationConfig {
            temperature: Some(0.4),
            max_output_tokens: Some(1024),
            ..Default::default()
        }),
        ..Default::default()
    };

    let path = store.save("saved.json", &data).unwrap();
    assert!(path.is_absolute());
    assert!(path.ends_with("saved.json"));

    assert_eq!(store.load("saved.json").unwrap(), data);
    assert_eq!(store.load(path.to_str().unwrap()).unwrap(), data);
}

#[test]
fn saved_files_are_pretty_printed() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nested"));
    let path = store
        .save(
            "pretty.json",
            &ConfigFile {
                vertex_config: Some(vertex_config()),
                ..Default::default()
            },
        )
        .unwrap();

    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.starts_with("{\n  \"vertex_config\": {\n    \"project_id\""));
}

#[test]
fn missing_file_loads_as_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    assert!(store.load("absent.json").unwrap().is_empty());
}

#[test]
fn invalid_json_is_a_parse_error_naming_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let store = ConfigStore::new(dir.path());

    match store.load("broken.json").unwrap_err() {
        VertexError::ConfigParse(path, _) => assert!(path.ends_with("broken.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn out_of_range_generation_config_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("hot.json"),
        json!({"generation_config": {"temperature": 3.5}}).to_string(),
    )
    .unwrap();
    let store = ConfigStore::new(dir.path());

    assert!(matches!(
        store.load("hot.json").unwrap_err(),
        VertexError::ConfigParse(..)
    ));
}

#[test]
fn update_vertex_config_preserves_other_sections() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("shared.json"),
        json!({
            "vertex_config": {"project_id": "old", "location": "us-east1"},
            "generation_config": {"temperature": 0.2},
            "notes": "keep me"
        })
        .to_string(),
    )
    .unwrap();
    let store = ConfigStore::new(dir.path());

    store
        .update_vertex_config("shared.json", &vertex_config())
        .unwrap();

    let loaded = store.load("shared.json").unwrap();
    assert_eq!(loaded.vertex_config, Some(vertex_config()));
    assert_eq!(loaded.generation_config.unwrap().temperature, Some(0.2));
    assert_eq!(loaded.extra["notes"], "keep me");
}

#[test]
fn legacy_service_account_key_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("legacy.json"),
        json!({"vertex_config": {"service_account_json": "/keys/old.json"}}).to_string(),
    )
    .unwrap();
    let store = ConfigStore::new(dir.path());

    let vertex_config = store.load("legacy.json").unwrap().vertex_config.unwrap();
    assert_eq!(vertex_config.service_account_path, "/keys/old.json");
    assert_eq!(vertex_config.project_id, "auto-detect");
    assert_eq!(vertex_config.location, "us-central1");
    assert_eq!(vertex_config.explicit_project_id(), None);
}

#[test]
fn list_returns_json_files_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "1700000000_config.json",
        "1800000000_config.json",
        "notes.txt",
        "1750000000_config.json",
    ] {
        fs::write(dir.path().join(name), "{}").unwrap();
    }
    fs::create_dir(dir.path().join("folder.json")).unwrap();
    let store = ConfigStore::new(dir.path());

    assert_eq!(
        store.list().unwrap(),
        vec![
            "1800000000_config.json",
            "1750000000_config.json",
            "1700000000_config.json",
        ]
    );
}

#[test]
fn list_of_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nope"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn empty_name_is_rejected() {
    let store = ConfigStore::default();
    assert!(matches!(
        store.path_of("  ").unwrap_err(),
        VertexError::InvalidInput(_)
    ));
}

#[test]
fn generated_names_follow_their_patterns() {
    let timestamped = ConfigStore::timestamped_name("config");
    let (timestamp, rest) = timestamped.split_once('_').unwrap();
    assert!(timestamp.parse::<i64>().is_ok());
    assert_eq!(rest, "config.json");

    let generated = ConfigStore::generated_vertex_config_name();
    let timestamp = generated
        .strip_prefix("vertex_config_")
        .and_then(|rest| rest.strip_suffix(".json"))
        .unwrap();
    assert!(timestamp.parse::<i64>().is_ok());
}

#[test]
fn list_of_empty_directory_is_empty_until_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    assert!(store.list().unwrap().is_empty());

    let data = ConfigFile {
        vertex_config: Some(vertex_config()),
        generation_config: Some(GenerationConfig {
            temperature: Some(0.2),
            ..Default::default()
        }),
        ..Default::default()
    };
    store.save("a.json", &data).unwrap();

    assert_eq!(store.list().unwrap(), vec!["a.json"]);
    assert_eq!(store.load("a.json").unwrap(), data);
}

#[cfg(unix)]
#[test]
fn list_follows_symlinked_files() {
    let dir = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    fs::write(target.path().join("shared.json"), "{}").unwrap();
    std::os::unix::fs::symlink(
        target.path().join("shared.json"),
        dir.path().join("linked.json"),
    )
    .unwrap();
    std::os::unix::fs::symlink(
        target.path().join("missing.json"),
        dir.path().join("dangling.json"),
    )
    .unwrap();

    let store = ConfigStore::new(dir.path());
    assert_eq!(store.list().unwrap(), vec!["linked.json"]);
    assert!(store.load("linked.json").unwrap().is_empty());
}
