mod common;
use crate::common::{inputs, ContextOptions};
use tokio::test;
use vertex_nodes::{InputKind, NodeRegistry, NodeValue};
use vertex_sdk::{GenerationConfig, VertexConfig};

#[test]
async fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let context = ContextOptions::new(dir.path()).build();
    let registry = NodeRegistry::new();

    let vertex_config = VertexConfig {
        project_id: "p".to_string(),
        location: "us-east5".to_string(),
        ..Default::default()
    };
    let generation_config = GenerationConfig {
        temperature: Some(0.5),
        ..Default::default()
    };

    let saved = registry
        .execute(
            "VertexSaveConfig",
            inputs([
                ("filename_prefix", NodeValue::string("team")),
                ("vertex_config", NodeValue::VertexConfig(vertex_config.clone())),
                (
                    "generation_config",
                    NodeValue::GenerationConfig(generation_config.clone()),
                ),
            ]),
            &context,
        )
        .await
        .unwrap();
    let path = saved.values[0].as_str().unwrap().to_string();
    assert!(path.ends_with("_team.json"));

    let specs = registry
        .get("VertexLoadConfig")
        .unwrap()
        .input_specs(&context)
        .await
        .unwrap();
    let InputKind::Choice(files) = &specs[0].kind else {
        panic!("config_file should be a choice");
    };
    assert_eq!(files.len(), 1);
    assert!(path.ends_with(&files[0]));

    let loaded = registry
        .execute(
            "VertexLoadConfig",
            inputs([("config_file", NodeValue::string(files[0].clone()))]),
            &context,
        )
        .await
        .unwrap();
    assert_eq!(loaded.values[0].as_vertex_config(), Some(&vertex_config));
    assert_eq!(
        loaded.values[1].as_generation_config(),
        Some(&generation_config)
    );
}

#[test]
async fn save_without_configs_writes_an_empty_object() {
    let dir = tempfile::tempdir().unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let saved = NodeRegistry::new()
        .execute("VertexSaveConfig", inputs([]), &context)
        .await
        .unwrap();
    let path = saved.values[0].as_str().unwrap();
    assert!(path.ends_with("_vertex_config.json"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
}

#[test]
async fn load_offers_none_when_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let context = ContextOptions::new(&dir.path().join("missing")).build();
    let registry = NodeRegistry::new();

    let specs = registry
        .get("VertexLoadConfig")
        .unwrap()
        .input_specs(&context)
        .await
        .unwrap();
    assert_eq!(specs[0].kind, InputKind::choice(["none"]));

    let loaded = registry
        .execute("VertexLoadConfig", inputs([]), &context)
        .await
        .unwrap();
    assert_eq!(
        loaded.values,
        vec![
            NodeValue::VertexConfig(VertexConfig::default()),
            NodeValue::GenerationConfig(GenerationConfig::default()),
        ]
    );
}
