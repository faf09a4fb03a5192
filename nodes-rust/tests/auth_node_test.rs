mod common;
use crate::common::{inputs, ContextOptions};
use serde_json::json;
use std::{fs, sync::Arc};
use tokio::test;
use vertex_nodes::{
    ModelCache, NodeContext, NodeContextOptions, NodeError, NodeRegistry, NodeValue,
};
use vertex_sdk::{
    auth::{GoogleCredentialResolver, GoogleCredentialResolverOptions},
    google::{VertexClient, VertexClientOptions},
    ConfigStore, VertexError,
};

#[test]
async fn fails_fast_without_any_credential_source() {
    let dir = tempfile::tempdir().unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let error = NodeRegistry::new()
        .execute("VertexAIAuth", inputs([]), &context)
        .await
        .unwrap_err();

    match error {
        NodeError::Vertex(VertexError::Auth(message)) => {
            assert!(message.contains("Credentials missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("vertex_config.json").exists());
}

#[test]
async fn ambient_credentials_are_enough() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = ContextOptions::new(dir.path());
    options.ambient_credentials = true;
    let context = options.build();

    let output = NodeRegistry::new()
        .execute(
            "VertexAIAuth",
            inputs([("project_id", NodeValue::string("my-project"))]),
            &context,
        )
        .await
        .unwrap();

    let config = output.values[0].as_vertex_config().unwrap();
    assert_eq!(config.explicit_project_id(), Some("my-project"));
    assert_eq!(config.location(), "us-central1");
    assert!(!config.has_credentials());
    assert!(output.ui.is_empty());
    assert!(!dir.path().join("vertex_config.json").exists());
}

#[test]
async fn new_api_key_is_saved_and_masked_in_the_ui() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("vertex_config.json"),
        json!({
            "vertex_config": {"project_id": "saved-project", "location": "europe-west4"},
            "generation_config": {"temperature": 0.3}
        })
        .to_string(),
    )
    .unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let output = NodeRegistry::new()
        .execute(
            "VertexAIAuth",
            inputs([("api_key", NodeValue::string("AIza-new-key"))]),
            &context,
        )
        .await
        .unwrap();

    let config = output.values[0].as_vertex_config().unwrap();
    assert_eq!(config.api_key, "AIza-new-key");
    assert_eq!(config.project_id, "saved-project");
    assert_eq!(config.location, "europe-west4");

    assert_eq!(output.ui["api_key"], vec!["***********"]);
    let saved_path = &output.ui["config_file"][0];
    assert!(saved_path.ends_with("vertex_config.json"));

    let saved = ConfigStore::new(dir.path()).load("vertex_config.json").unwrap();
    assert_eq!(saved.vertex_config.unwrap().api_key, "AIza-new-key");
    assert_eq!(saved.generation_config.unwrap().temperature, Some(0.3));
}

#[test]
async fn masked_key_does_not_overwrite_saved_key() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("vertex_config.json"),
        json!({"vertex_config": {"api_key": "saved-key"}}).to_string(),
    )
    .unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let output = NodeRegistry::new()
        .execute(
            "VertexAIAuth",
            inputs([("api_key", NodeValue::string("***********"))]),
            &context,
        )
        .await
        .unwrap();

    assert_eq!(
        output.values[0].as_vertex_config().unwrap().api_key,
        "saved-key"
    );
    assert!(output.ui.is_empty());
}

#[test]
async fn service_account_path_is_saved_without_ui_update() {
    let dir = tempfile::tempdir().unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let output = NodeRegistry::new()
        .execute(
            "VertexAIAuth",
            inputs([
                ("config_file", NodeValue::string("team.json")),
                ("service_account_json", NodeValue::string("/keys/sa.json")),
            ]),
            &context,
        )
        .await
        .unwrap();

    assert!(output.ui.is_empty());
    let saved = ConfigStore::new(dir.path()).load("team.json").unwrap();
    assert_eq!(
        saved.vertex_config.unwrap().service_account_path,
        "/keys/sa.json"
    );
    assert_eq!(
        output.values[0].as_vertex_config().unwrap().service_account_path,
        "/keys/sa.json"
    );
}

#[test]
async fn unreadable_saved_config_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("vertex_config.json"), "{ broken").unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let error = NodeRegistry::new()
        .execute("VertexAIAuth", inputs([]), &context)
        .await
        .unwrap_err();
    assert!(matches!(error, NodeError::Vertex(VertexError::Auth(_))));
}

#[test]
async fn blank_config_file_saves_to_a_generated_name() {
    let dir = tempfile::tempdir().unwrap();
    let context = ContextOptions::new(dir.path()).build();

    let output = NodeRegistry::new()
        .execute(
            "VertexAIAuth",
            inputs([
                ("config_file", NodeValue::string("  ")),
                ("api_key", NodeValue::string("AIza-key")),
            ]),
            &context,
        )
        .await
        .unwrap();

    let saved_path = &output.ui["config_file"][0];
    let name = std::path::Path::new(saved_path)
        .file_name()
        .unwrap()
        .to_str()
        .unwrap();
    assert!(name.starts_with("vertex_config_"));
    assert!(name.ends_with(".json"));
    assert_eq!(ConfigStore::new(dir.path()).list().unwrap(), vec![name]);
}

#[test]
async fn metadata_server_host_passes_the_credential_check() {
    if std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        return;
    }
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path(
            "/computeMetadata/v1/instance/service-accounts/default/email",
        ))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("sa@p.iam"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resolver = GoogleCredentialResolver::new(GoogleCredentialResolverOptions {
        metadata_url: Some(server.uri()),
        well_known_file: Some(dir.path().join("adc.json")),
        ..Default::default()
    });
    let context = NodeContext::new(NodeContextOptions {
        client: Some(VertexClient::new(VertexClientOptions {
            resolver: Some(Arc::new(resolver)),
            ..Default::default()
        })),
        store: Some(ConfigStore::new(dir.path())),
        model_cache: Some(ModelCache::with_discovery(false)),
        ambient_credentials: None,
    });

    let output = NodeRegistry::new()
        .execute("VertexAIAuth", inputs([]), &context)
        .await
        .unwrap();
    assert!(!output.values[0].as_vertex_config().unwrap().has_credentials());
}
