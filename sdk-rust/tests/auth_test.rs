mod common;
use crate::common::service_account_fixture;
use serde_json::json;
use std::fs;
use tokio::test;
use vertex_sdk::{
    auth::{CredentialResolver, GoogleCredentialResolver, GoogleCredentialResolverOptions},
    VertexError,
};
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn resolver(server: &MockServer, well_known_file: std::path::PathBuf) -> GoogleCredentialResolver {
    GoogleCredentialResolver::new(GoogleCredentialResolverOptions {
        token_uri: Some(format!("{}/token", server.uri())),
        metadata_url: Some(server.uri()),
        well_known_file: Some(well_known_file),
        ..Default::default()
    })
}

#[test]
async fn service_account_file_is_exchanged_for_a_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "sa-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let access_token = resolver(&server, dir.path().join("adc.json"))
        .resolve(Some(&service_account_fixture()))
        .await
        .unwrap();

    assert_eq!(access_token.token, "sa-token");
    assert_eq!(access_token.project_id.as_deref(), Some("fixture-project"));
}

#[test]
async fn rejected_token_exchange_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let error = resolver(&server, dir.path().join("adc.json"))
        .resolve(Some(&service_account_fixture()))
        .await
        .unwrap_err();

    match error {
        VertexError::Auth(message) => assert!(message.contains("invalid_grant")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
async fn malformed_service_account_file_is_an_auth_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("sa.json");
    fs::write(&key_path, "{\"client_email\": 42}").unwrap();

    let error = resolver(&server, dir.path().join("adc.json"))
        .resolve(Some(&key_path))
        .await
        .unwrap_err();

    assert!(matches!(error, VertexError::Auth(_)));
}

#[test]
async fn gcloud_user_credentials_are_refreshed() {
    if std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=rt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "user-token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let adc = dir.path().join("application_default_credentials.json");
    fs::write(
        &adc,
        json!({
            "type": "authorized_user",
            "client_id": "cid",
            "client_secret": "secret",
            "refresh_token": "rt-1"
        })
        .to_string(),
    )
    .unwrap();

    let access_token = resolver(&server, adc)
        .resolve(Some(&dir.path().join("missing-sa.json")))
        .await
        .unwrap();

    assert_eq!(access_token.token, "user-token");
}

#[test]
async fn metadata_server_is_the_last_resort() {
    if std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "gce-token"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/computeMetadata/v1/project/project-id"))
        .respond_with(ResponseTemplate::new(200).set_body_string("gce-project"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let access_token = resolver(&server, dir.path().join("adc.json"))
        .resolve(None)
        .await
        .unwrap();

    assert_eq!(access_token.token, "gce-token");
}

#[test]
async fn no_credential_source_is_an_auth_error() {
    if std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let error = resolver(&server, dir.path().join("adc.json"))
        .resolve(None)
        .await
        .unwrap_err();

    assert!(matches!(error, VertexError::Auth(_)));
}

#[test]
async fn metadata_server_counts_as_ambient_credentials() {
    if std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/email",
        ))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_string("sa@p.iam.gserviceaccount.com"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    assert!(
        resolver(&server, dir.path().join("adc.json"))
            .has_ambient_credentials()
            .await
    );
}

#[test]
async fn no_ambient_credentials_without_any_source() {
    if std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").is_some() {
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    assert!(
        !resolver(&server, dir.path().join("adc.json"))
            .has_ambient_credentials()
            .await
    );
}

#[test]
async fn well_known_file_counts_as_ambient_credentials_without_probing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let adc = dir.path().join("adc.json");
    fs::write(&adc, "{}").unwrap();

    assert!(resolver(&server, adc).has_ambient_credentials().await);
    assert!(server.received_requests().await.unwrap().is_empty());
}
