//! Bearer token resolution for Vertex AI.
//!
//! A service account key file named by the caller wins. Otherwise Application
//! Default Credentials are discovered in the usual order:
//! 1) the key file in `GOOGLE_APPLICATION_CREDENTIALS`
//! 2) the gcloud well-known `application_default_credentials.json`
//! 3) the GCE/GKE metadata server

use crate::{VertexError, VertexResult};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
const METADATA_TIMEOUT: Duration = Duration::from_secs(3);
const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
const JWT_LIFETIME_SECS: i64 = 3600;

pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const PROJECT_ENV_VARS: [&str; 2] = ["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"];

/// A short-lived bearer token and the project the credential belongs to, if
/// it names one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub project_id: Option<String>,
}

/// Produces bearer tokens for the token-based endpoint.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve a token from the service account file at
    /// `service_account_path` if it exists, otherwise from ambient
    /// credentials.
    async fn resolve(&self, service_account_path: Option<&Path>) -> VertexResult<AccessToken>;

    /// Whether [`CredentialResolver::resolve`] can succeed without a service
    /// account file.
    async fn has_ambient_credentials(&self) -> bool {
        ambient_credentials_available()
    }
}

/// Always returns the same token. Useful with tokens minted elsewhere
/// (e.g. `gcloud auth print-access-token`) and in tests.
#[derive(Debug, Clone)]
pub struct StaticTokenResolver {
    access_token: AccessToken,
}

impl StaticTokenResolver {
    pub fn new(token: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            access_token: AccessToken {
                token: token.into(),
                project_id,
            },
        }
    }
}

#[async_trait]
impl CredentialResolver for StaticTokenResolver {
    async fn resolve(&self, _service_account_path: Option<&Path>) -> VertexResult<AccessToken> {
        Ok(self.access_token.clone())
    }

    async fn has_ambient_credentials(&self) -> bool {
        true
    }
}

/// Service account key fields needed for the JWT bearer flow.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// gcloud user credentials, refreshed with the OAuth refresh token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserKey {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserKey),
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone, Default)]
pub struct GoogleCredentialResolverOptions {
    pub client: Option<Client>,
    /// Overrides the token endpoint named in credential files.
    pub token_uri: Option<String>,
    /// Base URL of the metadata server.
    pub metadata_url: Option<String>,
    /// Overrides the gcloud well-known credentials file location.
    pub well_known_file: Option<PathBuf>,
}

/// Resolves tokens from service account files and Application Default
/// Credentials.
pub struct GoogleCredentialResolver {
    client: Client,
    token_uri: Option<String>,
    metadata_url: String,
    well_known_file: Option<PathBuf>,
}

impl Default for GoogleCredentialResolver {
    fn default() -> Self {
        Self::new(GoogleCredentialResolverOptions::default())
    }
}

impl GoogleCredentialResolver {
    #[must_use]
    pub fn new(options: GoogleCredentialResolverOptions) -> Self {
        let GoogleCredentialResolverOptions {
            client,
            token_uri,
            metadata_url,
            well_known_file,
        } = options;

        Self {
            client: client.unwrap_or_else(Client::new),
            token_uri,
            metadata_url: metadata_url
                .unwrap_or_else(|| DEFAULT_METADATA_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            well_known_file: well_known_file.or_else(well_known_credentials_file),
        }
    }

    /// Exchange a service account key for a bearer token.
    pub async fn service_account_token(&self, key: &ServiceAccountKey) -> VertexResult<String> {
        let token_uri = self
            .token_uri
            .as_deref()
            .or(key.token_uri.as_deref())
            .unwrap_or(DEFAULT_TOKEN_URI);

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: token_uri,
            iat: now,
            exp: now + JWT_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| VertexError::Auth(format!("Invalid service account private key: {e}")))?;
        let assertion = encode(&header, &claims, &encoding_key)
            .map_err(|e| VertexError::Auth(format!("Failed to sign JWT: {e}")))?;

        self.exchange(
            token_uri,
            &[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ],
        )
        .await
    }

    /// Refresh gcloud user credentials into a bearer token.
    pub async fn authorized_user_token(&self, key: &AuthorizedUserKey) -> VertexResult<String> {
        let token_uri = self
            .token_uri
            .as_deref()
            .or(key.token_uri.as_deref())
            .unwrap_or(DEFAULT_TOKEN_URI);

        self.exchange(
            token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", key.client_id.as_str()),
                ("client_secret", key.client_secret.as_str()),
                ("refresh_token", key.refresh_token.as_str()),
            ],
        )
        .await
    }

    async fn exchange(&self, token_uri: &str, form: &[(&str, &str)]) -> VertexResult<String> {
        let response = self
            .client
            .post(token_uri)
            .timeout(TOKEN_TIMEOUT)
            .form(form)
            .send()
            .await
            .map_err(|e| VertexError::Auth(format!("Token endpoint request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VertexError::Auth(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| VertexError::Auth(format!("Failed to parse token response: {e}")))?;
        Ok(token.access_token)
    }

    async fn resolve_credential_file(&self, path: &Path) -> VertexResult<AccessToken> {
        let contents = fs::read_to_string(path).map_err(|e| {
            VertexError::Auth(format!(
                "Failed to read credentials file {}: {e}",
                path.display()
            ))
        })?;
        let credential: CredentialFile = serde_json::from_str(&contents).map_err(|e| {
            VertexError::Auth(format!(
                "Invalid credentials file {}: {e}",
                path.display()
            ))
        })?;

        match credential {
            CredentialFile::ServiceAccount(key) => Ok(AccessToken {
                token: self.service_account_token(&key).await?,
                project_id: env_project_id().or(key.project_id),
            }),
            CredentialFile::AuthorizedUser(key) => Ok(AccessToken {
                token: self.authorized_user_token(&key).await?,
                project_id: env_project_id().or(key.quota_project_id),
            }),
        }
    }

    async fn metadata_get(&self, path: &str) -> Option<reqwest::Response> {
        let url = format!("{}/computeMetadata/v1/{path}", self.metadata_url);
        match self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Some(response),
            Ok(response) => {
                tracing::debug!(status = %response.status(), path, "metadata server refused");
                None
            }
            Err(error) => {
                tracing::debug!(%error, "metadata server unreachable");
                None
            }
        }
    }

    async fn resolve_metadata(&self) -> Option<AccessToken> {
        let token: TokenResponse = self
            .metadata_get("instance/service-accounts/default/token")
            .await?
            .json()
            .await
            .ok()?;

        let project_id = match env_project_id() {
            Some(project_id) => Some(project_id),
            None => match self.metadata_get("project/project-id").await {
                Some(response) => response.text().await.ok().filter(|p| !p.is_empty()),
                None => None,
            },
        };

        Some(AccessToken {
            token: token.access_token,
            project_id,
        })
    }

    /// Application Default Credentials discovery.
    pub async fn resolve_ambient(&self) -> VertexResult<AccessToken> {
        if let Some(path) = env_credentials_file() {
            return self.resolve_credential_file(&path).await;
        }

        if let Some(path) = self.well_known_file.as_deref().filter(|p| p.is_file()) {
            return self.resolve_credential_file(path).await;
        }

        if let Some(access_token) = self.resolve_metadata().await {
            return Ok(access_token);
        }

        Err(VertexError::Auth(
            "No credentials found: no service account file, no GOOGLE_APPLICATION_CREDENTIALS, \
             no gcloud application default credentials and no metadata server"
                .to_string(),
        ))
    }
}

#[async_trait]
impl CredentialResolver for GoogleCredentialResolver {
    async fn resolve(&self, service_account_path: Option<&Path>) -> VertexResult<AccessToken> {
        if let Some(path) = service_account_path.filter(|p| p.is_file()) {
            let contents = fs::read_to_string(path).map_err(|e| {
                VertexError::Auth(format!(
                    "Failed to read service account file {}: {e}",
                    path.display()
                ))
            })?;
            let key: ServiceAccountKey = serde_json::from_str(&contents).map_err(|e| {
                VertexError::Auth(format!(
                    "Invalid service account file {}: {e}",
                    path.display()
                ))
            })?;
            return Ok(AccessToken {
                token: self.service_account_token(&key).await?,
                project_id: key.project_id,
            });
        }

        if let Some(path) = service_account_path {
            tracing::warn!(
                path = %path.display(),
                "service account file not found, trying default credentials"
            );
        } else {
            tracing::info!("no service account file given, trying default credentials");
        }
        self.resolve_ambient().await
    }

    /// Local sources first; the metadata server is probed only when none is
    /// configured.
    async fn has_ambient_credentials(&self) -> bool {
        env_credentials_file().is_some()
            || self.well_known_file.as_deref().is_some_and(Path::is_file)
            || self
                .metadata_get("instance/service-accounts/default/email")
                .await
                .is_some()
    }
}

fn env_credentials_file() -> Option<PathBuf> {
    std::env::var_os(CREDENTIALS_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn env_project_id() -> Option<String> {
    PROJECT_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Location of `gcloud auth application-default login` credentials.
#[must_use]
pub fn well_known_credentials_file() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        dirs::config_dir()
    } else {
        dirs::home_dir().map(|home| home.join(".config"))
    };
    base.map(|dir| dir.join("gcloud").join("application_default_credentials.json"))
}

/// Whether an ambient credential source is configured locally. The metadata
/// server is not probed.
#[must_use]
pub fn ambient_credentials_available() -> bool {
    env_credentials_file().is_some() || well_known_credentials_file().is_some_and(|p| p.is_file())
}
