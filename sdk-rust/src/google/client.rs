use super::{
    api::{GenerateContentParameters, ListPublisherModelsResponse},
    response::ParsedResponse,
};
use crate::{
    auth::{CredentialResolver, GoogleCredentialResolver},
    client_utils, VertexConfig, VertexError, VertexResult,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use std::{fmt, sync::Arc, time::Duration};

const GLOBAL_BASE_URL: &str = "https://aiplatform.googleapis.com";
const LIST_MODELS_TIMEOUT: Duration = Duration::from_secs(5);

/// Which generator a request serves. Decides the timeout and, on the
/// token-based endpoint, the method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Text,
    Image,
}

impl GenerationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    #[must_use]
    pub fn timeout(self) -> Duration {
        match self {
            Self::Text => Duration::from_secs(60),
            Self::Image => Duration::from_secs(120),
        }
    }

    fn token_method(self) -> &'static str {
        match self {
            Self::Text => "generateContent",
            Self::Image => "streamGenerateContent",
        }
    }
}

/// A resolved request target.
#[derive(Clone)]
pub struct Endpoint {
    url: String,
    bearer_token: Option<String>,
}

impl Endpoint {
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn uses_api_key(&self) -> bool {
        self.bearer_token.is_none()
    }

    fn headers(&self) -> VertexResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|error| {
                VertexError::Auth(format!("Bearer token is not a valid header value: {error}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

// Keeps API keys and tokens out of logs.
impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.url.split_once("?key=").map_or(self.url.as_str(), |(u, _)| u);
        f.debug_struct("Endpoint")
            .field("url", &url)
            .field("uses_api_key", &self.uses_api_key())
            .finish()
    }
}

/// `{base}/v1/publishers/google/models/{model}:streamGenerateContent?key={api_key}`
fn api_key_url(base_url: Option<&str>, model: &str, api_key: &str) -> String {
    format!(
        "{}/v1/publishers/google/models/{model}:streamGenerateContent?key={api_key}",
        base_url.unwrap_or(GLOBAL_BASE_URL)
    )
}

/// `{base}/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:{method}`
fn project_url(
    base_url: Option<&str>,
    location: &str,
    project_id: &str,
    model: &str,
    kind: GenerationKind,
) -> String {
    let base_url = base_url.map_or_else(
        || format!("https://{location}-aiplatform.googleapis.com"),
        str::to_string,
    );
    format!(
        "{base_url}/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model}:{}",
        kind.token_method()
    )
}

#[derive(Clone, Default)]
pub struct VertexClientOptions {
    /// Replaces both the global and the regional API hosts.
    pub base_url: Option<String>,
    pub client: Option<Client>,
    pub resolver: Option<Arc<dyn CredentialResolver>>,
}

/// Issues generate calls against Vertex AI, one buffered request per call.
pub struct VertexClient {
    base_url: Option<String>,
    client: Client,
    resolver: Arc<dyn CredentialResolver>,
}

impl Default for VertexClient {
    fn default() -> Self {
        Self::new(VertexClientOptions::default())
    }
}

impl VertexClient {
    #[must_use]
    pub fn new(options: VertexClientOptions) -> Self {
        let VertexClientOptions {
            base_url,
            client,
            resolver,
        } = options;

        let client = client.unwrap_or_else(Client::new);
        let resolver = resolver.unwrap_or_else(|| {
            Arc::new(GoogleCredentialResolver::new(
                crate::auth::GoogleCredentialResolverOptions {
                    client: Some(client.clone()),
                    ..Default::default()
                },
            ))
        });

        Self {
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            client,
            resolver,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn CredentialResolver {
        self.resolver.as_ref()
    }

    /// Decide URL and authentication for a call. An API key selects the
    /// global key-based endpoint and skips credential resolution; otherwise a
    /// bearer token is resolved and the regional project endpoint is used.
    pub async fn resolve_endpoint(
        &self,
        vertex_config: &VertexConfig,
        model: &str,
        kind: GenerationKind,
    ) -> VertexResult<Endpoint> {
        if let Some(api_key) = vertex_config.api_key() {
            return Ok(Endpoint {
                url: api_key_url(self.base_url.as_deref(), model, api_key),
                bearer_token: None,
            });
        }

        let access_token = self
            .resolver
            .resolve(vertex_config.service_account_path())
            .await?;
        let project_id = vertex_config
            .explicit_project_id()
            .map(str::to_string)
            .or(access_token.project_id)
            .ok_or_else(|| {
                VertexError::Auth(
                    "No project id configured and none found in the credentials".to_string(),
                )
            })?;

        Ok(Endpoint {
            url: project_url(
                self.base_url.as_deref(),
                vertex_config.location(),
                &project_id,
                model,
                kind,
            ),
            bearer_token: Some(access_token.token),
        })
    }

    /// Send a built request to a resolved endpoint and parse the buffered
    /// response.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        model: &str,
        kind: GenerationKind,
        params: &GenerateContentParameters,
    ) -> VertexResult<ParsedResponse> {
        crate::opentelemetry::trace_generate(model, kind, params, || async {
            tracing::info!(model, kind = kind.as_str(), "sending Vertex AI request");
            let body = client_utils::send_json(
                &self.client,
                endpoint.url(),
                params,
                endpoint.headers()?,
                kind.timeout(),
            )
            .await?;
            ParsedResponse::parse(&body)
        })
        .await
    }

    /// Resolve the endpoint and send in one step.
    pub async fn generate_content(
        &self,
        vertex_config: &VertexConfig,
        model: &str,
        kind: GenerationKind,
        params: &GenerateContentParameters,
    ) -> VertexResult<ParsedResponse> {
        let endpoint = self.resolve_endpoint(vertex_config, model, kind).await?;
        self.send(&endpoint, model, kind, params).await
    }

    /// Model ids published by Google in `location`, using ambient
    /// credentials. Short timeout; meant for best-effort discovery.
    pub async fn list_publisher_models(&self, location: &str) -> VertexResult<Vec<String>> {
        let access_token = self.resolver.resolve(None).await?;
        let project_id = access_token.project_id.ok_or_else(|| {
            VertexError::Auth("Default credentials carry no project id".to_string())
        })?;

        let base_url = self.base_url.clone().unwrap_or_else(|| {
            format!("https://{location}-aiplatform.googleapis.com")
        });
        let url = format!(
            "{base_url}/v1/projects/{project_id}/locations/{location}/publishers/google/models"
        );
        let endpoint = Endpoint {
            url,
            bearer_token: Some(access_token.token),
        };

        let body = client_utils::get_text(
            &self.client,
            endpoint.url(),
            endpoint.headers()?,
            LIST_MODELS_TIMEOUT,
        )
        .await?;
        let response: ListPublisherModelsResponse = serde_json::from_str(&body)
            .map_err(|e| VertexError::ResponseFormat(format!("Invalid model list: {e}")))?;

        Ok(response
            .publisher_models
            .into_iter()
            .chain(response.models)
            .filter_map(|model| model.name)
            .filter_map(|name| name.rsplit('/').next().map(str::to_string))
            .collect())
    }
}
