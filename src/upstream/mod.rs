pub mod payload;

pub use payload::{DeclaredStatus, ErrorPayload};

use crate::utils::config::UpstreamConfig;
use axum::body::Bytes;
use http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::{fmt, time::Duration};

/// A failed upstream call, either a non-2xx response or a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    /// HTTP status of the upstream response; `None` when no response arrived.
    pub status: Option<u16>,
    pub payload: ErrorPayload,
    /// Transport error text, kept for server-side logs only.
    pub cause: Option<String>,
}

impl UpstreamFailure {
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        Self {
            status: Some(status),
            payload: ErrorPayload::from_body(body),
            cause: None,
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            payload: ErrorPayload::Unknown,
            cause: Some(err.to_string()),
        }
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.cause) {
            (Some(status), _) => write!(f, "upstream responded {status}: {:?}", self.payload),
            (None, Some(cause)) => write!(f, "upstream unreachable: {cause}"),
            (None, None) => write!(f, "upstream call failed"),
        }
    }
}

impl std::error::Error for UpstreamFailure {}

/// Request body sent upstream.
#[derive(Debug, Clone)]
pub enum UpstreamBody {
    /// Serialized by the gateway itself.
    Json(Value),
    /// Browser-supplied bytes relayed untouched, with the browser's content type.
    Raw {
        content_type: Option<HeaderValue>,
        bytes: Bytes,
    },
}

/// A 2xx upstream response, body kept as received.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamReply {
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Body as JSON. Empty and non-JSON bodies read as `null`.
    pub fn json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

/// HTTP client for the single upstream API
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(format!("belt-gateway/{}", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if config.base_url.is_empty() {
            anyhow::bail!("Upstream base URL cannot be empty");
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issue a call whose success body the gateway reads itself. A 2xx
    /// response yields its JSON body (`null` when empty).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<UpstreamBody>,
    ) -> Result<Value, UpstreamFailure> {
        self.relay(method, path, bearer, body)
            .await
            .map(|reply| reply.json())
    }

    /// Issue a single, non-retried call and keep the success response as-is.
    /// Anything other than 2xx is an [`UpstreamFailure`].
    pub async fn relay(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<UpstreamBody>,
    ) -> Result<UpstreamReply, UpstreamFailure> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Forwarding upstream");

        let mut request = self.client.request(method, &url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request = match body {
            Some(UpstreamBody::Json(value)) => request.json(&value),
            Some(UpstreamBody::Raw {
                content_type,
                bytes,
            }) if !bytes.is_empty() => request
                .header(
                    CONTENT_TYPE,
                    content_type.unwrap_or(HeaderValue::from_static("application/json")),
                )
                .body(bytes),
            _ => request,
        };

        let response = request.send().await.map_err(UpstreamFailure::transport)?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(UpstreamFailure::transport)?;

        if !status.is_success() {
            return Err(UpstreamFailure::from_response(status.as_u16(), &body));
        }

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
