//! Authenticated forwarder.
//!
//! Every resource call goes through [`forward`] or [`forward_with_id`]:
//! preconditions are checked before any network traffic, the bearer token is
//! attached from the session, and failures are routed through the normalizer.
//! An upstream 401 always clears the session.

mod template;

pub use template::PathTemplate;

use crate::{
    normalize::{normalize, DEFAULT_FALLBACK},
    session::Session,
    state::AppState,
    upstream::{UpstreamBody, UpstreamReply},
    utils::{ApiError, ApiResult},
};
use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http::Method;

/// One upstream call, described before it is made.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub target: PathTemplate,
    pub body: Option<RelayBody>,
    pub requires_auth: bool,
    pub requires_id: bool,
    pub fallback: &'static str,
    pub missing_id_message: &'static str,
}

impl ForwardRequest {
    /// Call that needs a session cookie.
    pub fn authenticated(method: Method, target: PathTemplate) -> Self {
        Self {
            requires_id: target.is_id_scoped(),
            method,
            target,
            body: None,
            requires_auth: true,
            fallback: DEFAULT_FALLBACK,
            missing_id_message: "Id is required",
        }
    }

    /// Read that goes upstream without credentials.
    pub fn public(method: Method, target: PathTemplate) -> Self {
        Self {
            requires_auth: false,
            ..Self::authenticated(method, target)
        }
    }

    pub fn with_body(mut self, body: RelayBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn fallback(mut self, message: &'static str) -> Self {
        self.fallback = message;
        self
    }

    pub fn missing_id(mut self, message: &'static str) -> Self {
        self.missing_id_message = message;
        self
    }
}

/// Browser request body, kept byte-for-byte along with its content type.
#[derive(Debug, Clone)]
pub struct RelayBody {
    pub content_type: Option<HeaderValue>,
    pub bytes: Bytes,
}

#[async_trait]
impl<S> FromRequest<S> for RelayBody
where
    S: Send + Sync,
{
    type Rejection = BytesRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req.headers().get(CONTENT_TYPE).cloned();
        let bytes = Bytes::from_request(req, state).await?;
        Ok(Self {
            content_type,
            bytes,
        })
    }
}

impl From<RelayBody> for UpstreamBody {
    fn from(body: RelayBody) -> Self {
        Self::Raw {
            content_type: body.content_type,
            bytes: body.bytes,
        }
    }
}

/// Upstream success response, relayed with its status, content type and
/// bytes. An empty upstream body becomes `204 No Content`.
#[derive(Debug, Clone)]
pub struct Forwarded(pub UpstreamReply);

impl IntoResponse for Forwarded {
    fn into_response(self) -> Response {
        let reply = self.0;
        if reply.is_empty() {
            return StatusCode::NO_CONTENT.into_response();
        }

        let mut response = Response::new(Body::from(reply.body));
        *response.status_mut() = reply.status;
        if let Some(content_type) = reply.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

/// Forward a collection-level call that has no id in its path.
pub async fn forward(
    state: &AppState,
    session: &mut Session,
    request: ForwardRequest,
) -> ApiResult<Forwarded> {
    execute(state, session, None, request).await
}

/// Forward an id-scoped call. `id` is whatever the router captured, if anything.
pub async fn forward_with_id(
    state: &AppState,
    session: &mut Session,
    id: Option<&str>,
    request: ForwardRequest,
) -> ApiResult<Forwarded> {
    let request = ForwardRequest {
        requires_id: true,
        ..request
    };
    execute(state, session, id, request).await
}

async fn execute(
    state: &AppState,
    session: &mut Session,
    id: Option<&str>,
    request: ForwardRequest,
) -> ApiResult<Forwarded> {
    let token = request
        .requires_auth
        .then(|| session.read().map(str::to_string))
        .flatten();
    if request.requires_auth && token.is_none() {
        session.clear();
        return Err(ApiError::unauthorized());
    }

    let id = id.map(str::trim).filter(|id| !id.is_empty());
    if request.requires_id && id.is_none() {
        return Err(ApiError::bad_request(request.missing_id_message));
    }

    let path = request.target.resolve(id.unwrap_or_default());
    let body = request.body.map(UpstreamBody::from);

    match state
        .upstream
        .relay(request.method, &path, token.as_deref(), body)
        .await
    {
        Ok(reply) => Ok(Forwarded(reply)),
        Err(failure) => {
            let err = normalize(&failure, request.fallback, state.config.is_dev());
            if err.is_unauthorized() {
                session.clear();
            }
            Err(err)
        }
    }
}
