//! Session store backed by two httpOnly cookies.
//!
//! A [`Session`] is built from the incoming request's `Cookie` header, mutated
//! by handlers, and handed back to axum as response parts. Mutations are
//! recorded as a single pending change so both cookies are always emitted
//! together, on success and error responses alike.

mod cookie;

pub use cookie::{expired_cookie, get_cookie, session_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};

use crate::{state::AppState, utils::ApiError};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use std::convert::Infallible;

/// Cookie mutation queued for the outgoing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    Written { access_token: String, refresh_token: String },
    Cleared,
}

/// Request-scoped view of the browser session.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    secure: bool,
    change: SessionChange,
}

impl Session {
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        Self {
            access_token: get_cookie(headers, ACCESS_COOKIE_NAME),
            refresh_token: get_cookie(headers, REFRESH_COOKIE_NAME),
            secure,
            change: SessionChange::Unchanged,
        }
    }

    /// Access token currently in effect for this request.
    pub fn read(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn write(&mut self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        self.access_token = Some(access_token.clone());
        self.refresh_token = Some(refresh_token.clone());
        self.change = SessionChange::Written {
            access_token,
            refresh_token,
        };
    }

    /// Expire both cookies. Safe to call any number of times, with or without a session.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.change = SessionChange::Cleared;
    }

    pub fn change(&self) -> &SessionChange {
        &self.change
    }

    fn set_cookie_values(&self) -> Result<Vec<HeaderValue>, ApiError> {
        let cookies = match &self.change {
            SessionChange::Unchanged => return Ok(Vec::new()),
            SessionChange::Written {
                access_token,
                refresh_token,
            } => [
                session_cookie(ACCESS_COOKIE_NAME, access_token, self.secure),
                session_cookie(REFRESH_COOKIE_NAME, refresh_token, self.secure),
            ],
            SessionChange::Cleared => [
                Some(expired_cookie(ACCESS_COOKIE_NAME, self.secure)),
                Some(expired_cookie(REFRESH_COOKIE_NAME, self.secure)),
            ],
        };

        cookies
            .iter()
            .map(|cookie| {
                cookie.as_deref().and_then(|c| HeaderValue::from_str(c).ok()).ok_or_else(|| {
                    tracing::error!("Upstream issued a token that cannot be stored in a cookie");
                    ApiError::internal("Failed to establish session")
                })
            })
            .collect()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, state.config.secure_cookies()))
    }
}

impl IntoResponseParts for Session {
    type Error = ApiError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        // Both values are built before either is appended.
        for value in self.set_cookie_values()? {
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}
