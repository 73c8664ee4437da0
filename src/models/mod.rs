use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Browser login body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// Browser registration body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Upstream login result. Tokens stay on the gateway side and only ever leave
/// as cookies.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamAuthResult {
    pub access_token: String,
    pub refresh_token: String,
    /// Opaque to the gateway; upstream formats vary (RFC 3339, naive, epoch).
    #[serde(default)]
    pub expires_at: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    pub role: String,
}

/// Upstream `who am I` result
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamMe {
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    pub role: String,
}

/// Identity as exposed to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: Option<String>,
    pub username: String,
    pub role: String,
}

impl From<UpstreamAuthResult> for Identity {
    fn from(result: UpstreamAuthResult) -> Self {
        Self {
            email: result.email,
            username: result.username,
            role: result.role,
        }
    }
}

impl From<UpstreamMe> for Identity {
    fn from(me: UpstreamMe) -> Self {
        Self {
            email: me.email,
            username: me.username,
            role: me.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}
