use axum::http::{header::COOKIE, HeaderMap};

/// Cookie holding the upstream access token.
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie holding the upstream refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

const ATTRIBUTES: &str = "HttpOnly; SameSite=Lax; Path=/";

/// Session-lifetime cookie (no `Max-Age`). Returns `None` if `value` contains
/// characters that are not valid in a cookie value.
#[must_use]
pub fn session_cookie(name: &str, value: &str, secure: bool) -> Option<String> {
    if value.is_empty() || !value.bytes().all(is_cookie_octet) {
        return None;
    }
    let secure_flag = if secure { "; Secure" } else { "" };
    Some(format!("{name}={value}; {ATTRIBUTES}{secure_flag}"))
}

/// Cookie that expires `name` immediately.
#[must_use]
pub fn expired_cookie(name: &str, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{name}=; {ATTRIBUTES}; Max-Age=0{secure_flag}")
}

/// Look up a cookie across every `Cookie` header. Empty values count as absent.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

// RFC 6265 cookie-octet
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}
