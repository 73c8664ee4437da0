/// Tests for the identity routes: login, register, me and logout.
///
/// These tests verify:
/// - Cookies are written together only after a successful login
/// - Tokens never reach the browser body
/// - `me` hides upstream detail and clears the session on 401
/// - Logout clears the session whatever the upstream does
mod common;

use axum::http::{Method, StatusCode};
use common::{call, gateway, gateway_for, unreachable_upstream, SESSION};
use serde_json::json;
use wiremock::{
    matchers::{any, body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[cfg(test)]
mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_sets_both_cookies_and_returns_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "emailOrUsername": "a@b.com", "password": "x" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "t1",
                "refreshToken": "t2",
                "expiresAt": "2026-01-01T00:00:00Z",
                "email": "a@b.com",
                "username": "alice",
                "role": "admin"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "emailOrUsername": "a@b.com", "password": "x" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body,
            json!({ "user": { "email": "a@b.com", "username": "alice", "role": "admin" } })
        );
        assert_eq!(
            response.set_cookies(),
            vec![
                "access_token=t1; HttpOnly; SameSite=Lax; Path=/",
                "refresh_token=t2; HttpOnly; SameSite=Lax; Path=/",
            ]
        );
    }

    #[tokio::test]
    async fn test_login_accepts_any_expiry_format() {
        for expires_at in [json!("2026-01-01T00:00:00"), json!(1767225600), json!(null)] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/auth/login"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "accessToken": "t1",
                    "refreshToken": "t2",
                    "expiresAt": expires_at,
                    "email": null,
                    "username": "alice",
                    "role": "user"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let response = call(
                gateway(&server),
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "emailOrUsername": "alice", "password": "x" })),
            )
            .await;

            assert_eq!(response.status, StatusCode::OK, "expiresAt = {expires_at}");
            assert_eq!(response.body["user"]["username"], "alice");
            assert_eq!(response.set_cookies().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_text_body_without_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid credentials."))
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "emailOrUsername": "alice", "password": "wrong" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message(), "Invalid credentials.");
        assert_eq!(response.body["statusCode"], 400);
        assert!(response.set_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_login_rejected_with_401_leaves_session_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad password" })),
            )
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/login",
            Some(SESSION),
            Some(json!({ "emailOrUsername": "alice", "password": "wrong" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.message(), "Bad password");
        assert!(response.set_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_login_with_unreachable_upstream_uses_fallback_message() {
        let response = call(
            gateway_for(&unreachable_upstream()),
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "emailOrUsername": "alice", "password": "x" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.message(), "Failed to sign in");
        assert!(response.set_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_login_with_malformed_success_payload_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "t1" })))
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "emailOrUsername": "alice", "password": "x" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.set_cookies().is_empty());
    }
}

#[cfg(test)]
mod register_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_returns_no_content_and_no_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "email": "a@b.com",
                "username": "alice",
                "password": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "t1",
                "refreshToken": "t2",
                "username": "alice",
                "role": "user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "a@b.com", "username": "alice", "password": "secret" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(response.body, serde_json::Value::Null);
        assert!(response.set_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_register_validation_errors_are_joined_per_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "title": "One or more validation errors occurred.",
                "errors": {
                    "Password": ["too short", "needs a digit"],
                    "Username": ["already taken"]
                }
            })))
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "a@b.com", "username": "alice", "password": "x" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.message(),
            "Password: too short, needs a digit\nUsername: already taken"
        );
    }

    #[tokio::test]
    async fn test_register_failure_without_body_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let response = call(
            gateway(&server),
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "a@b.com", "username": "alice", "password": "x" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.message(), "Failed to sign up");
    }
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[tokio::test]
    async fn test_me_without_session_makes_no_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = call(gateway(&server), Method::GET, "/auth/me", None, None).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.message(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_me_forwards_bearer_token_and_reshapes_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "email": "a@b.com",
                "username": "alice",
                "role": "admin"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = call(gateway(&server), Method::GET, "/auth/me", Some(SESSION), None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body,
            json!({ "user": { "email": "a@b.com", "username": "alice", "role": "admin" } })
        );
        assert!(response.set_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_me_upstream_401_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let response = call(gateway(&server), Method::GET, "/auth/me", Some(SESSION), None).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.message(), "Unauthorized");
        response.assert_session_cleared();
    }

    #[tokio::test]
    async fn test_me_other_failures_hide_upstream_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "detail": "internal policy 7" })),
            )
            .mount(&server)
            .await;

        let response = call(gateway(&server), Method::GET, "/auth/me", Some(SESSION), None).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.message(), "Failed to fetch current user");
        assert!(response.set_cookies().is_empty());
    }
}

#[cfg(test)]
mod logout_tests {
    use super::*;

    #[tokio::test]
    async fn test_logout_notifies_upstream_and_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(body_json(json!({ "refreshToken": "r1" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let response =
            call(gateway(&server), Method::POST, "/auth/logout", Some(SESSION), None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "success": true }));
        response.assert_session_cleared();
    }

    #[tokio::test]
    async fn test_logout_swallows_upstream_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let response =
            call(gateway(&server), Method::POST, "/auth/logout", Some(SESSION), None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "success": true }));
        response.assert_session_cleared();
    }

    #[tokio::test]
    async fn test_logout_with_unreachable_upstream_still_clears() {
        let response = call(
            gateway_for(&unreachable_upstream()),
            Method::POST,
            "/auth/logout",
            Some(SESSION),
            None,
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        response.assert_session_cleared();
    }

    #[tokio::test]
    async fn test_logout_without_refresh_token_skips_upstream() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = call(gateway(&server), Method::POST, "/auth/logout", None, None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "success": true }));
        response.assert_session_cleared();
    }
}
