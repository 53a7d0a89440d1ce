//! HTTP-level bearer/header authentication. This component has no
//! knowledge of JSON-RPC; it decides accept/reject before any request
//! body is parsed.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Accepted,
    Missing,
    Invalid,
}

/// Decides whether a request carries a valid credential against the
/// configured shared secret.
#[derive(Clone)]
pub struct Authenticator {
    access_token: String,
}

impl Authenticator {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Inspect headers in precedence order: `Authorization: Bearer <token>`,
    /// then `X-Access-Token: <token>`. Query-parameter credentials are
    /// never accepted, even if present.
    pub fn authenticate(&self, headers: &axum::http::HeaderMap, uri: &axum::http::Uri) -> AuthOutcome {
        if let Some(query) = uri.query() {
            if query.contains("token=") || query.contains("access_token=") || query.contains("api_key=") {
                warn!("request carried a credential-like query parameter; query-string credentials are never accepted");
            }
        }

        let presented = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .or_else(|| headers.get("x-access-token").and_then(|v| v.to_str().ok()));

        match presented {
            None => AuthOutcome::Missing,
            Some(token) => {
                if constant_time_eq(token.as_bytes(), self.access_token.as_bytes()) {
                    AuthOutcome::Accepted
                } else {
                    AuthOutcome::Invalid
                }
            }
        }
    }
}

/// Byte-for-byte comparison whose running time does not depend on the
/// content of either input.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Axum middleware applied in front of `/mcp`: missing credential -> 403,
/// invalid credential -> 401, matching the HTTP status code discipline.
/// `/mcp/health` and `/mcp/healthz` are mounted outside this layer and
/// never pass through it.
pub async fn require_auth(
    State(authenticator): State<Authenticator>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match authenticator.authenticate(request.headers(), request.uri()) {
        AuthOutcome::Accepted => next.run(request).await,
        AuthOutcome::Missing => {
            warn!("request rejected: no credential presented");
            StatusCode::FORBIDDEN.into_response()
        }
        AuthOutcome::Invalid => {
            warn!("request rejected: invalid credential");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Uri};

    fn uri() -> Uri {
        "/mcp".parse().unwrap()
    }

    #[test]
    fn test_missing_credential_is_missing() {
        let auth = Authenticator::new("good");
        let headers = HeaderMap::new();
        assert_eq!(auth.authenticate(&headers, &uri()), AuthOutcome::Missing);
    }

    #[test]
    fn test_valid_bearer_token_is_accepted() {
        let auth = Authenticator::new("good");
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer good"));
        assert_eq!(auth.authenticate(&headers, &uri()), AuthOutcome::Accepted);
    }

    #[test]
    fn test_invalid_bearer_token_is_invalid() {
        let auth = Authenticator::new("good");
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"));
        assert_eq!(auth.authenticate(&headers, &uri()), AuthOutcome::Invalid);
    }

    #[test]
    fn test_legacy_header_token_is_accepted() {
        let auth = Authenticator::new("good");
        let mut headers = HeaderMap::new();
        headers.insert("x-access-token", HeaderValue::from_static("good"));
        assert_eq!(auth.authenticate(&headers, &uri()), AuthOutcome::Accepted);
    }

    #[test]
    fn test_bearer_takes_precedence_over_header_token() {
        let auth = Authenticator::new("good");
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer good"));
        headers.insert("x-access-token", HeaderValue::from_static("wrong"));
        assert_eq!(auth.authenticate(&headers, &uri()), AuthOutcome::Accepted);
    }

    #[test]
    fn test_query_parameter_credential_never_accepted() {
        let auth = Authenticator::new("good");
        let headers = HeaderMap::new();
        let uri: Uri = "/mcp?token=good".parse().unwrap();
        assert_eq!(auth.authenticate(&headers, &uri), AuthOutcome::Missing);
    }

    #[test]
    fn test_constant_time_eq_rejects_mismatched_length() {
        assert!(!constant_time_eq(b"short", b"longer-value"));
    }
}
