//! Identity plumbing for the /api surface.
//!
//! Bearer token → operator email, resolved from `[[auth.users]]` in
//! volley.toml, then checked against the whitelist. The dispatch core never
//! sees any of this — it only receives already-authorised requests.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;

/// The authenticated operator, inserted into request extensions by
/// [`require_identity`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

/// Middleware guarding every /api route: resolves the bearer token to an
/// email and enforces the whitelist.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return unauthorized("missing bearer token");
    };

    let auth = &state.config.auth;
    let Some(user) = auth.users.iter().find(|u| u.token == token) else {
        warn!("request with unknown bearer token rejected");
        return unauthorized("unknown token");
    };

    if !auth.allowed_emails.iter().any(|e| e == &user.email) {
        warn!(email = %user.email, "account is not whitelisted");
        return forbidden("your account is not whitelisted");
    }

    req.extensions_mut().insert(Identity {
        email: user.email.clone(),
    });
    next.run(req).await
}

/// True when `identity` is the configured owner. Config writes are
/// owner-only; everything else needs just the whitelist.
pub fn is_owner(state: &AppState, identity: &Identity) -> bool {
    state.config.auth.owner_email.as_deref() == Some(identity.email.as_str())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized(reason: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": reason })),
    )
        .into_response()
}

fn forbidden(reason: &str) -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "message": reason }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer my-token"),
        );
        assert_eq!(extract_bearer(&headers), Some("my-token"));
    }

    #[test]
    fn rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_bearer(&headers), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
