//! Session cookie lifecycle.
//!
//! A session is a UUID cookie whose value keys the serialized [`User`] in
//! the user cache. The cache write completes before the `Set-Cookie` header
//! leaves the building, so a cookie in flight always resolves.

use axum::http::header::{HeaderMap, COOKIE};
use idp_cache::CacheStore;
use idp_model::User;
use idp_saml::{SamlError, SamlResult};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::IdpState;

/// Builds the session `Set-Cookie` value.
#[must_use]
pub fn session_cookie(name: &str, value: &str, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; Path=/; Max-Age=0; HttpOnly");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extracts a cookie value from request headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Stores an authenticated user and returns the new session ID.
pub async fn store_user(state: &IdpState, user: &User) -> SamlResult<String> {
    let session = Uuid::new_v4().to_string();
    let blob = serde_json::to_vec(user).map_err(|e| SamlError::Internal(e.to_string()))?;
    state
        .user_cache
        .set(&session, blob)
        .await
        .map_err(|e| SamlError::Cache(e.to_string()))?;
    Ok(session)
}

/// Resolves the request's session cookie to a cached user, if any.
pub async fn user_from_session(state: &IdpState, headers: &HeaderMap) -> Option<User> {
    let session = cookie_value(headers, &state.cookie_name)?;
    let blob = state.user_cache.get(&session).await.ok()??;
    match serde_json::from_slice::<User>(&blob) {
        Ok(user) => {
            debug!(name = %user.name, "found existing session");
            Some(user)
        }
        Err(e) => {
            warn!(error = %e, "session blob did not deserialize; ignoring session");
            None
        }
    }
}

/// Deletes the session named by the request's cookie, if present.
pub async fn delete_session(state: &IdpState, headers: &HeaderMap) {
    if let Some(session) = cookie_value(headers, &state.cookie_name) {
        let _ = state.user_cache.delete(&session).await;
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn cookie_attributes() {
        assert_eq!(
            session_cookie("idp-sess", "abc", true),
            "idp-sess=abc; Path=/; HttpOnly; Secure"
        );
        assert_eq!(
            session_cookie("idp-sess", "abc", false),
            "idp-sess=abc; Path=/; HttpOnly"
        );
        assert_eq!(
            clear_session_cookie("idp-sess", true),
            "idp-sess=; Path=/; Max-Age=0; HttpOnly; Secure"
        );
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; idp-sess=abc-123; theme=dark"),
        );
        assert_eq!(cookie_value(&headers, "idp-sess").as_deref(), Some("abc-123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
