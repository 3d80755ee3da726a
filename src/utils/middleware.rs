use crate::{
    error::AppError,
    models::user::{AuthUser, Viewer},
    state::AppState,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Header the upstream auth gateway sets to the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header the upstream auth gateway sets to the authenticated username.
pub const USERNAME_HEADER: &str = "x-username";

/// Resolves the gateway identity headers into an [`AuthUser`] request
/// extension. Requests without valid identity headers continue as
/// anonymous; this middleware never rejects.
pub async fn identity_middleware(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    if let Some((user_id, username)) = extract_identity(&headers) {
        // Handlers rely on the profile row existing for any identified user.
        if let Err(e) = app_state
            .user_service
            .get_or_create_profile(user_id, &username)
            .await
        {
            warn!("Failed to ensure profile exists for user {}: {}", user_id, e);
        }

        debug!("Authenticated user: {} ({})", user_id, username);
        request.extensions_mut().insert(AuthUser {
            id: user_id,
            username,
        });
    }

    Ok(next.run(request).await)
}

fn extract_identity(headers: &HeaderMap) -> Option<(Uuid, String)> {
    let raw_id = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    let user_id = match Uuid::parse_str(raw_id.trim()) {
        Ok(id) => id,
        Err(e) => {
            warn!("Ignoring malformed {} header: {}", USER_ID_HEADER, e);
            return None;
        }
    };

    let username = headers.get(USERNAME_HEADER)?.to_str().ok()?.trim().to_string();
    if username.is_empty() {
        warn!("Ignoring identity with empty {} header", USERNAME_HEADER);
        return None;
    }

    Some((user_id, username))
}

/// Per-request logging around the whole handler chain.
pub async fn request_logging_middleware(request: Request<Body>, next: Next<Body>) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = get_client_ip(&request);

    let start_time = std::time::Instant::now();

    debug!("Incoming request: {} {} from {}", method, uri, client_ip);

    let response = next.run(request).await;

    let elapsed = start_time.elapsed();
    let status = response.status();

    info!(
        "Request completed: {} {} {} - {}ms",
        method,
        uri,
        status.as_u16(),
        elapsed.as_millis()
    );

    response
}

fn get_client_ip(request: &Request<Body>) -> String {
    let headers = request.headers();

    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(ip) = ip_str.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    "unknown".to_string()
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<AuthUser>() {
            Some(user) => Viewer::User(user.clone()),
            None => Viewer::Anonymous,
        })
    }
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::HeaderValue;

    fn parts_with(user: Option<AuthUser>) -> axum::http::request::Parts {
        let mut request = axum::http::Request::builder().uri("/").body(()).unwrap();
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        let (parts, _) = request.into_parts();
        parts
    }

    #[tokio::test]
    async fn test_viewer_defaults_to_anonymous() {
        let mut parts = parts_with(None);
        let viewer = Viewer::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(matches!(viewer, Viewer::Anonymous));
    }

    #[tokio::test]
    async fn test_viewer_uses_request_identity() {
        let id = Uuid::new_v4();
        let mut parts = parts_with(Some(AuthUser {
            id,
            username: "testuser".to_string(),
        }));
        let viewer = Viewer::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(viewer.user_id(), Some(id));
    }

    #[tokio::test]
    async fn test_auth_user_extractor_rejects_anonymous() {
        let mut parts = parts_with(None);
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[test]
    fn test_extract_identity_requires_both_headers() {
        let id = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert!(extract_identity(&headers).is_none());

        headers.insert(USERNAME_HEADER, HeaderValue::from_static("testuser"));
        let (parsed_id, username) = extract_identity(&headers).unwrap();
        assert_eq!(parsed_id, id);
        assert_eq!(username, "testuser");
    }

    #[test]
    fn test_extract_identity_ignores_malformed_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        headers.insert(USERNAME_HEADER, HeaderValue::from_static("testuser"));
        assert!(extract_identity(&headers).is_none());
    }
}
