use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::animal::Animal;

use super::IdentityService;

/// Determines who is calling and whether they own an animal.
#[derive(Clone)]
pub struct AuthorizationResolver {
    identity: Arc<dyn IdentityService>,
}

impl AuthorizationResolver {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Resolve the caller's subject id.
    ///
    /// A valid bearer token wins; otherwise the session is consulted. An
    /// invalid bearer token falls through to the session. `None` means the
    /// caller is anonymous, which is not an error at this level.
    #[tracing::instrument(name = "auth.resolve_caller", skip_all)]
    pub async fn resolve_caller_identity(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(token) = extract_bearer_token(headers) {
            match self.identity.validate_bearer_token(token).await {
                Ok(subject) => return Some(subject),
                Err(e) => {
                    tracing::debug!(error = %e, "Bearer token rejected, trying session");
                }
            }
        }

        self.identity.session_identity(headers).await
    }

    pub fn is_owner(identity: Option<&str>, animal: &Animal) -> bool {
        identity.is_some_and(|id| id == animal.owner_id)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserProfile;
    use crate::error::AppError;
    use async_trait::async_trait;
    use axum::http::HeaderValue;

    /// Accepts "good-<id>" bearer tokens and a fixed session subject
    struct StubIdentity {
        session: Option<String>,
    }

    #[async_trait]
    impl IdentityService for StubIdentity {
        async fn validate_bearer_token(&self, token: &str) -> Result<String, AppError> {
            token
                .strip_prefix("good-")
                .map(str::to_string)
                .ok_or_else(|| AppError::Auth("bad token".to_string()))
        }

        async fn session_identity(&self, _headers: &HeaderMap) -> Option<String> {
            self.session.clone()
        }

        async fn lookup_user_by_id(&self, _id: &str) -> Option<UserProfile> {
            None
        }
    }

    fn resolver(session: Option<&str>) -> AuthorizationResolver {
        AuthorizationResolver::new(Arc::new(StubIdentity {
            session: session.map(str::to_string),
        }))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_bearer_takes_precedence() {
        let resolver = resolver(Some("session-user"));
        let caller = resolver.resolve_caller_identity(&bearer("good-alice")).await;
        assert_eq!(caller.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_invalid_bearer_falls_back_to_session() {
        let resolver = resolver(Some("session-user"));
        let caller = resolver.resolve_caller_identity(&bearer("forged")).await;
        assert_eq!(caller.as_deref(), Some("session-user"));
    }

    #[tokio::test]
    async fn test_anonymous() {
        let resolver = resolver(None);
        assert!(resolver
            .resolve_caller_identity(&HeaderMap::new())
            .await
            .is_none());
    }

    #[test]
    fn test_is_owner() {
        let animal = Animal::new("a1", "Biscuit", "u1");
        assert!(AuthorizationResolver::is_owner(Some("u1"), &animal));
        assert!(!AuthorizationResolver::is_owner(Some("u2"), &animal));
        assert!(!AuthorizationResolver::is_owner(None, &animal));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&bearer("abc")), Some("abc"));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
