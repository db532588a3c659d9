//! Identity service contract and the local JWT-backed implementation.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::{JwtConfig, SessionConfig};
use crate::error::AppError;

use super::JwtValidator;

/// Registered user as known to the identity service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// Credential validation and user lookup.
///
/// Session and token issuance happen elsewhere; this service only reads them.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Validate a bearer token and return its subject id
    async fn validate_bearer_token(&self, token: &str) -> Result<String, AppError>;

    /// Subject id of the session attached to the request, if any
    async fn session_identity(&self, headers: &HeaderMap) -> Option<String>;

    async fn lookup_user_by_id(&self, id: &str) -> Option<UserProfile>;
}

/// Identity service validating HS256 tokens locally.
///
/// The session cookie carries a token signed with the same key as bearer
/// tokens. Users come from an in-memory directory.
pub struct LocalIdentityService {
    validator: JwtValidator,
    cookie_name: String,
    users: DashMap<String, UserProfile>,
}

impl LocalIdentityService {
    pub fn new(jwt: &JwtConfig, session: &SessionConfig) -> Self {
        Self {
            validator: JwtValidator::new(jwt),
            cookie_name: session.cookie_name.clone(),
            users: DashMap::new(),
        }
    }

    pub fn insert_user(&self, user: UserProfile) {
        self.users.insert(user.id.clone(), user);
    }

    fn session_cookie<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

#[async_trait]
impl IdentityService for LocalIdentityService {
    async fn validate_bearer_token(&self, token: &str) -> Result<String, AppError> {
        let claims = self.validator.validate(token)?;
        Ok(claims.sub)
    }

    async fn session_identity(&self, headers: &HeaderMap) -> Option<String> {
        let token = self.session_cookie(headers)?;
        match self.validator.validate(token) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }

    async fn lookup_user_by_id(&self, id: &str) -> Option<UserProfile> {
        self.users.get(id).map(|entry| entry.value().clone())
    }
}
