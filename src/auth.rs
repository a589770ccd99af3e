use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::token_expiration_hours;
use crate::core::errors::ApiError;
use crate::core::helpers::now;
use crate::handlers::AppState;
use crate::models::models::TokenData;

/// Resolves a bearer credential to the caller's user id.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<String>;
}

/// In-memory token table with expiry.
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, TokenData>>,
    expiration_hours: i64,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new(token_expiration_hours())
    }
}

impl TokenRegistry {
    pub fn new(expiration_hours: i64) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            expiration_hours,
        }
    }

    /// Issues a fresh random token for `user_id`.
    pub fn issue(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.register(&token, user_id);
        token
    }

    pub fn register(&self, token: &str, user_id: &str) {
        self.insert(
            token,
            TokenData {
                user_id: user_id.to_string(),
                created_at: now(),
            },
        );
    }

    pub fn insert(&self, token: &str, data: TokenData) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.insert(token.to_string(), data);
    }

    fn is_expired(&self, data: &TokenData) -> bool {
        (now() - data.created_at).num_hours() > self.expiration_hours
    }

    /// Drops `token` if it is still present and expired.
    fn evict_expired(&self, token: &str) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        if tokens.get(token).is_some_and(|data| self.is_expired(data)) {
            tokens.remove(token);
            debug!("expired token evicted");
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl IdentityResolver for TokenRegistry {
    fn resolve(&self, token: &str) -> Option<String> {
        {
            let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
            let data = tokens.get(token)?;
            if !self.is_expired(data) {
                return Some(data.user_id.clone());
            }
        }
        self.evict_expired(token);
        None
    }
}

/// Authenticated caller, extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<Caller, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(ApiError::Unauthenticated)?;
    let token = bearer_token(req).ok_or(ApiError::Unauthenticated)?;
    let user_id = state
        .identities
        .resolve(token)
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Caller { user_id })
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issued_token_resolves_to_user() {
        let registry = TokenRegistry::new(24);
        let token = registry.issue("alice");
        assert_eq!(registry.resolve(&token).as_deref(), Some("alice"));
        assert_eq!(registry.resolve("unknown"), None);
    }

    #[test]
    fn expired_token_no_longer_resolves() {
        let registry = TokenRegistry::new(1);
        registry.insert(
            "old",
            TokenData {
                user_id: "alice".to_string(),
                created_at: now() - Duration::hours(3),
            },
        );
        assert_eq!(registry.resolve("old"), None);
    }

    #[test]
    fn expired_token_is_evicted_on_resolve() {
        let registry = TokenRegistry::new(1);
        registry.insert(
            "old",
            TokenData {
                user_id: "alice".to_string(),
                created_at: now() - Duration::hours(3),
            },
        );
        let fresh = registry.issue("bob");
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.resolve("old"), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(&fresh).as_deref(), Some("bob"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn bearer_prefix_is_required() {
        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc"));

        let req = actix_web::test::TestRequest::default()
            .insert_header(("Authorization", "abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
