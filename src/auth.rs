/// Session gating and authentication extractors
///
/// Entry is gated by two static passphrases, one for visitors and one for
/// the administrator. A successful login mints an opaque session token
/// held in memory with a role and an expiry; the token is the
/// session-scoped entry flag, gone when the process restarts. This is
/// deliberately not a credential system.
use crate::{
    context::AppContext,
    error::{GalleryError, GalleryResult},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Entry role granted by a passphrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Visitor,
    Admin,
}

/// A minted session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// In-memory session registry
pub struct SessionManager {
    visitor_pass: String,
    admin_pass: String,
    ttl: Duration,
    sessions: RwLock<HashMap<String, (Role, DateTime<Utc>)>>,
}

impl SessionManager {
    /// Create a new session manager from gate configuration
    pub fn new(visitor_pass: String, admin_pass: String, ttl_secs: u64) -> Self {
        Self {
            visitor_pass,
            admin_pass,
            ttl: Duration::seconds(ttl_secs as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Exchange a passphrase for a session token
    pub async fn login(&self, passphrase: &str) -> GalleryResult<Session> {
        let role = if passphrase == self.admin_pass {
            Role::Admin
        } else if passphrase == self.visitor_pass {
            Role::Visitor
        } else {
            return Err(GalleryError::Authentication(
                "Incorrect passphrase".to_string(),
            ));
        };

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.ttl;

        self.sessions
            .write()
            .await
            .insert(token.clone(), (role, expires_at));

        tracing::info!("Opened {:?} session", role);

        Ok(Session {
            token,
            role,
            expires_at,
        })
    }

    /// Validate a token, returning the role it carries
    pub async fn validate(&self, token: &str) -> GalleryResult<Role> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some((role, expires_at)) if *expires_at > Utc::now() => Ok(*role),
            Some(_) => Err(GalleryError::Authentication(
                "Session expired".to_string(),
            )),
            None => Err(GalleryError::Authentication(
                "Unknown session token".to_string(),
            )),
        }
    }

    /// Drop a session; unknown tokens are ignored
    pub async fn logout(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Remove expired sessions, returning how many were dropped
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        before - sessions.len()
    }
}

/// Extract the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Authenticated context - any valid session
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppContext> for ViewerContext {
    type Rejection = GalleryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            GalleryError::Authentication("Missing authorization header".to_string())
        })?;

        let role = state.sessions.validate(&token).await?;

        Ok(ViewerContext { role })
    }
}

/// Administrator context - requires the admin role
#[derive(Debug, Clone)]
pub struct AdminContext;

#[async_trait]
impl FromRequestParts<AppContext> for AdminContext {
    type Rejection = GalleryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let viewer = ViewerContext::from_request_parts(parts, state).await?;

        if viewer.role != Role::Admin {
            return Err(GalleryError::Authorization(
                "Administrator session required".to_string(),
            ));
        }

        Ok(AdminContext)
    }
}
