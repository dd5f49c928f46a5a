use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use crate::error::AppError;

// Session keys for the authenticated-user binding.
pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";

// Internal key holding the one-shot flash queue.
const FLASH_KEY: &str = "_flashes";

/// Severity
///
/// Severity tag attached to every flash notice, matching the Bootstrap-style
/// alert categories the templates expect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

/// Flash
///
/// A one-shot, severity-tagged, human-readable message: queued on one request,
/// drained into the next rendered view, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flash {
    pub severity: Severity,
    pub message: String,
}

/// SessionHandle
///
/// The explicit session-store interface of the application: typed get/set/clear
/// operations plus the flash queue, layered over a `tower-sessions` session.
/// The backing store is pluggable through `SessionManagerLayer` (in-memory by
/// default); nothing in here is coupled to the cookie transport.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Session,
}

impl SessionHandle {
    pub fn new(inner: Session) -> Self {
        Self { inner }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        Ok(self.inner.get(key).await?)
    }

    pub async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: T,
    ) -> Result<(), AppError> {
        Ok(self.inner.insert(key, value).await?)
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.remove::<serde_json::Value>(key).await?;
        Ok(())
    }

    /// Wipes the whole session, flash queue included. The session binding
    /// helpers below are the normal way to log a user out; this exists for
    /// completeness of the get/set/clear contract.
    pub async fn clear(&self) {
        self.inner.clear().await;
    }

    // --- Authenticated-user binding ---

    pub async fn user_id(&self) -> Result<Option<i32>, AppError> {
        self.get(USER_ID_KEY).await
    }

    pub async fn username(&self) -> Result<Option<String>, AppError> {
        self.get(USERNAME_KEY).await
    }

    /// Establishes the session binding after a successful login.
    pub async fn bind_user(&self, user_id: i32, username: &str) -> Result<(), AppError> {
        self.set(USER_ID_KEY, user_id).await?;
        self.set(USERNAME_KEY, username.to_string()).await
    }

    /// Clears the session binding. Idempotent: clearing an anonymous session
    /// is a no-op, not an error. The flash queue survives so that a logout
    /// notice can still be shown on the next page.
    pub async fn clear_user(&self) -> Result<(), AppError> {
        self.remove(USER_ID_KEY).await?;
        self.remove(USERNAME_KEY).await
    }

    // --- Flash queue ---

    /// Queues a one-shot notice for the next rendered page.
    pub async fn flash(
        &self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<(), AppError> {
        let mut queue: Vec<Flash> = self.get(FLASH_KEY).await?.unwrap_or_default();
        queue.push(Flash {
            severity,
            message: message.into(),
        });
        self.set(FLASH_KEY, queue).await
    }

    /// Drains the flash queue. Messages are returned at most once.
    pub async fn take_flashes(&self) -> Result<Vec<Flash>, AppError> {
        Ok(self
            .inner
            .remove::<Vec<Flash>>(FLASH_KEY)
            .await?
            .unwrap_or_default())
    }
}

/// SessionHandle Extractor Implementation
///
/// Delegates to the `tower-sessions` extractor, so any handler can take a
/// `SessionHandle` argument as long as the `SessionManagerLayer` is installed
/// on the router.
impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let inner = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(inner))
    }
}
