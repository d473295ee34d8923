//! Session data and the per-navigation session evaluation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::CredentialStore;
use crate::storage::StorageArea;

/// Authenticated user record as issued by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier
    pub id: i64,
    /// Login name
    pub username: String,
    /// Integer role identifier, see [`crate::roles::Role`]
    ///
    /// Kept as a raw id so records with roles this build does not know yet
    /// still deserialize; unknown ids are simply members of nothing.
    pub role_id: i32,
    /// Student record id, present only for the student role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    /// Display image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Session data
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Opaque credential issued by the backend
    pub token: String,
    /// The authenticated user
    pub user: User,
    /// Instant after which the session is invalid
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a session evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No stored session
    Unauthenticated,
    /// A stored session existed but its expiry had passed; it was purged
    ///
    /// Routing treats this exactly like [`SessionState::Unauthenticated`];
    /// the distinction exists for observability and tests.
    Expired,
    /// Live session
    Valid(Session),
}

impl SessionState {
    /// Live session data, if any
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Valid(session) => Some(session),
            _ => None,
        }
    }
}

/// Session check over a credential store
///
/// The result is never cached: the expiry boundary can be crossed while the
/// user sits idle on a page, so the guard re-runs the evaluation on every
/// navigation.
pub struct SessionEvaluator<'a, D, E> {
    store: &'a CredentialStore<D, E>,
}

impl<'a, D: StorageArea, E: StorageArea> SessionEvaluator<'a, D, E> {
    /// Creates an evaluator over the store
    pub fn new(store: &'a CredentialStore<D, E>) -> Self {
        Self { store }
    }

    /// Evaluates against the wall clock
    pub fn evaluate(&self) -> SessionState {
        self.evaluate_at(Utc::now())
    }

    /// Evaluates against an explicit instant
    ///
    /// A session is still valid at exactly its expiry instant; only
    /// `now > expires_at` expires it. An expired session is purged from the
    /// store before returning, so the next read starts from a clean slate.
    pub fn evaluate_at(&self, now: DateTime<Utc>) -> SessionState {
        let Some(session) = self.store.read() else {
            return SessionState::Unauthenticated;
        };

        if now > session.expires_at {
            debug!(
                user = %session.user.username,
                expires_at = %session.expires_at,
                "Session expired, purging stored credentials"
            );
            self.store.clear();
            return SessionState::Expired;
        }

        SessionState::Valid(session)
    }
}
