//! Credential store: the single owner of persisted session state
//!
//! Two storage lifetimes coexist: a durable one ("remember me" checked)
//! and an ephemeral one scoped to the tab. At most one of them holds a
//! readable session at a time; writing in one mode purges the other. The
//! durable area additionally carries a remembered username and a marker
//! flag recording that the last login asked to be remembered.
//!
//! All access to the raw storage keys goes through this type. Reads are
//! fail closed: a partial or unparseable record counts as no session.

use chrono::DateTime;
use tracing::warn;

use crate::session::{Session, User};
use crate::storage::StorageArea;

/// Storage key for the opaque auth token
const TOKEN_KEY: &str = "auth_token";
/// Storage key for the serialized user record
const USER_KEY: &str = "auth_user";
/// Storage key for the session expiry, epoch milliseconds as decimal text
const EXPIRES_AT_KEY: &str = "auth_expires_at";
/// Durable-only: username remembered across sessions
const REMEMBERED_USERNAME_KEY: &str = "remembered_username";
/// Durable-only marker: set when the last login asked to be remembered
const REMEMBER_ME_KEY: &str = "remember_me";

/// Which storage lifetime backs a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Survives application restarts ("remember me" checked)
    Durable,
    /// Scoped to the current tab/process
    Ephemeral,
}

/// Dual-lifetime store for the auth token, user record and session expiry
///
/// `D` is the durable area, `E` the ephemeral one. The store performs no
/// network or file I/O of its own; it is pure local-state management over
/// the injected areas.
#[derive(Debug)]
pub struct CredentialStore<D, E> {
    durable: D,
    ephemeral: E,
}

impl<D: StorageArea, E: StorageArea> CredentialStore<D, E> {
    /// Creates a store over the two areas
    pub fn new(durable: D, ephemeral: E) -> Self {
        Self { durable, ephemeral }
    }

    /// Persists a session in the area selected by `mode`
    ///
    /// Switching modes clears the other lifetime's session copies so at
    /// most one readable session exists. An ephemeral write also drops the
    /// remembered username and its marker: a login with "remember me"
    /// unchecked must not keep the previous durable login's username
    /// around.
    pub fn write(&self, session: &Session, mode: PersistenceMode) {
        match mode {
            PersistenceMode::Durable => {
                remove_session(&self.ephemeral);
                put_session(&self.durable, session);
                self.durable
                    .set(REMEMBERED_USERNAME_KEY, &session.user.username);
                self.durable.set(REMEMBER_ME_KEY, "true");
            }
            PersistenceMode::Ephemeral => {
                remove_session(&self.durable);
                self.durable.remove(REMEMBERED_USERNAME_KEY);
                self.durable.remove(REMEMBER_ME_KEY);
                put_session(&self.ephemeral, session);
            }
        }
    }

    /// Reads the stored session, ephemeral lifetime first
    ///
    /// Only a complete triple (token, user, expiry) counts; an area holding
    /// a partial or malformed record is treated as absent and the other
    /// area is consulted.
    pub fn read(&self) -> Option<Session> {
        read_session(&self.ephemeral).or_else(|| read_session(&self.durable))
    }

    /// Removes the session from both lifetimes
    ///
    /// The remembered username survives only when the durable marker is
    /// set. A user who unchecked "remember me" on their last login gets
    /// the username dropped too, rather than silently retained from an
    /// older durable login.
    pub fn clear(&self) {
        remove_session(&self.durable);
        remove_session(&self.ephemeral);

        if self.durable.get(REMEMBER_ME_KEY).as_deref() != Some("true") {
            self.durable.remove(REMEMBERED_USERNAME_KEY);
            self.durable.remove(REMEMBER_ME_KEY);
        }
    }

    /// Username remembered from the last durable login, if any
    pub fn remembered_username(&self) -> Option<String> {
        self.durable.get(REMEMBERED_USERNAME_KEY)
    }
}

/// Writes the session triple into one area
///
/// The triple is written all-or-nothing: if the user record does not
/// serialize, no key is touched, so a partial record can never appear.
fn put_session<A: StorageArea>(area: &A, session: &Session) {
    let user = match serde_json::to_string(&session.user) {
        Ok(user) => user,
        Err(err) => {
            warn!(%err, "Cannot serialize user record, session not persisted");
            return;
        }
    };

    area.set(TOKEN_KEY, &session.token);
    area.set(USER_KEY, &user);
    area.set(
        EXPIRES_AT_KEY,
        &session.expires_at.timestamp_millis().to_string(),
    );
}

/// Removes the session triple from one area
fn remove_session<A: StorageArea>(area: &A) {
    area.remove(TOKEN_KEY);
    area.remove(USER_KEY);
    area.remove(EXPIRES_AT_KEY);
}

/// Reads a complete session triple from one area
///
/// Missing pieces and parse failures both yield `None`; malformed stored
/// state must never escalate past this boundary.
fn read_session<A: StorageArea>(area: &A) -> Option<Session> {
    let token = area.get(TOKEN_KEY)?;
    let user = area.get(USER_KEY)?;
    let expires_at = area.get(EXPIRES_AT_KEY)?;

    let user: User = match serde_json::from_str(&user) {
        Ok(user) => user,
        Err(err) => {
            warn!(%err, "Malformed stored user record, treating session as absent");
            return None;
        }
    };

    let expires_at = match expires_at
        .parse()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
    {
        Some(expires_at) => expires_at,
        None => {
            warn!(%expires_at, "Malformed stored expiry, treating session as absent");
            return None;
        }
    };

    Some(Session {
        token,
        user,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::roles::Role;
    use crate::storage::MemoryArea;
    use crate::tests::session;

    fn store() -> CredentialStore<Arc<MemoryArea>, Arc<MemoryArea>> {
        CredentialStore::new(Arc::new(MemoryArea::new()), Arc::new(MemoryArea::new()))
    }

    /// Direct handle on an area for tampering with raw keys
    fn durable_of(
        store: &CredentialStore<Arc<MemoryArea>, Arc<MemoryArea>>,
    ) -> Arc<MemoryArea> {
        Arc::clone(&store.durable)
    }

    fn ephemeral_of(
        store: &CredentialStore<Arc<MemoryArea>, Arc<MemoryArea>>,
    ) -> Arc<MemoryArea> {
        Arc::clone(&store.ephemeral)
    }

    #[test]
    fn empty_store_reads_nothing() {
        let store = store();
        assert_eq!(store.read(), None);
        assert_eq!(store.remembered_username(), None);
    }

    #[test]
    fn durable_write_round_trips() {
        let store = store();
        let session = session(Role::Admin);

        store.write(&session, PersistenceMode::Durable);

        assert_eq!(store.read(), Some(session.clone()));
        assert_eq!(
            store.remembered_username().as_deref(),
            Some(session.user.username.as_str())
        );
    }

    #[test]
    fn ephemeral_write_round_trips() {
        let store = store();
        let session = session(Role::Teacher);

        store.write(&session, PersistenceMode::Ephemeral);

        assert_eq!(store.read(), Some(session));
        // No username convenience outside durable mode
        assert_eq!(store.remembered_username(), None);
    }

    #[test]
    fn ephemeral_write_purges_durable_session() {
        let store = store();
        let remembered = session(Role::Admin);
        let fresh = session(Role::Teacher);

        store.write(&remembered, PersistenceMode::Durable);
        store.write(&fresh, PersistenceMode::Ephemeral);

        assert_eq!(store.read(), Some(fresh));
        assert_eq!(read_session(&durable_of(&store)), None);
    }

    #[test]
    fn durable_write_purges_ephemeral_session() {
        let store = store();
        let first = session(Role::Teacher);
        let second = session(Role::Admin);

        store.write(&first, PersistenceMode::Ephemeral);
        store.write(&second, PersistenceMode::Durable);

        assert_eq!(store.read(), Some(second));
        assert_eq!(read_session(&ephemeral_of(&store)), None);
    }

    #[test]
    fn remember_me_off_login_drops_remembered_username() {
        let store = store();
        store.write(&session(Role::Admin), PersistenceMode::Durable);
        assert!(store.remembered_username().is_some());

        store.write(&session(Role::Admin), PersistenceMode::Ephemeral);
        assert_eq!(store.remembered_username(), None);

        // A later clear must not resurrect it either
        store.clear();
        assert_eq!(store.remembered_username(), None);
    }

    #[test]
    fn clear_keeps_username_from_durable_login() {
        let store = store();
        let session = session(Role::Accountant);
        store.write(&session, PersistenceMode::Durable);

        store.clear();

        assert_eq!(store.read(), None);
        assert_eq!(
            store.remembered_username().as_deref(),
            Some(session.user.username.as_str())
        );
    }

    #[test]
    fn clear_drops_username_without_marker() {
        let store = store();
        store.write(&session(Role::Admin), PersistenceMode::Durable);
        // Marker gone but username still present, as if written by an
        // older build
        durable_of(&store).remove(REMEMBER_ME_KEY);

        store.clear();

        assert_eq!(store.remembered_username(), None);
    }

    #[test]
    fn partial_record_is_absent() {
        let store = store();
        let session = session(Role::Teacher);

        // Ephemeral holds only a token; the complete durable record wins
        store.write(&session, PersistenceMode::Durable);
        ephemeral_of(&store).set(TOKEN_KEY, "stray-token");
        assert_eq!(store.read(), Some(session));

        // A token alone anywhere is no session at all
        let store = self::store();
        durable_of(&store).set(TOKEN_KEY, "stray-token");
        assert_eq!(store.read(), None);
    }

    #[test]
    fn malformed_user_record_is_absent() {
        let store = store();
        store.write(&session(Role::Admin), PersistenceMode::Durable);
        durable_of(&store).set(USER_KEY, "{not json");

        assert_eq!(store.read(), None);
    }

    #[test]
    fn malformed_expiry_is_absent() {
        let store = store();
        store.write(&session(Role::Admin), PersistenceMode::Ephemeral);
        ephemeral_of(&store).set(EXPIRES_AT_KEY, "tomorrowish");

        assert_eq!(store.read(), None);
    }

    #[test]
    fn ephemeral_session_does_not_survive_restart() {
        let durable = Arc::new(MemoryArea::new());
        let store = CredentialStore::new(Arc::clone(&durable), Arc::new(MemoryArea::new()));
        store.write(&session(Role::Student), PersistenceMode::Ephemeral);
        assert!(store.read().is_some());

        // Restart: same durable area, fresh ephemeral one
        let store = CredentialStore::new(durable, Arc::new(MemoryArea::new()));
        assert_eq!(store.read(), None);
    }

    #[test]
    fn durable_session_survives_restart() {
        let durable = Arc::new(MemoryArea::new());
        let store = CredentialStore::new(Arc::clone(&durable), Arc::new(MemoryArea::new()));
        let session = session(Role::Student);
        store.write(&session, PersistenceMode::Durable);

        let store = CredentialStore::new(durable, Arc::new(MemoryArea::new()));
        assert_eq!(store.read(), Some(session));
    }
}
