//! Engine assembly shared between the login flow and the router

use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::guard::RouteGuard;
use crate::permissions::{PermissionTable, TableError, school_table};
use crate::storage::{MemoryArea, StorageArea};

struct ContextInner<D, E> {
    /// The single shared mutable resource of the engine
    store: CredentialStore<D, E>,
    /// Immutable permission configuration
    table: PermissionTable,
}

/// Shared engine state
///
/// Cheap to clone. The login flow writes sessions through [`store`] while
/// the router spawns guards off the same context; both observe the same
/// storage areas immediately.
///
/// [`store`]: Context::store
pub struct Context<D, E>(Arc<ContextInner<D, E>>);

impl<D, E> Clone for Context<D, E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: StorageArea, E: StorageArea> Context<D, E> {
    /// Wires a context over the given store and table
    pub fn new(store: CredentialStore<D, E>, table: PermissionTable) -> Self {
        Self(Arc::new(ContextInner { store, table }))
    }

    /// Access to the credential store
    pub fn store(&self) -> &CredentialStore<D, E> {
        &self.0.store
    }

    /// Access to the permission table
    pub fn table(&self) -> &PermissionTable {
        &self.0.table
    }

    /// A guard for a fresh navigation sequence
    pub fn guard(&self) -> RouteGuard<D, E> {
        RouteGuard::new(self.clone())
    }
}

impl Context<MemoryArea, MemoryArea> {
    /// Context over in-memory areas and the dashboard permission table
    ///
    /// The wiring used by tests and by embedders without a browser-like
    /// storage backend.
    pub fn in_memory() -> Result<Self, TableError> {
        let store = CredentialStore::new(MemoryArea::new(), MemoryArea::new());
        Ok(Self::new(store, school_table()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::PersistenceMode;
    use crate::roles::Role;
    use crate::tests::session;

    #[test]
    fn clones_share_the_store() {
        let ctx = Context::in_memory().unwrap();
        let other = ctx.clone();

        ctx.store()
            .write(&session(Role::Admin), PersistenceMode::Durable);
        assert!(other.store().read().is_some());

        other.store().clear();
        assert_eq!(ctx.store().read(), None);
    }
}
