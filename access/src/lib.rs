//! Session & access-control engine for the school-management dashboard
//!
//! The dashboard itself is CRUD screens over a REST backend; the part with
//! real invariants is deciding, on every navigation, whether the caller is
//! authenticated, whether their role may view the requested route, and
//! where each role lands and navigates by default. This crate is that
//! engine:
//!
//! - [`CredentialStore`]: the session persisted across two storage
//!   lifetimes (durable vs. ephemeral, the "remember me" split)
//! - [`SessionEvaluator`]: stored credentials → unauthenticated, expired
//!   or valid, purging expired sessions on the way
//! - [`PermissionTable`]: requested path + session → granted or denied,
//!   including the student self-access override on dynamic segments
//! - [`RouteGuard`]: the per-navigation state machine combining the two
//!   into a render directive
//! - [`landing_route`] and [`build_menu`]: role-driven default routes and
//!   navigation menus
//!
//! Everything here is advisory client-side gating; the backend
//! re-validates every request independently.

pub mod context;
pub mod credentials;
pub mod guard;
pub mod landing;
pub mod menu;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod storage;


pub use context::Context;
pub use credentials::{CredentialStore, PersistenceMode};
pub use guard::{Directive, GuardState, RouteGuard};
pub use landing::{DEFAULT_LANDING, landing_route};
pub use menu::{MenuEntry, MenuSection, build_menu};
pub use permissions::{
    Access, PermissionTable, TableBuilder, TableError, school_table, student_self_access,
};
pub use roles::{ROLES, Role};
pub use session::{Session, SessionEvaluator, SessionState, User};
pub use storage::{MemoryArea, StorageArea};
