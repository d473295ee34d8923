//! Role → landing route

use crate::roles::Role;

/// Landing route for roles without a bespoke landing page
pub const DEFAULT_LANDING: &str = "/dashboard";

/// Default route for a role
///
/// Consulted right after a successful login and when a caller lands on the
/// bare root path. Both call sites go through this one function; the role
/// set has grown over time and a second hard-coded copy would drift.
pub fn landing_route(role_id: i32) -> &'static str {
    match Role::from_id(role_id) {
        Some(Role::Admin) => "/dashboard/admin",
        Some(Role::Teacher) => "/dashboard/teacher",
        Some(Role::Accountant) => "/dashboard/accountant",
        Some(Role::Student) => "/dashboard/student",
        Some(Role::Librarian) => "/library",
        None => DEFAULT_LANDING,
    }
}
