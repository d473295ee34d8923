//! Role → route permission table
//!
//! The table is immutable configuration, validated once at startup. A
//! requested path is normalized to a canonical pattern before the role
//! membership check: literal patterns match exactly, and prefix families
//! collapse whole trees of detail/sub-pages onto the permission of their
//! parent list page. The sole identity-based exception is the student
//! self-access override, evaluated strictly before the role list of the
//! family it is attached to and inert for every other role.
//!
//! A path matching no pattern at all is granted. The default predates the
//! table being fully enumerated and is kept so screens registered before
//! their routes stay reachable; tightening it would cut them off. See
//! DESIGN.md for the open question around it.

use std::collections::HashSet;

use derivative::Derivative;
use thiserror::Error;
use tracing::debug;

use crate::roles::Role;
use crate::session::Session;

/// Table construction errors, fatal at load time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Pattern {pattern} allows no roles")]
    EmptyRoles { pattern: String },
    #[error("Pattern {pattern} registered twice")]
    DuplicatePattern { pattern: String },
    #[error("Prefix family {prefix} registered twice")]
    DuplicatePrefix { prefix: String },
    #[error("Prefix family {prefix} does not end with '/'")]
    UnterminatedPrefix { prefix: String },
}

/// Permission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

/// Identity-based exception attached to a prefix family
///
/// Returning `true` grants; `false` falls through to the family role list.
/// A resolver can only ever widen access for the family it is attached to,
/// never narrow it.
pub type DynamicResolver = Box<dyn Fn(&str, &Session) -> bool + Send + Sync>;

/// Literal route pattern and its allowed roles
#[derive(Debug)]
struct RouteRule {
    pattern: String,
    roles: Vec<Role>,
}

/// Family of dynamic paths collapsing onto one canonical pattern
#[derive(Derivative)]
#[derivative(Debug)]
struct PrefixFamily {
    /// Path prefix, '/'-terminated; matches any path with a further segment
    prefix: String,
    /// Allowed roles, inherited by every path under the prefix
    roles: Vec<Role>,
    /// Identity-based override, checked before `roles`
    #[derivative(Debug = "ignore")]
    resolver: Option<DynamicResolver>,
}

/// Builder for [`PermissionTable`]
#[derive(Debug, Default)]
pub struct TableBuilder {
    rules: Vec<RouteRule>,
    families: Vec<PrefixFamily>,
}

impl TableBuilder {
    /// Registers a literal route pattern
    pub fn route(mut self, pattern: impl Into<String>, roles: &[Role]) -> Self {
        self.rules.push(RouteRule {
            pattern: pattern.into(),
            roles: roles.to_vec(),
        });
        self
    }

    /// Registers a prefix family
    pub fn family(self, prefix: impl Into<String>, roles: &[Role]) -> Self {
        self.family_inner(prefix.into(), roles, None)
    }

    /// Registers a prefix family with an identity-based override
    pub fn family_with_override(
        self,
        prefix: impl Into<String>,
        roles: &[Role],
        resolver: impl Fn(&str, &Session) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.family_inner(prefix.into(), roles, Some(Box::new(resolver)))
    }

    fn family_inner(
        mut self,
        prefix: String,
        roles: &[Role],
        resolver: Option<DynamicResolver>,
    ) -> Self {
        self.families.push(PrefixFamily {
            prefix,
            roles: roles.to_vec(),
            resolver,
        });
        self
    }

    /// Validates the configuration and freezes the table
    ///
    /// An entry with no roles or a pattern registered twice is a
    /// programming defect; it fails here, at load time, never at request
    /// time.
    pub fn build(self) -> Result<PermissionTable, TableError> {
        let mut patterns = HashSet::new();
        for rule in &self.rules {
            if rule.roles.is_empty() {
                return Err(TableError::EmptyRoles {
                    pattern: rule.pattern.clone(),
                });
            }
            if !patterns.insert(rule.pattern.as_str()) {
                return Err(TableError::DuplicatePattern {
                    pattern: rule.pattern.clone(),
                });
            }
        }

        let mut prefixes = HashSet::new();
        for family in &self.families {
            if !family.prefix.ends_with('/') {
                return Err(TableError::UnterminatedPrefix {
                    prefix: family.prefix.clone(),
                });
            }
            if family.roles.is_empty() {
                return Err(TableError::EmptyRoles {
                    pattern: family.prefix.clone(),
                });
            }
            if !prefixes.insert(family.prefix.as_str()) {
                return Err(TableError::DuplicatePrefix {
                    prefix: family.prefix.clone(),
                });
            }
        }

        Ok(PermissionTable {
            rules: self.rules,
            families: self.families,
        })
    }
}

/// Static route → allowed-roles configuration
#[derive(Debug)]
pub struct PermissionTable {
    rules: Vec<RouteRule>,
    families: Vec<PrefixFamily>,
}

impl PermissionTable {
    /// Builder entry point
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Resolves a requested path for the given session
    pub fn resolve(&self, path: &str, session: &Session) -> Access {
        if let Some(rule) = self.rules.iter().find(|rule| rule.pattern == path) {
            return membership(&rule.roles, session);
        }

        if let Some(family) = self.matching_family(path) {
            if let Some(resolver) = &family.resolver {
                if resolver(path, session) {
                    debug!(
                        path,
                        user = %session.user.username,
                        "Granted by identity override"
                    );
                    return Access::Granted;
                }
            }
            return membership(&family.roles, session);
        }

        // Unregistered path: grant, see the module docs
        debug!(path, "No registered pattern, granting by default");
        Access::Granted
    }

    /// Longest registered prefix matching the path
    ///
    /// Strict "longer" comparison keeps the first-registered family on a
    /// length tie, so resolution does not depend on iteration quirks.
    fn matching_family(&self, path: &str) -> Option<&PrefixFamily> {
        let mut best: Option<&PrefixFamily> = None;
        for family in &self.families {
            if !path.starts_with(family.prefix.as_str()) || path.len() == family.prefix.len() {
                continue;
            }
            if best.is_none_or(|b| family.prefix.len() > b.prefix.len()) {
                best = Some(family);
            }
        }
        best
    }
}

/// Role-list membership check for the session's role
///
/// Unknown role ids are members of nothing.
fn membership(roles: &[Role], session: &Session) -> Access {
    let member =
        Role::from_id(session.user.role_id).is_some_and(|role| roles.contains(&role));
    if member { Access::Granted } else { Access::Denied }
}

/// First path segment after `prefix`, if non-empty
fn segment_after<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    let segment = rest.split('/').next()?;
    (!segment.is_empty()).then_some(segment)
}

/// Student self-access override for a prefix family
///
/// Grants when the caller is a student and the identifier segment right
/// after `prefix` equals their own `student_id`. The stored id is rendered
/// as canonical decimal text and compared byte-wise against the raw path
/// segment, so `"077"` does not match id `77`; that is the one identifier
/// comparison rule in the engine. Every other role falls through to the
/// family role list.
pub fn student_self_access(
    prefix: &'static str,
) -> impl Fn(&str, &Session) -> bool + Send + Sync {
    move |path, session| {
        if Role::from_id(session.user.role_id) != Some(Role::Student) {
            return false;
        }
        let Some(own_id) = session.user.student_id else {
            return false;
        };
        segment_after(path, prefix).is_some_and(|segment| segment == own_id.to_string())
    }
}

/// The dashboard's route permission configuration
pub fn school_table() -> Result<PermissionTable, TableError> {
    use Role::*;

    PermissionTable::builder()
        .route("/dashboard/admin", &[Admin])
        .route("/dashboard/teacher", &[Teacher])
        .route("/dashboard/accountant", &[Accountant])
        .route("/dashboard/student", &[Student])
        .route("/students", &[Admin, Teacher])
        .route("/staff", &[Admin])
        .route("/classes", &[Admin, Teacher])
        .route("/grades", &[Admin, Teacher, Student])
        .route("/fees", &[Admin, Accountant])
        .route("/library", &[Admin, Teacher, Student, Librarian])
        .route("/settings", &[Admin])
        .family_with_override(
            "/students/",
            &[Admin, Teacher],
            student_self_access("/students/"),
        )
        .family("/staff/", &[Admin])
        .family("/classes/", &[Admin, Teacher])
        .family("/fees/", &[Admin, Accountant])
        .family_with_override(
            "/fees/student/",
            &[Admin, Accountant],
            student_self_access("/fees/student/"),
        )
        .family("/library/", &[Admin, Teacher, Student, Librarian])
        .build()
}
