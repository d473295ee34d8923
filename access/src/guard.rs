//! Route guard: the per-navigation authorization state machine

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::context::Context;
use crate::permissions::Access;
use crate::session::{SessionEvaluator, SessionState};
use crate::storage::StorageArea;

/// Render directive handed to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Send the caller to the login entry point
    ToLogin,
    /// Render the generic not-found view
    ///
    /// Deliberately the same view a missing page gets, so a denied caller
    /// cannot tell a restricted route from a nonexistent one.
    NotFound,
    /// Render the protected content
    Render,
}

/// Guard state, re-entered on every path change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Evaluation for the current path has not settled yet
    Loading,
    /// No usable session (absent or expired)
    Unauthenticated,
    /// Valid session, role not allowed on this path
    Unauthorized,
    /// Valid session, access granted
    Authorized,
}

impl GuardState {
    /// Render directive of a settled state
    pub fn directive(self) -> Option<Directive> {
        match self {
            GuardState::Loading => None,
            GuardState::Unauthenticated => Some(Directive::ToLogin),
            GuardState::Unauthorized => Some(Directive::NotFound),
            GuardState::Authorized => Some(Directive::Render),
        }
    }
}

/// Per-navigation authorization decision point
///
/// The guard caches nothing across navigations: every [`navigate`] starts
/// from `Loading`, re-runs the session evaluation (idle time may have
/// crossed the expiry boundary) and then the permission resolution for the
/// new path. Evaluation is synchronous, so a later `navigate` fully
/// supersedes an earlier one and the guard can never be observed `Loading`
/// for a stale path.
///
/// The guard is total: session and permission failures are render
/// directives, never errors.
///
/// [`navigate`]: RouteGuard::navigate
pub struct RouteGuard<D, E> {
    ctx: Context<D, E>,
    path: Option<String>,
    state: GuardState,
}

impl<D: StorageArea, E: StorageArea> RouteGuard<D, E> {
    pub(crate) fn new(ctx: Context<D, E>) -> Self {
        Self {
            ctx,
            path: None,
            state: GuardState::Loading,
        }
    }

    /// Current state
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Path of the last navigation, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Runs a fresh evaluation for `path` against the wall clock
    pub fn navigate(&mut self, path: &str) -> Directive {
        self.navigate_at(path, Utc::now())
    }

    /// Runs a fresh evaluation for `path` at an explicit instant
    pub fn navigate_at(&mut self, path: &str, now: DateTime<Utc>) -> Directive {
        self.path = Some(path.to_owned());
        self.state = GuardState::Loading;

        let evaluator = SessionEvaluator::new(self.ctx.store());
        self.state = match evaluator.evaluate_at(now) {
            SessionState::Unauthenticated | SessionState::Expired => GuardState::Unauthenticated,
            SessionState::Valid(session) => {
                match self.ctx.table().resolve(path, &session) {
                    Access::Granted => GuardState::Authorized,
                    Access::Denied => GuardState::Unauthorized,
                }
            }
        };

        debug!(path, state = ?self.state, "Navigation settled");

        // Every state set above is terminal, so a directive always exists
        self.state.directive().unwrap_or(Directive::ToLogin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::credentials::PersistenceMode;
    use crate::roles::Role;
    use crate::tests::{at, session, student_session};

    #[test]
    fn starts_loading_without_a_path() {
        let guard = Context::in_memory().unwrap().guard();
        assert_eq!(guard.state(), GuardState::Loading);
        assert_eq!(guard.path(), None);
        assert_eq!(guard.state().directive(), None);
    }

    #[test]
    fn no_session_goes_to_login() {
        let ctx = Context::in_memory().unwrap();
        let mut guard = ctx.guard();

        assert_eq!(guard.navigate_at("/students", at(0)), Directive::ToLogin);
        assert_eq!(guard.state(), GuardState::Unauthenticated);
        assert_eq!(guard.path(), Some("/students"));
    }

    #[test]
    fn expired_session_goes_to_login_and_purges() {
        let ctx = Context::in_memory().unwrap();
        let session = session(Role::Admin);
        ctx.store().write(&session, PersistenceMode::Durable);

        let mut guard = ctx.guard();
        let past_expiry = session.expires_at + chrono::Duration::seconds(1);
        assert_eq!(
            guard.navigate_at("/students", past_expiry),
            Directive::ToLogin
        );
        assert_eq!(ctx.store().read(), None);
    }

    #[test]
    fn denied_role_sees_not_found() {
        let ctx = Context::in_memory().unwrap();
        ctx.store()
            .write(&session(Role::Librarian), PersistenceMode::Ephemeral);

        let mut guard = ctx.guard();
        assert_eq!(guard.navigate_at("/fees", at(0)), Directive::NotFound);
        assert_eq!(guard.state(), GuardState::Unauthorized);
    }

    #[test]
    fn granted_role_renders() {
        let ctx = Context::in_memory().unwrap();
        ctx.store()
            .write(&session(Role::Accountant), PersistenceMode::Ephemeral);

        let mut guard = ctx.guard();
        assert_eq!(guard.navigate_at("/fees", at(0)), Directive::Render);
        assert_eq!(guard.state(), GuardState::Authorized);
    }

    #[test]
    fn each_navigation_is_evaluated_afresh() {
        let ctx = Context::in_memory().unwrap();
        ctx.store()
            .write(&student_session(77), PersistenceMode::Ephemeral);

        let mut guard = ctx.guard();
        assert_eq!(
            guard.navigate_at("/dashboard/student", at(0)),
            Directive::Render
        );

        // Same guard, new path, different decision
        assert_eq!(guard.navigate_at("/settings", at(0)), Directive::NotFound);
        assert_eq!(guard.path(), Some("/settings"));

        // And back again
        assert_eq!(guard.navigate_at("/grades", at(0)), Directive::Render);
    }

    #[test]
    fn expiry_crossed_while_idle_is_caught_on_next_navigation() {
        let ctx = Context::in_memory().unwrap();
        let session = session(Role::Teacher);
        ctx.store().write(&session, PersistenceMode::Ephemeral);

        let mut guard = ctx.guard();
        assert_eq!(guard.navigate_at("/classes", at(0)), Directive::Render);

        // The user sat on the page past the expiry; the next path change
        // re-evaluates the session rather than trusting the old decision
        let later = session.expires_at + chrono::Duration::minutes(5);
        assert_eq!(guard.navigate_at("/classes/9", later), Directive::ToLogin);
    }
}
