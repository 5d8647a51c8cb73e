//! The single four-state access decision shared by every entry point.
//!
//! Edge filter, page guards and API guards all reduce what they know about the
//! caller to a [`Subject`] and call [`decide`]; they only differ in how they
//! enforce the result.

use serde::Serialize;

use lumina_core::UserId;

use crate::{AllowedRoles, AuthorizationError, Role};

/// What an entry point learned about the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a> {
    /// No session (or an unusable one).
    Anonymous,
    /// A live session; `role` is the raw claim, if any.
    Authenticated {
        user_id: UserId,
        role: Option<&'a str>,
    },
}

impl Subject<'_> {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Subject::Anonymous => None,
            Subject::Authenticated { user_id, .. } => Some(*user_id),
        }
    }
}

/// Terminal state of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessState {
    Allowed { role: Role },
    SessionMissing,
    /// Session exists but carries no recognized role.
    RoleMissing,
    RoleInsufficient { actual: Role },
}

/// Result of one authorization check. Transient: consumed by the caller, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub state: AccessState,
    pub user_id: Option<UserId>,
    pub required: AllowedRoles,
    pub reason: String,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self.state, AccessState::Allowed { .. })
    }

    /// The caller's resolved role, if one was recognized.
    pub fn role(&self) -> Option<Role> {
        match self.state {
            AccessState::Allowed { role } => Some(role),
            AccessState::RoleInsufficient { actual } => Some(actual),
            AccessState::SessionMissing | AccessState::RoleMissing => None,
        }
    }

    /// API-side view of a denial: 401 without a session, 403 otherwise.
    ///
    /// `RoleMissing` is reported as forbidden, same as an insufficient role.
    pub fn to_error(&self) -> Option<AuthorizationError> {
        match self.state {
            AccessState::Allowed { .. } => None,
            AccessState::SessionMissing => Some(AuthorizationError::session_missing()),
            AccessState::RoleMissing => Some(AuthorizationError::role_missing(&self.required)),
            AccessState::RoleInsufficient { actual } => Some(
                AuthorizationError::role_insufficient(actual, &self.required),
            ),
        }
    }
}

/// Evaluate `subject` against `allowed`. Pure; no I/O.
pub fn decide(subject: Subject<'_>, allowed: &AllowedRoles) -> AccessDecision {
    let user_id = subject.user_id();
    let (state, reason) = match subject {
        Subject::Anonymous => (AccessState::SessionMissing, "no active session".to_string()),
        Subject::Authenticated { role: None, .. } => (
            AccessState::RoleMissing,
            "session has no role".to_string(),
        ),
        Subject::Authenticated {
            role: Some(raw), ..
        } => match Role::parse(raw) {
            None => (
                AccessState::RoleMissing,
                format!("session role '{raw}' is not recognized"),
            ),
            Some(role) if allowed.contains(role) => (
                AccessState::Allowed { role },
                format!("role {role} is allowed"),
            ),
            Some(role) => (
                AccessState::RoleInsufficient { actual: role },
                format!("role {role} is not in [{allowed}]"),
            ),
        },
    };

    AccessDecision {
        state,
        user_id,
        required: allowed.clone(),
        reason,
    }
}
