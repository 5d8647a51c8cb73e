use serde::Serialize;
use thiserror::Error;

use crate::{AllowedRoles, FeatureFlag, Role};

pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;

/// Why an authorization check failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    SessionMissing,
    RoleMissing,
    RoleInsufficient,
    FeatureDisabled,
}

/// Failure raised by the API-side guards.
///
/// Transport-agnostic: `status_code` is the HTTP status the boundary should
/// answer with, `message` is safe to show to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthorizationError {
    pub status_code: u16,
    pub kind: DenialKind,
    pub message: String,
}

impl AuthorizationError {
    pub fn session_missing() -> Self {
        Self {
            status_code: STATUS_UNAUTHORIZED,
            kind: DenialKind::SessionMissing,
            message: "Unauthorized: authentication required".to_string(),
        }
    }

    pub fn role_missing(required: &AllowedRoles) -> Self {
        Self {
            status_code: STATUS_FORBIDDEN,
            kind: DenialKind::RoleMissing,
            message: format!("Forbidden: session has no role. Required one of: {required}"),
        }
    }

    pub fn role_insufficient(actual: Role, required: &AllowedRoles) -> Self {
        Self {
            status_code: STATUS_FORBIDDEN,
            kind: DenialKind::RoleInsufficient,
            message: format!("Forbidden: role {actual} is not allowed. Required one of: {required}"),
        }
    }

    pub fn feature_disabled(role: Option<Role>, feature: FeatureFlag) -> Self {
        let role = role.map_or("(none)", |r| r.as_str());
        Self {
            status_code: STATUS_FORBIDDEN,
            kind: DenialKind::FeatureDisabled,
            message: format!("Forbidden: feature {feature} is not enabled for role {role}"),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.status_code == STATUS_UNAUTHORIZED
    }
}

/// Invalid policy tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("role {0} has no permission entry")]
    MissingPermissionEntry(Role),

    #[error("role {0} has no feature entry")]
    MissingFeatureEntry(Role),
}
