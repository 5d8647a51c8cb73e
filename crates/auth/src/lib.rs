//! `lumina-auth`: role registry, permission/feature tables and the
//! authorization guards built on them.
//!
//! No HTTP or storage dependency. Sessions and the audit trail come in
//! through traits; status codes are plain numbers and redirects plain
//! locations.

pub mod audit;
pub mod claims;
pub mod decision;
pub mod error;
pub mod explain;
pub mod features;
pub mod guard;
pub mod permissions;
pub mod policy;
pub mod roles;
pub mod routes;
pub mod session;

pub use audit::{
    AuditDispatcher, AuditEntry, AuditError, AuditSink, InMemoryAuditSink, NoopAuditSink,
    TracingAuditSink,
};
pub use claims::{Hs256JwtValidator, JwtValidator, SessionClaims, TokenValidationError, validate_claims};
pub use decision::{AccessDecision, AccessState, Subject, decide};
pub use error::{AuthorizationError, DenialKind, PolicyError};
pub use explain::{AuthorizationExplanation, RbacRegistry, explain_feature, explain_permission};
pub use features::{FeatureFlag, FeatureMatrix, FeatureOverride};
pub use guard::{Guard, Redirect, RedirectConfig};
pub use permissions::Permission;
pub use policy::{Policy, PolicyBuilder};
pub use roles::{AllowedRoles, Role, UnknownRole, describe, is_valid_role};
pub use routes::{ROLE_REQUIREMENTS, RouteKind, required_roles};
pub use session::{InMemorySessionStore, Session, SessionProvider, SessionStore, SessionStoreError};
