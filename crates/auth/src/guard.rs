//! Binds the policy tables to a live session in three calling conventions:
//! page renders (redirect), API handlers (typed error) and boolean probes.
//!
//! All of them go through [`decide`]; the adapters here only translate the
//! decision and dispatch the audit entry for denials.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    decide, AccessDecision, AccessState, AllowedRoles, AuditDispatcher, AuthorizationError,
    DenialKind, FeatureFlag, FeatureOverride, Policy, Role, Session, SessionProvider, Subject,
};

/// Where page-render denials are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    pub login_path: String,
    /// Neutral page for sessions that exist but may not see the route.
    pub landing_path: String,
    /// Query parameter carrying the originally requested path to the login page.
    pub callback_param: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/".to_string(),
            callback_param: "callbackUrl".to_string(),
        }
    }
}

impl RedirectConfig {
    pub fn login_location(&self, requested_path: &str) -> String {
        format!(
            "{}?{}={}",
            self.login_path,
            self.callback_param,
            urlencoding::encode(requested_path)
        )
    }
}

/// Navigational outcome of a denied page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub kind: DenialKind,
}

#[derive(Debug, Clone)]
pub struct Guard {
    policy: Arc<Policy>,
    audit: AuditDispatcher,
    redirects: RedirectConfig,
}

impl Guard {
    pub fn new(policy: Arc<Policy>, audit: AuditDispatcher) -> Self {
        Self {
            policy,
            audit,
            redirects: RedirectConfig::default(),
        }
    }

    pub fn with_redirects(mut self, redirects: RedirectConfig) -> Self {
        self.redirects = redirects;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn audit(&self) -> &AuditDispatcher {
        &self.audit
    }

    pub fn redirects(&self) -> &RedirectConfig {
        &self.redirects
    }

    // ── decision + audit ────────────────────────────────────────────────────

    /// Decide for an already resolved session and audit a denial.
    ///
    /// An expired session counts as no session.
    pub fn evaluate(
        &self,
        session: Option<&Session>,
        route: &str,
        allowed: &AllowedRoles,
    ) -> AccessDecision {
        let session = session.filter(|s| !s.is_expired(Utc::now()));
        let subject = session.map_or(Subject::Anonymous, |s| Subject::Authenticated {
            user_id: s.user_id,
            role: s.role.as_deref(),
        });
        let decision = decide(subject, allowed);
        self.audit_denial(&decision, session.and_then(|s| s.role.as_deref()), route);
        decision
    }

    /// Dispatch the audit entry matching a denied decision. No-op when allowed.
    pub fn audit_denial(&self, decision: &AccessDecision, raw_role: Option<&str>, route: &str) {
        match decision.state {
            AccessState::Allowed { role } => {
                tracing::debug!(route = %route, role = %role, "access granted");
            }
            AccessState::SessionMissing => {
                tracing::debug!(route = %route, "access denied: no session");
                self.audit
                    .log_auth_failure(None, route, decision.reason.clone());
            }
            AccessState::RoleMissing | AccessState::RoleInsufficient { .. } => {
                tracing::debug!(
                    route = %route,
                    user_id = ?decision.user_id,
                    reason = %decision.reason,
                    "access denied"
                );
                self.audit.log_access_denied(
                    decision.user_id,
                    raw_role,
                    route,
                    decision.reason.clone(),
                );
            }
        }
    }

    /// Page-side view of a decision.
    ///
    /// No session goes to login (keeping `requested_path` for the return trip);
    /// a session without an acceptable role goes to the landing page.
    pub fn redirect_for(&self, decision: &AccessDecision, requested_path: &str) -> Option<Redirect> {
        match decision.state {
            AccessState::Allowed { .. } => None,
            AccessState::SessionMissing => Some(Redirect {
                location: self.redirects.login_location(requested_path),
                kind: DenialKind::SessionMissing,
            }),
            AccessState::RoleMissing => Some(Redirect {
                location: self.redirects.landing_path.clone(),
                kind: DenialKind::RoleMissing,
            }),
            AccessState::RoleInsufficient { .. } => Some(Redirect {
                location: self.redirects.landing_path.clone(),
                kind: DenialKind::RoleInsufficient,
            }),
        }
    }

    async fn live_session<P>(&self, provider: &P) -> Option<Session>
    where
        P: SessionProvider + ?Sized,
    {
        provider
            .get_session()
            .await
            .filter(|s| !s.is_expired(Utc::now()))
    }

    // ── page-render convention ──────────────────────────────────────────────

    /// Returns the session when allowed, otherwise where to send the browser.
    pub async fn require_server_role<P>(
        &self,
        provider: &P,
        path: &str,
        allowed: impl Into<AllowedRoles>,
    ) -> Result<Session, Redirect>
    where
        P: SessionProvider + ?Sized,
    {
        let allowed = allowed.into();
        let session = self.live_session(provider).await;
        let decision = self.evaluate(session.as_ref(), path, &allowed);

        match (self.redirect_for(&decision, path), session) {
            (None, Some(session)) => Ok(session),
            (Some(redirect), _) => Err(redirect),
            // Allowed always carries a session.
            (None, None) => Err(Redirect {
                location: self.redirects.login_location(path),
                kind: DenialKind::SessionMissing,
            }),
        }
    }

    pub async fn get_server_user_session<P>(&self, provider: &P) -> Option<Session>
    where
        P: SessionProvider + ?Sized,
    {
        self.live_session(provider).await
    }

    pub async fn get_server_user_role<P>(&self, provider: &P) -> Option<Role>
    where
        P: SessionProvider + ?Sized,
    {
        self.live_session(provider).await.and_then(|s| s.role())
    }

    /// Render-time probe. Does not audit: nothing was attempted.
    pub async fn has_server_role<P>(&self, provider: &P, allowed: impl Into<AllowedRoles>) -> bool
    where
        P: SessionProvider + ?Sized,
    {
        let allowed = allowed.into();
        self.get_server_user_role(provider)
            .await
            .is_some_and(|role| allowed.contains(role))
    }

    // ── API / action convention ─────────────────────────────────────────────

    /// Check an already resolved session.
    pub fn check_role(
        &self,
        session: Option<&Session>,
        path: &str,
        allowed: impl Into<AllowedRoles>,
    ) -> Result<Role, AuthorizationError> {
        let allowed = allowed.into();
        let decision = self.evaluate(session, path, &allowed);
        match decision.state {
            AccessState::Allowed { role } => Ok(role),
            _ => Err(decision
                .to_error()
                .unwrap_or_else(AuthorizationError::session_missing)),
        }
    }

    pub async fn require_role<P>(
        &self,
        provider: &P,
        path: &str,
        allowed: impl Into<AllowedRoles>,
    ) -> Result<Session, AuthorizationError>
    where
        P: SessionProvider + ?Sized,
    {
        let allowed = allowed.into();
        let session = self.live_session(provider).await;
        self.check_role(session.as_ref(), path, allowed)?;
        session.ok_or_else(AuthorizationError::session_missing)
    }

    /// Boolean form of [`Guard::require_role`] for graceful degradation.
    pub async fn has_role<P>(&self, provider: &P, path: &str, allowed: impl Into<AllowedRoles>) -> bool
    where
        P: SessionProvider + ?Sized,
    {
        self.require_role(provider, path, allowed).await.is_ok()
    }

    // ── feature flags ───────────────────────────────────────────────────────

    pub fn is_feature_enabled(
        &self,
        role: Role,
        feature: FeatureFlag,
        override_value: FeatureOverride,
    ) -> bool {
        self.policy.is_feature_enabled(role, feature, override_value)
    }

    pub fn require_feature(
        &self,
        session: &Session,
        feature: FeatureFlag,
        path: &str,
    ) -> Result<(), AuthorizationError> {
        self.require_feature_with_override(session, feature, path, None)
    }

    /// Fails with a 403 naming the feature and role; the audit entry is
    /// dispatched without waiting for it.
    pub fn require_feature_with_override(
        &self,
        session: &Session,
        feature: FeatureFlag,
        path: &str,
        override_value: FeatureOverride,
    ) -> Result<(), AuthorizationError> {
        if session.is_expired(Utc::now()) {
            self.audit
                .log_auth_failure(Some(session.user_id), path, "session expired");
            return Err(AuthorizationError::session_missing());
        }

        let role = session.role();
        let granted = role.is_some_and(|r| self.policy.has_feature_access(r, feature, override_value));
        if granted {
            return Ok(());
        }

        let err = AuthorizationError::feature_disabled(role, feature);
        self.audit
            .log_feature_denied(Some(session.user_id), role, path, feature, err.message.clone());
        Err(err)
    }
}
