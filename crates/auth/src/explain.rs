//! Explanations of permission/feature checks and a registry of the tables,
//! for admin tooling.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{FeatureFlag, FeatureOverride, Permission, Policy, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a permission or feature check.
///
/// Answers "why was this allowed/denied?" for admin tooling; it never feeds
/// back into the decision itself.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission or feature tag that was checked.
    pub required: String,

    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    pub role: Role,

    /// Everything the role holds in the table that was consulted (sorted).
    pub effective: Vec<String>,

    /// If denied, what was missing and how to fix it.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: ExplainedDenial,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainedDenial {
    MissingPermission,
    MissingFeature,
    /// Forced off by an explicit override.
    OverriddenOff,
}

fn granting_roles_suggestion(kind: &str, tag: &str, roles: &[Role]) -> Vec<String> {
    let mut suggestions = Vec::new();
    if roles.is_empty() {
        suggestions.push(format!("No role is granted the '{tag}' {kind}; update the policy tables"));
    } else {
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        suggestions.push(format!(
            "Sign in with a role that holds the '{tag}' {kind}: {}",
            names.join(", ")
        ));
    }
    suggestions
}

/// Explain a permission check for `role`.
pub fn explain_permission(
    policy: &Policy,
    role: Role,
    permission: Permission,
) -> AuthorizationExplanation {
    let effective: Vec<String> = policy
        .get_permissions(role)
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();

    if policy.has_permission(role, permission) {
        return AuthorizationExplanation {
            required: permission.as_str().to_string(),
            granted: true,
            reason: format!("Role {role} holds permission '{permission}'"),
            role,
            effective,
            denial_reason: None,
        };
    }

    AuthorizationExplanation {
        required: permission.as_str().to_string(),
        granted: false,
        reason: format!(
            "Role {role} does not hold permission '{permission}'. Current permissions: {effective:?}"
        ),
        role,
        effective,
        denial_reason: Some(DenialReason {
            kind: ExplainedDenial::MissingPermission,
            message: format!("Missing required permission: '{permission}'"),
            suggestions: granting_roles_suggestion(
                "permission",
                permission.as_str(),
                &policy.roles_with_permission(permission),
            ),
        }),
    }
}

/// Explain a feature check for `role`, honoring an explicit override.
pub fn explain_feature(
    policy: &Policy,
    role: Role,
    feature: FeatureFlag,
    override_value: FeatureOverride,
) -> AuthorizationExplanation {
    let effective: Vec<String> = policy
        .get_enabled_features(role)
        .iter()
        .map(|f| f.as_str().to_string())
        .collect();

    match override_value {
        Some(true) => AuthorizationExplanation {
            required: feature.as_str().to_string(),
            granted: true,
            reason: format!("Feature {feature} forced on by override"),
            role,
            effective,
            denial_reason: None,
        },
        Some(false) => AuthorizationExplanation {
            required: feature.as_str().to_string(),
            granted: false,
            reason: format!("Feature {feature} forced off by override"),
            role,
            effective,
            denial_reason: Some(DenialReason {
                kind: ExplainedDenial::OverriddenOff,
                message: format!("Feature {feature} is switched off"),
                suggestions: vec!["Remove the override to fall back to the role table".to_string()],
            }),
        },
        None if policy.has_feature_access(role, feature, None) => AuthorizationExplanation {
            required: feature.as_str().to_string(),
            granted: true,
            reason: format!("Role {role} has feature {feature} enabled"),
            role,
            effective,
            denial_reason: None,
        },
        None => AuthorizationExplanation {
            required: feature.as_str().to_string(),
            granted: false,
            reason: format!("Role {role} does not have feature {feature}"),
            role,
            effective,
            denial_reason: Some(DenialReason {
                kind: ExplainedDenial::MissingFeature,
                message: format!("Missing required feature: {feature}"),
                suggestions: granting_roles_suggestion(
                    "feature",
                    feature.as_str(),
                    &policy.roles_with_feature(feature),
                ),
            }),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Role definition with its grants (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub description: &'static str,
    pub permissions: Vec<Permission>,
    pub features: Vec<FeatureFlag>,
}

/// Permission or feature definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityDefinition {
    pub name: &'static str,
    pub category: &'static str,
    pub granted_to: Vec<Role>,
}

/// Complete view of the tables for admin tooling.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: BTreeMap<Role, RoleDefinition>,
    pub permissions: BTreeMap<&'static str, CapabilityDefinition>,
    pub features: BTreeMap<&'static str, CapabilityDefinition>,
}

impl RbacRegistry {
    pub fn from_policy(policy: &Policy) -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| {
                (
                    role,
                    RoleDefinition {
                        name: role,
                        description: role.description(),
                        permissions: policy.get_permissions(role).into_iter().collect(),
                        features: policy.get_enabled_features(role).into_iter().collect(),
                    },
                )
            })
            .collect();

        let permissions = Permission::ALL
            .into_iter()
            .map(|p| {
                (
                    p.as_str(),
                    CapabilityDefinition {
                        name: p.as_str(),
                        category: p.category(),
                        granted_to: policy.roles_with_permission(p),
                    },
                )
            })
            .collect();

        let features = FeatureFlag::ALL
            .into_iter()
            .map(|f| {
                (
                    f.as_str(),
                    CapabilityDefinition {
                        name: f.as_str(),
                        category: f.category(),
                        granted_to: policy.roles_with_feature(f),
                    },
                )
            })
            .collect();

        Self {
            roles,
            permissions,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_permission_has_no_denial() {
        let policy = Policy::standard();
        let e = explain_permission(&policy, Role::Writer, Permission::PublishContent);
        assert!(e.granted);
        assert!(e.denial_reason.is_none());
        assert!(e.effective.contains(&"publish_content".to_string()));
    }

    #[test]
    fn denied_permission_suggests_granting_roles() {
        let policy = Policy::standard();
        let e = explain_permission(&policy, Role::Learner, Permission::ManageUsers);
        assert!(!e.granted);
        let denial = e.denial_reason.unwrap();
        assert_eq!(denial.kind, ExplainedDenial::MissingPermission);
        assert!(denial.suggestions[0].contains("ADMIN"));
        assert!(!denial.suggestions[0].contains("LEARNER"));
    }

    #[test]
    fn feature_overrides_are_explained() {
        let policy = Policy::standard();
        let off = explain_feature(&policy, Role::Admin, FeatureFlag::ManageUsers, Some(false));
        assert!(!off.granted);
        assert_eq!(off.denial_reason.unwrap().kind, ExplainedDenial::OverriddenOff);

        let on = explain_feature(&policy, Role::Customer, FeatureFlag::ManageUsers, Some(true));
        assert!(on.granted);

        let missing = explain_feature(&policy, Role::Customer, FeatureFlag::WriteBlog, None);
        assert_eq!(missing.denial_reason.unwrap().kind, ExplainedDenial::MissingFeature);
    }

    #[test]
    fn registry_lists_everything() {
        let registry = RbacRegistry::from_policy(&Policy::standard());
        assert_eq!(registry.roles.len(), Role::ALL.len());
        assert_eq!(registry.permissions.len(), Permission::ALL.len());
        assert_eq!(registry.features.len(), FeatureFlag::ALL.len());
        assert_eq!(registry.features["WRITE_BLOG"].granted_to, vec![Role::Admin, Role::Writer]);
        assert_eq!(registry.permissions["manage_cart"].category, "shop");
    }
}
