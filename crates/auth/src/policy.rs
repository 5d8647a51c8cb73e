//! Static role → permission and role → feature tables.
//!
//! A [`Policy`] is built once at startup and shared read-only (usually behind
//! an `Arc`). Lookups take no locks and do no I/O.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{FeatureFlag, FeatureMatrix, FeatureOverride, Permission, PolicyError, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    permissions: HashMap<Role, BTreeSet<Permission>>,
    features: HashMap<Role, BTreeSet<FeatureFlag>>,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// The platform's tables.
    pub fn standard() -> Self {
        use FeatureFlag as F;
        use Permission as P;

        Self {
            permissions: HashMap::from([
                (Role::Admin, Permission::ALL.into_iter().collect()),
                (
                    Role::Writer,
                    BTreeSet::from([
                        P::ManageCourses,
                        P::CreateContent,
                        P::EditContent,
                        P::PublishContent,
                        P::ViewCourses,
                        P::ViewAnalytics,
                    ]),
                ),
                (
                    Role::Learner,
                    BTreeSet::from([P::ViewCourses, P::EnrollCourses, P::ViewProgress]),
                ),
                (
                    Role::Customer,
                    BTreeSet::from([
                        P::ViewCourses,
                        P::PurchaseProducts,
                        P::ViewOrders,
                        P::ManageCart,
                    ]),
                ),
            ]),
            features: HashMap::from([
                (Role::Admin, FeatureFlag::ALL.into_iter().collect()),
                (
                    Role::Writer,
                    BTreeSet::from([
                        F::CreateCourse,
                        F::EditCourse,
                        F::PublishCourse,
                        F::CreateLesson,
                        F::EditLesson,
                        F::ViewCourses,
                        F::ViewAnalytics,
                        F::WriteBlog,
                    ]),
                ),
                (
                    Role::Learner,
                    BTreeSet::from([F::ViewCourses, F::EnrollCourse, F::TrackProgress]),
                ),
                (
                    Role::Customer,
                    BTreeSet::from([F::ViewCourses, F::PurchaseProducts, F::ViewOrderHistory]),
                ),
            ]),
        }
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.permissions
            .get(&role)
            .is_some_and(|perms| perms.contains(&permission))
    }

    /// Untyped variant for identifiers coming from tokens or query strings.
    pub fn check_permission(&self, role: &str, permission: &str) -> bool {
        match (Role::parse(role), Permission::parse(permission)) {
            (Some(role), Some(permission)) => self.has_permission(role, permission),
            _ => false,
        }
    }

    pub fn get_permissions(&self, role: Role) -> BTreeSet<Permission> {
        self.permissions.get(&role).cloned().unwrap_or_default()
    }

    /// Table lookup, unless `override_value` is set, in which case it is returned as is.
    pub fn has_feature_access(
        &self,
        role: Role,
        feature: FeatureFlag,
        override_value: FeatureOverride,
    ) -> bool {
        if let Some(forced) = override_value {
            return forced;
        }
        self.features
            .get(&role)
            .is_some_and(|flags| flags.contains(&feature))
    }

    pub fn is_feature_enabled(
        &self,
        role: Role,
        feature: FeatureFlag,
        override_value: FeatureOverride,
    ) -> bool {
        self.has_feature_access(role, feature, override_value)
    }

    pub fn check_feature(&self, role: &str, feature: &str) -> bool {
        match (Role::parse(role), FeatureFlag::parse(feature)) {
            (Some(role), Some(feature)) => self.has_feature_access(role, feature, None),
            _ => false,
        }
    }

    pub fn get_enabled_features(&self, role: Role) -> BTreeSet<FeatureFlag> {
        self.features.get(&role).cloned().unwrap_or_default()
    }

    pub fn get_all_features(&self) -> &'static [FeatureFlag] {
        &FeatureFlag::ALL
    }

    pub fn get_feature_matrix(&self) -> FeatureMatrix {
        let rows = Role::ALL
            .into_iter()
            .map(|role| {
                let row: BTreeMap<FeatureFlag, bool> = FeatureFlag::ALL
                    .into_iter()
                    .map(|f| (f, self.has_feature_access(role, f, None)))
                    .collect();
                (role, row)
            })
            .collect();
        FeatureMatrix(rows)
    }

    /// True if the role has at least one feature enabled.
    pub fn has_any_feature(&self, role: Role) -> bool {
        self.features.get(&role).is_some_and(|flags| !flags.is_empty())
    }

    pub fn has_all_features(&self, role: Role, features: &[FeatureFlag]) -> bool {
        features
            .iter()
            .all(|f| self.has_feature_access(role, *f, None))
    }

    pub fn has_any_of_features(&self, role: Role, features: &[FeatureFlag]) -> bool {
        features
            .iter()
            .any(|f| self.has_feature_access(role, *f, None))
    }

    /// Roles whose table grants `permission`.
    pub fn roles_with_permission(&self, permission: Permission) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|r| self.has_permission(*r, permission))
            .collect()
    }

    pub fn roles_with_feature(&self, feature: FeatureFlag) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|r| self.has_feature_access(*r, feature, None))
            .collect()
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for custom tables. `build` enforces that every role has an entry in
/// both tables (an empty set counts).
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    permissions: HashMap<Role, BTreeSet<Permission>>,
    features: HashMap<Role, BTreeSet<FeatureFlag>>,
}

impl PolicyBuilder {
    pub fn permissions(
        mut self,
        role: Role,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        self.permissions
            .entry(role)
            .or_default()
            .extend(permissions);
        self
    }

    pub fn features(mut self, role: Role, features: impl IntoIterator<Item = FeatureFlag>) -> Self {
        self.features.entry(role).or_default().extend(features);
        self
    }

    pub fn build(self) -> Result<Policy, PolicyError> {
        for role in Role::ALL {
            if !self.permissions.contains_key(&role) {
                return Err(PolicyError::MissingPermissionEntry(role));
            }
            if !self.features.contains_key(&role) {
                return Err(PolicyError::MissingFeatureEntry(role));
            }
        }
        Ok(Policy {
            permissions: self.permissions,
            features: self.features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_permission() -> impl Strategy<Value = Permission> {
        prop::sample::select(Permission::ALL.to_vec())
    }

    fn any_feature() -> impl Strategy<Value = FeatureFlag> {
        prop::sample::select(FeatureFlag::ALL.to_vec())
    }

    #[test]
    fn standard_tables_cover_every_role() {
        let policy = Policy::standard();
        for role in Role::ALL {
            assert!(policy.permissions.contains_key(&role));
            assert!(policy.features.contains_key(&role));
        }
    }

    #[test]
    fn admin_holds_everything() {
        let policy = Policy::standard();
        assert_eq!(policy.get_permissions(Role::Admin).len(), Permission::ALL.len());
        assert!(policy.has_all_features(Role::Admin, &FeatureFlag::ALL));
    }

    #[test]
    fn writer_can_create_courses_but_not_manage_users() {
        let policy = Policy::standard();
        assert!(policy.has_feature_access(Role::Writer, FeatureFlag::CreateCourse, None));
        assert!(!policy.has_feature_access(Role::Writer, FeatureFlag::ManageUsers, None));
        assert!(!policy.has_permission(Role::Writer, Permission::ManageUsers));
    }

    #[test]
    fn untyped_checks_reject_unknown_identifiers() {
        let policy = Policy::standard();
        assert!(policy.check_permission("ADMIN", "manage_users"));
        assert!(!policy.check_permission("ROOT", "manage_users"));
        assert!(!policy.check_permission("ADMIN", "launch_rockets"));
        assert!(!policy.check_permission("", ""));
        assert!(policy.check_feature("WRITER", "WRITE_BLOG"));
        assert!(!policy.check_feature("writer", "WRITE_BLOG"));
    }

    #[test]
    fn override_short_circuits_table() {
        let policy = Policy::standard();
        assert!(!policy.is_feature_enabled(Role::Admin, FeatureFlag::CreateCourse, Some(false)));
        assert!(policy.is_feature_enabled(Role::Customer, FeatureFlag::ManageUsers, Some(true)));
    }

    #[test]
    fn set_helpers() {
        let policy = Policy::standard();
        assert!(policy.has_any_feature(Role::Learner));
        assert!(policy.has_any_of_features(
            Role::Learner,
            &[FeatureFlag::ManageUsers, FeatureFlag::TrackProgress]
        ));
        assert!(!policy.has_all_features(
            Role::Learner,
            &[FeatureFlag::ManageUsers, FeatureFlag::TrackProgress]
        ));
        assert!(policy.has_all_features(Role::Learner, &[]));
        assert!(!policy.has_any_of_features(Role::Learner, &[]));
    }

    #[test]
    fn matrix_agrees_with_lookups() {
        let policy = Policy::standard();
        let matrix = policy.get_feature_matrix();
        assert_eq!(matrix.rows().count(), Role::ALL.len());
        for role in Role::ALL {
            for feature in FeatureFlag::ALL {
                assert_eq!(
                    matrix.get(role, feature),
                    policy.has_feature_access(role, feature, None)
                );
            }
        }
        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["WRITER"]["CREATE_COURSE"], true);
        assert_eq!(json["CUSTOMER"]["CREATE_COURSE"], false);
    }

    #[test]
    fn builder_requires_both_entries_per_role() {
        let err = Policy::builder()
            .permissions(Role::Admin, Permission::ALL)
            .features(Role::Admin, FeatureFlag::ALL)
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::MissingPermissionEntry(Role::Writer));

        let mut builder = Policy::builder();
        for role in Role::ALL {
            builder = builder.permissions(role, []);
        }
        let err = builder.build().unwrap_err();
        assert_eq!(err, PolicyError::MissingFeatureEntry(Role::Admin));
    }

    #[test]
    fn empty_sets_are_valid_entries() {
        let mut builder = Policy::builder();
        for role in Role::ALL {
            builder = builder.permissions(role, []).features(role, []);
        }
        let policy = builder.build().unwrap();
        assert!(policy.get_permissions(Role::Admin).is_empty());
        assert!(!policy.has_any_feature(Role::Admin));
    }

    proptest! {
        #[test]
        fn has_permission_matches_table_membership(role in any_role(), perm in any_permission()) {
            let policy = Policy::standard();
            prop_assert_eq!(
                policy.has_permission(role, perm),
                policy.get_permissions(role).contains(&perm)
            );
        }

        #[test]
        fn override_is_returned_verbatim(role in any_role(), feature in any_feature(), forced in any::<bool>()) {
            let policy = Policy::standard();
            prop_assert_eq!(policy.has_feature_access(role, feature, Some(forced)), forced);
        }

        #[test]
        fn untyped_lookups_never_panic(role in ".{0,12}", perm in ".{0,20}") {
            let policy = Policy::standard();
            let _ = policy.check_permission(&role, &perm);
            let _ = policy.check_feature(&role, &perm);
        }
    }
}
