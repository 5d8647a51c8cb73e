use serde::{Deserialize, Serialize};

/// Coarse capability tag.
///
/// Permissions are never persisted: a role's set is always recomputed from the
/// static table in [`crate::Policy`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    ManageCourses,
    ManageProducts,
    ManageOrders,
    ViewAnalytics,
    CreateContent,
    EditContent,
    PublishContent,
    ViewCourses,
    EnrollCourses,
    ViewProgress,
    PurchaseProducts,
    ViewOrders,
    ManageCart,
}

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::ManageUsers,
        Permission::ManageCourses,
        Permission::ManageProducts,
        Permission::ManageOrders,
        Permission::ViewAnalytics,
        Permission::CreateContent,
        Permission::EditContent,
        Permission::PublishContent,
        Permission::ViewCourses,
        Permission::EnrollCourses,
        Permission::ViewProgress,
        Permission::PurchaseProducts,
        Permission::ViewOrders,
        Permission::ManageCart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ManageCourses => "manage_courses",
            Permission::ManageProducts => "manage_products",
            Permission::ManageOrders => "manage_orders",
            Permission::ViewAnalytics => "view_analytics",
            Permission::CreateContent => "create_content",
            Permission::EditContent => "edit_content",
            Permission::PublishContent => "publish_content",
            Permission::ViewCourses => "view_courses",
            Permission::EnrollCourses => "enroll_courses",
            Permission::ViewProgress => "view_progress",
            Permission::PurchaseProducts => "purchase_products",
            Permission::ViewOrders => "view_orders",
            Permission::ManageCart => "manage_cart",
        }
    }

    pub fn parse(value: &str) -> Option<Permission> {
        Permission::ALL.into_iter().find(|p| p.as_str() == value)
    }

    /// Area of the platform the permission belongs to (for admin tooling).
    pub fn category(&self) -> &'static str {
        match self {
            Permission::ManageUsers | Permission::ViewAnalytics => "administration",
            Permission::ManageCourses
            | Permission::CreateContent
            | Permission::EditContent
            | Permission::PublishContent => "content",
            Permission::ViewCourses | Permission::EnrollCourses | Permission::ViewProgress => {
                "learning"
            }
            Permission::ManageProducts
            | Permission::ManageOrders
            | Permission::PurchaseProducts
            | Permission::ViewOrders
            | Permission::ManageCart => "shop",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn tags_are_unique() {
        let tags: HashSet<&str> = Permission::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(tags.len(), Permission::ALL.len());
    }

    #[test]
    fn parse_matches_serde_names() {
        for perm in Permission::ALL {
            let json = serde_json::to_string(&perm).unwrap();
            assert_eq!(json, format!("\"{}\"", perm.as_str()));
            assert_eq!(Permission::parse(perm.as_str()), Some(perm));
        }
        assert_eq!(Permission::parse("MANAGE_USERS"), None);
    }
}
