use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Fine-grained, independently toggleable capability.
///
/// Flags are granted per role in [`crate::Policy`] and can be forced on or off
/// per check with a [`FeatureOverride`] (kill switch, A/B rollout).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureFlag {
    CreateCourse,
    EditCourse,
    DeleteCourse,
    PublishCourse,
    CreateLesson,
    EditLesson,
    ViewCourses,
    EnrollCourse,
    TrackProgress,
    ManageUsers,
    ManageProducts,
    ManageOrders,
    ViewAnalytics,
    PurchaseProducts,
    ViewOrderHistory,
    WriteBlog,
}

/// Explicit per-check override. `Some(v)` short-circuits the table and yields `v`.
pub type FeatureOverride = Option<bool>;

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 16] = [
        FeatureFlag::CreateCourse,
        FeatureFlag::EditCourse,
        FeatureFlag::DeleteCourse,
        FeatureFlag::PublishCourse,
        FeatureFlag::CreateLesson,
        FeatureFlag::EditLesson,
        FeatureFlag::ViewCourses,
        FeatureFlag::EnrollCourse,
        FeatureFlag::TrackProgress,
        FeatureFlag::ManageUsers,
        FeatureFlag::ManageProducts,
        FeatureFlag::ManageOrders,
        FeatureFlag::ViewAnalytics,
        FeatureFlag::PurchaseProducts,
        FeatureFlag::ViewOrderHistory,
        FeatureFlag::WriteBlog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::CreateCourse => "CREATE_COURSE",
            FeatureFlag::EditCourse => "EDIT_COURSE",
            FeatureFlag::DeleteCourse => "DELETE_COURSE",
            FeatureFlag::PublishCourse => "PUBLISH_COURSE",
            FeatureFlag::CreateLesson => "CREATE_LESSON",
            FeatureFlag::EditLesson => "EDIT_LESSON",
            FeatureFlag::ViewCourses => "VIEW_COURSES",
            FeatureFlag::EnrollCourse => "ENROLL_COURSE",
            FeatureFlag::TrackProgress => "TRACK_PROGRESS",
            FeatureFlag::ManageUsers => "MANAGE_USERS",
            FeatureFlag::ManageProducts => "MANAGE_PRODUCTS",
            FeatureFlag::ManageOrders => "MANAGE_ORDERS",
            FeatureFlag::ViewAnalytics => "VIEW_ANALYTICS",
            FeatureFlag::PurchaseProducts => "PURCHASE_PRODUCTS",
            FeatureFlag::ViewOrderHistory => "VIEW_ORDER_HISTORY",
            FeatureFlag::WriteBlog => "WRITE_BLOG",
        }
    }

    pub fn parse(value: &str) -> Option<FeatureFlag> {
        FeatureFlag::ALL.into_iter().find(|f| f.as_str() == value)
    }

    pub fn category(&self) -> &'static str {
        match self {
            FeatureFlag::CreateCourse
            | FeatureFlag::EditCourse
            | FeatureFlag::DeleteCourse
            | FeatureFlag::PublishCourse
            | FeatureFlag::CreateLesson
            | FeatureFlag::EditLesson
            | FeatureFlag::WriteBlog => "content",
            FeatureFlag::ViewCourses | FeatureFlag::EnrollCourse | FeatureFlag::TrackProgress => {
                "learning"
            }
            FeatureFlag::ManageUsers | FeatureFlag::ViewAnalytics => "administration",
            FeatureFlag::ManageProducts
            | FeatureFlag::ManageOrders
            | FeatureFlag::PurchaseProducts
            | FeatureFlag::ViewOrderHistory => "shop",
        }
    }
}

impl core::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role × feature grid, for documentation and admin tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureMatrix(pub BTreeMap<Role, BTreeMap<FeatureFlag, bool>>);

impl FeatureMatrix {
    pub fn get(&self, role: Role, feature: FeatureFlag) -> bool {
        self.0
            .get(&role)
            .and_then(|row| row.get(&feature))
            .copied()
            .unwrap_or(false)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Role, &BTreeMap<FeatureFlag, bool>)> {
        self.0.iter()
    }
}
