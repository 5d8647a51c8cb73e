//! Path-prefix → allowed roles, consulted by the edge filter before any
//! handler runs.

use crate::{AllowedRoles, Role};

use crate::Role::{Admin, Customer, Learner, Writer};

/// Literal path prefixes and the roles allowed under them.
///
/// A prefix matches the path itself and anything below it on a `/` boundary
/// (`/api/admin` matches `/api/admin/rbac` but not `/api/administrators`).
/// The longest matching prefix wins.
pub const ROLE_REQUIREMENTS: &[(&str, &[Role])] = &[
    ("/dashboard/admin", &[Admin]),
    ("/dashboard/writer", &[Admin, Writer]),
    ("/dashboard/learner", &[Admin, Learner]),
    ("/dashboard/customer", &[Admin, Customer]),
    ("/api/admin", &[Admin]),
    ("/api/writer", &[Admin, Writer]),
    ("/api/learner", &[Admin, Learner]),
    ("/api/customer", &[Admin, Customer]),
    ("/api/me", &[Admin, Writer, Learner, Customer]),
];

/// Which convention a denied request is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Redirects (login / landing page).
    Page,
    /// Structured 401/403 errors.
    Api,
}

impl RouteKind {
    pub fn of(path: &str) -> Self {
        if prefix_matches("/api", path) {
            RouteKind::Api
        } else {
            RouteKind::Page
        }
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

/// Roles required for `path`, or `None` when the path is not restricted.
pub fn required_roles(path: &str) -> Option<AllowedRoles> {
    required_roles_in(ROLE_REQUIREMENTS, path)
}

pub fn required_roles_in(table: &[(&str, &[Role])], path: &str) -> Option<AllowedRoles> {
    table
        .iter()
        .filter(|(prefix, _)| prefix_matches(prefix, path))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, roles)| AllowedRoles::from(*roles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_nested_paths_match() {
        assert_eq!(required_roles("/dashboard/admin"), Some(Admin.into()));
        assert_eq!(required_roles("/dashboard/admin/users/42"), Some(Admin.into()));
        assert_eq!(
            required_roles("/api/writer/courses/drafts"),
            Some([Admin, Writer].into())
        );
    }

    #[test]
    fn sibling_prefixes_do_not_match() {
        assert_eq!(required_roles("/dashboard/administrator"), None);
        assert_eq!(required_roles("/api/melody"), None);
    }

    #[test]
    fn unrestricted_paths_pass() {
        assert_eq!(required_roles("/"), None);
        assert_eq!(required_roles("/courses/rust-101"), None);
        assert_eq!(required_roles("/health"), None);
    }

    #[test]
    fn longest_prefix_wins() {
        let table: &[(&str, &[Role])] = &[("/api", &[Customer]), ("/api/admin", &[Admin])];
        assert_eq!(required_roles_in(table, "/api/admin/x"), Some(Admin.into()));
        assert_eq!(required_roles_in(table, "/api/shop"), Some(Customer.into()));
    }

    #[test]
    fn every_entry_names_at_least_one_role() {
        for (prefix, roles) in ROLE_REQUIREMENTS {
            assert!(prefix.starts_with('/'));
            assert!(!roles.is_empty(), "{prefix} has no roles");
        }
    }

    #[test]
    fn route_kind_by_prefix() {
        assert_eq!(RouteKind::of("/api/admin"), RouteKind::Api);
        assert_eq!(RouteKind::of("/api"), RouteKind::Api);
        assert_eq!(RouteKind::of("/apiary"), RouteKind::Page);
        assert_eq!(RouteKind::of("/dashboard/admin"), RouteKind::Page);
    }
}
