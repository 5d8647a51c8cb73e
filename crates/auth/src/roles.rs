use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried by a session.
///
/// The set is closed: adding a role means adding a variant here and an entry in
/// both policy tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Writer,
    Learner,
    Customer,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

const UNKNOWN_ROLE_DESCRIPTION: &str = "Unknown role";

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Writer, Role::Learner, Role::Customer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Writer => "WRITER",
            Role::Learner => "LEARNER",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Parse the wire identifier. Matching is exact.
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == value)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Platform administrator with full access to users, content and the shop",
            Role::Writer => "Content author who creates and edits courses, lessons and blog posts",
            Role::Learner => "Enrolled student who follows courses and tracks progress",
            Role::Customer => "Shop customer who purchases products and reviews orders",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// True iff `value` names one of the roles.
pub fn is_valid_role(value: &str) -> bool {
    Role::parse(value).is_some()
}

/// Human-readable description for a role identifier.
///
/// Unknown input yields a generic description instead of an error.
pub fn describe(value: &str) -> &'static str {
    Role::parse(value).map_or(UNKNOWN_ROLE_DESCRIPTION, |r| r.description())
}

/// One role or a list of roles a route or action accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedRoles(Vec<Role>);

impl AllowedRoles {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut out: Vec<Role> = Vec::new();
        for role in roles {
            if !out.contains(&role) {
                out.push(role);
            }
        }
        Self(out)
    }

    pub fn any() -> Self {
        Self::new(Role::ALL)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for AllowedRoles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(role.as_str())?;
        }
        Ok(())
    }
}

impl From<Role> for AllowedRoles {
    fn from(role: Role) -> Self {
        Self(vec![role])
    }
}

impl<const N: usize> From<[Role; N]> for AllowedRoles {
    fn from(roles: [Role; N]) -> Self {
        Self::new(roles)
    }
}

impl From<&[Role]> for AllowedRoles {
    fn from(roles: &[Role]) -> Self {
        Self::new(roles.iter().copied())
    }
}

impl From<Vec<Role>> for AllowedRoles {
    fn from(roles: Vec<Role>) -> Self {
        Self::new(roles)
    }
}

impl From<&AllowedRoles> for AllowedRoles {
    fn from(roles: &AllowedRoles) -> Self {
        roles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_roles_are_recognized() {
        for role in Role::ALL {
            assert!(is_valid_role(role.as_str()));
        }
        assert!(!is_valid_role("admin"));
        assert!(!is_valid_role(""));
        assert!(!is_valid_role("SUPERUSER"));
    }

    #[test]
    fn describe_fails_closed() {
        assert_eq!(describe("nope"), "Unknown role");
        assert_eq!(describe("WRITER"), Role::Writer.description());
    }

    #[test]
    fn serde_uses_wire_identifiers() {
        let json = serde_json::to_string(&Role::Learner).unwrap();
        assert_eq!(json, "\"LEARNER\"");
        let back: Role = serde_json::from_str("\"CUSTOMER\"").unwrap();
        assert_eq!(back, Role::Customer);
    }

    #[test]
    fn allowed_roles_dedupes_and_displays() {
        let allowed = AllowedRoles::from([Role::Admin, Role::Writer, Role::Admin]);
        assert_eq!(allowed.as_slice(), &[Role::Admin, Role::Writer]);
        assert_eq!(allowed.to_string(), "ADMIN, WRITER");
        assert!(allowed.contains(Role::Writer));
        assert!(!allowed.contains(Role::Customer));
    }

    #[test]
    fn from_str_reports_input() {
        let err = "root".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role 'root'");
    }
}
