//! Team roles and permission levels.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of a user, scoped to their (single) team.
///
/// `Guest` is only ever a user-level role: it is what `User.role` holds while
/// the user belongs to no team. Memberships never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
            Role::Guest => "guest",
        }
    }

    /// Whether a team membership may hold this role.
    pub fn is_member_role(&self) -> bool {
        !matches!(self, Role::Guest)
    }

    /// Whether the invitation path may grant this role.
    pub fn is_invitable(&self) -> bool {
        matches!(self, Role::Admin | Role::Editor | Role::Viewer)
    }

    /// Permission level a member with this role holds in their team.
    pub fn permission(&self) -> TeamPermission {
        match self {
            Role::Owner => TeamPermission::Owner,
            Role::Admin => TeamPermission::Admin,
            Role::Editor => TeamPermission::Editor,
            Role::Viewer => TeamPermission::Viewer,
            Role::Guest => TeamPermission::None,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            "guest" => Ok(Role::Guest),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered permission level of an actor within one team.
///
/// Variant order is significant: `None < Viewer < Editor < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPermission {
    None,
    Viewer,
    Editor,
    Admin,
    Owner,
}

impl TeamPermission {
    /// Check if this permission is at least the required level.
    pub fn allows(&self, required: TeamPermission) -> bool {
        *self >= required
    }
}

impl std::fmt::Display for TeamPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TeamPermission::None => "none",
            TeamPermission::Viewer => "viewer",
            TeamPermission::Editor => "editor",
            TeamPermission::Admin => "admin",
            TeamPermission::Owner => "owner",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"editor\"");
        let role: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, Role::Viewer);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("OWNER").unwrap(), Role::Owner);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_invitable_roles() {
        assert!(Role::Admin.is_invitable());
        assert!(Role::Editor.is_invitable());
        assert!(Role::Viewer.is_invitable());
        assert!(!Role::Owner.is_invitable());
        assert!(!Role::Guest.is_invitable());
    }

    #[test]
    fn test_member_roles() {
        assert!(Role::Owner.is_member_role());
        assert!(!Role::Guest.is_member_role());
    }

    #[test]
    fn test_permission_ordering() {
        assert!(TeamPermission::Owner.allows(TeamPermission::Admin));
        assert!(TeamPermission::Admin.allows(TeamPermission::Admin));
        assert!(TeamPermission::Editor.allows(TeamPermission::Viewer));
        assert!(!TeamPermission::Viewer.allows(TeamPermission::Editor));
        assert!(!TeamPermission::None.allows(TeamPermission::Viewer));
    }

    #[test]
    fn test_role_permission_mapping() {
        assert_eq!(Role::Owner.permission(), TeamPermission::Owner);
        assert_eq!(Role::Viewer.permission(), TeamPermission::Viewer);
        assert_eq!(Role::Guest.permission(), TeamPermission::None);
    }
}
