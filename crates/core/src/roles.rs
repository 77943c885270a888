//! Well-known role name constants.
//!
//! The same vocabulary is used for a user's global role and for their role
//! within a project (`project_members.role`).

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_MEMBER: &str = "member";
pub const ROLE_VIEWER: &str = "viewer";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_MEMBER, ROLE_VIEWER];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

/// Roles allowed to manage a project (update it, add members, create milestones).
pub fn can_manage_project(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MANAGER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_roles_accepted() {
        for role in VALID_ROLES {
            assert!(validate_role(role).is_ok());
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = validate_role("superuser");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid role"));
    }

    #[test]
    fn test_manage_project_requires_admin_or_manager() {
        assert!(can_manage_project(ROLE_ADMIN));
        assert!(can_manage_project(ROLE_MANAGER));
        assert!(!can_manage_project(ROLE_MEMBER));
        assert!(!can_manage_project(ROLE_VIEWER));
    }
}
