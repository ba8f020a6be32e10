//! Roles and permissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::is_system_role;
use crate::error::{DomainError, DomainResult};
use crate::validation::{optional_text, PERMISSION_NAME_REGEX, ROLE_NAME_REGEX};

/// Named set of permissions assignable to users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Built-in roles cannot be renamed or deleted
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(name: &str, description: Option<String>) -> DomainResult<Self> {
        let name = validate_role_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            is_system: is_system_role(&name),
            name,
            description: optional_text(description),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn update(&mut self, name: Option<&str>, description: Option<String>) -> DomainResult<()> {
        if let Some(name) = name {
            let name = validate_role_name(name)?;
            if self.is_system && name != self.name {
                return Err(DomainError::invalid_state("System roles cannot be renamed"));
            }
            self.name = name;
        }
        if description.is_some() {
            self.description = optional_text(description);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn soft_delete(&mut self) -> DomainResult<()> {
        if self.is_system {
            return Err(DomainError::invalid_state("System roles cannot be deleted"));
        }
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

fn validate_role_name(name: &str) -> DomainResult<String> {
    let name = name.trim().to_lowercase();
    if !ROLE_NAME_REGEX.is_match(&name) {
        return Err(DomainError::validation(
            "Role name must be 2-50 characters of a-z, 0-9, '_' or '-'",
        ));
    }
    Ok(name)
}

/// Permission in `resource.action` form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    pub fn new(name: &str, description: Option<String>) -> DomainResult<Self> {
        let name = name.trim().to_lowercase();
        if !PERMISSION_NAME_REGEX.is_match(&name) {
            return Err(DomainError::validation(
                "Permission name must look like 'resource.action'",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: optional_text(description),
            created_at: Utc::now(),
        })
    }
}

/// Role with its granted permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
}

impl RoleResponse {
    pub fn new(role: Role, permissions: Vec<Permission>) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            is_system: role.is_system,
            permissions,
            created_at: role.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_is_normalized() {
        let role = Role::new(" Librarian ", None).unwrap();
        assert_eq!(role.name, "librarian");
        assert!(!role.is_system);
    }

    #[test]
    fn test_system_role_cannot_be_renamed_or_deleted() {
        let mut role = Role::new("admin", None).unwrap();
        assert!(role.is_system);
        assert!(matches!(
            role.update(Some("root"), None),
            Err(DomainError::InvalidState(_))
        ));
        assert!(role.soft_delete().is_err());
        assert!(role.update(None, Some("Administrators".to_string())).is_ok());
    }

    #[test]
    fn test_permission_requires_resource_action() {
        assert!(Permission::new("grades.write", None).is_ok());
        assert!(Permission::new("grades", None).is_err());
    }
}
