//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Default role assigned to newly registered users
pub const ROLE_USER: &str = "user";

/// Administrator role, bypasses permission checks
pub const ROLE_ADMIN: &str = "admin";

/// Registrar role (course catalogue, enrollment, person records)
pub const ROLE_REGISTRAR: &str = "registrar";

/// Instructor role (grading)
pub const ROLE_INSTRUCTOR: &str = "instructor";

/// Roles created at start-up; these cannot be renamed or deleted
pub const SYSTEM_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_REGISTRAR, ROLE_INSTRUCTOR, ROLE_USER];

/// Check if a role name belongs to the built-in set
pub fn is_system_role(role: &str) -> bool {
    SYSTEM_ROLES.contains(&role)
}

// =============================================================================
// Permissions
// =============================================================================

/// Manage users, roles and permissions
pub const PERM_IDENTITY_MANAGE: &str = "identity.manage";

/// Manage the course catalogue and exams
pub const PERM_ACADEMIC_MANAGE: &str = "academic.manage";

/// Enroll students, manage waiting lists, file grade objections
pub const PERM_ENROLLMENTS_WRITE: &str = "enrollments.write";

/// Record grades and review grade objections
pub const PERM_GRADES_WRITE: &str = "grades.write";

/// Manage persons, students and staff
pub const PERM_PERSONS_MANAGE: &str = "persons.manage";

/// Read and write health records
pub const PERM_HEALTH_MANAGE: &str = "health.manage";

/// Default permissions with their descriptions
pub const DEFAULT_PERMISSIONS: &[(&str, &str)] = &[
    (PERM_IDENTITY_MANAGE, "Manage users, roles and permissions"),
    (PERM_ACADEMIC_MANAGE, "Manage courses and exams"),
    (PERM_ENROLLMENTS_WRITE, "Enroll students and manage waiting lists"),
    (PERM_GRADES_WRITE, "Record grades and review objections"),
    (PERM_PERSONS_MANAGE, "Manage persons, students and staff"),
    (PERM_HEALTH_MANAGE, "Access health records"),
];

/// Permissions granted to each non-admin system role
pub const DEFAULT_ROLE_PERMISSIONS: &[(&str, &[&str])] = &[
    (
        ROLE_REGISTRAR,
        &[PERM_ACADEMIC_MANAGE, PERM_ENROLLMENTS_WRITE, PERM_PERSONS_MANAGE],
    ),
    (ROLE_INSTRUCTOR, &[PERM_GRADES_WRITE]),
    (ROLE_USER, &[]),
];

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: usize = 1;

/// Maximum name length
pub const MAX_NAME_LENGTH: usize = 100;

/// Username length bounds
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;

// =============================================================================
// Authentication
// =============================================================================

/// Default access token lifetime in minutes
pub const DEFAULT_JWT_EXPIRATION_MINUTES: i64 = 60;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per minute (for token expiration calculation)
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Refresh token length in random bytes before hex encoding
pub const REFRESH_TOKEN_BYTES: usize = 32;

// =============================================================================
// Lockout
// =============================================================================

/// Consecutive failed logins that lock an account
pub const MAX_FAILED_LOGIN_ATTEMPTS: i32 = 5;

/// Lockout duration in minutes
pub const LOCKOUT_DURATION_MINUTES: i64 = 15;

// =============================================================================
// Two-Factor Authentication
// =============================================================================

/// TOTP secret length in bytes
pub const TOTP_SECRET_BYTES: usize = 20;

/// TOTP time step in seconds
pub const TOTP_STEP_SECONDS: i64 = 30;

/// TOTP code length
pub const TOTP_DIGITS: u32 = 6;

/// Accepted clock drift in steps on either side
pub const TOTP_SKEW_STEPS: i64 = 1;

/// Issuer shown by authenticator apps
pub const TOTP_ISSUER: &str = "University";

/// Number of backup codes generated at setup
pub const BACKUP_CODE_COUNT: usize = 10;

/// Length of each backup code
pub const BACKUP_CODE_LENGTH: usize = 10;

// =============================================================================
// Academic
// =============================================================================

/// Credit range for a course
pub const MIN_COURSE_CREDITS: i32 = 1;
pub const MAX_COURSE_CREDITS: i32 = 30;

/// Score range for grades
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Total exam weight allowed per course (percent)
pub const MAX_TOTAL_EXAM_WEIGHT: i32 = 100;

/// Exam duration range in minutes
pub const MIN_EXAM_DURATION_MINUTES: i32 = 1;
pub const MAX_EXAM_DURATION_MINUTES: i32 = 600;

/// Days after grading during which an objection may be filed
pub const GRADE_OBJECTION_WINDOW_DAYS: i64 = 14;

// =============================================================================
// Pagination
// =============================================================================

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum page size for list endpoints
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_roles() {
        assert!(is_system_role("admin"));
        assert!(is_system_role("user"));
        assert!(!is_system_role("librarian"));
    }

    #[test]
    fn test_role_permissions_reference_known_permissions() {
        for (_, permissions) in DEFAULT_ROLE_PERMISSIONS {
            for permission in *permissions {
                assert!(DEFAULT_PERMISSIONS.iter().any(|(name, _)| name == permission));
            }
        }
    }
}
