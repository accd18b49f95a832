//! Permission gates for route handlers
//!
//! The authorization middleware admits requests by role group; handlers that
//! need a specific `<action>:<resource>` grant call these gates. Every check
//! lands in the audit log, allowed or not.

use crate::auth::Identity;
use crate::error::AppError;
use crate::rbac::{has_any_permission, has_permission, AuditEntry, AuditSink, Permission};

/// Require one specific permission
pub fn require_permission(
    audit: &dyn AuditSink,
    identity: &Identity,
    permission: Permission,
    resource: &str,
    action: &str,
) -> Result<(), AppError> {
    let allowed = has_permission(identity.role, permission);

    let mut entry = AuditEntry::new(resource, action, allowed)
        .with_identity(identity.user_id, &identity.email, identity.role)
        .with_permission(permission);
    if !allowed {
        entry = entry.with_reason("Missing required permission");
    }
    audit.record(entry);

    if allowed {
        Ok(())
    } else {
        Err(AppError::PermissionDenied {
            permission,
            action: action.to_string(),
        })
    }
}

/// Require at least one of the given permissions
pub fn require_any_permission(
    audit: &dyn AuditSink,
    identity: &Identity,
    permissions: &[Permission],
    resource: &str,
    action: &str,
) -> Result<(), AppError> {
    let allowed = has_any_permission(identity.role, permissions);

    // Log the first candidate permission for the denied trail
    let mut entry = AuditEntry::new(resource, action, allowed)
        .with_identity(identity.user_id, &identity.email, identity.role);
    if let Some(first) = permissions.first() {
        entry = entry.with_permission(*first);
    }
    if !allowed {
        let wanted: Vec<&str> = permissions.iter().map(|p| p.as_str()).collect();
        entry = entry.with_reason(format!(
            "Missing any of required permissions: {}",
            wanted.join(", ")
        ));
    }
    audit.record(entry);

    if allowed {
        Ok(())
    } else {
        Err(AppError::PermissionDenied {
            permission: permissions.first().copied().unwrap_or(Permission::ReadUser),
            action: action.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{MemoryAuditLog, Role};

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: 7,
            email: "a@b.com".to_string(),
            role,
        }
    }

    #[test]
    fn grant_records_allowed_entry() {
        let log = MemoryAuditLog::new();
        let result = require_permission(
            &log,
            &identity(Role::StationMaster),
            Permission::CreateTrain,
            "/api/trains",
            "create train",
        );
        assert!(result.is_ok());
        let recent = log.recent(1);
        assert!(recent[0].allowed);
        assert_eq!(recent[0].permission, Some(Permission::CreateTrain));
    }

    #[test]
    fn denial_records_reason_and_errors() {
        let log = MemoryAuditLog::new();
        let result = require_permission(
            &log,
            &identity(Role::User),
            Permission::DeleteTrain,
            "/api/trains/42",
            "delete train",
        );
        assert!(matches!(
            result,
            Err(AppError::PermissionDenied { permission: Permission::DeleteTrain, .. })
        ));
        let denied = log.recent_denied(1);
        assert_eq!(denied[0].user_id, Some(7));
        assert_eq!(denied[0].reason.as_deref(), Some("Missing required permission"));
    }

    #[test]
    fn any_permission_accepts_partial_grants() {
        let log = MemoryAuditLog::new();
        let result = require_any_permission(
            &log,
            &identity(Role::ProjectManager),
            &[Permission::DeleteAlert, Permission::CreateAlert],
            "/api/alerts",
            "create alert",
        );
        assert!(result.is_ok());

        let result = require_any_permission(
            &log,
            &identity(Role::User),
            &[Permission::DeleteAlert, Permission::CreateAlert],
            "/api/alerts",
            "create alert",
        );
        assert!(result.is_err());
        let reason = log.recent_denied(1)[0].reason.clone().unwrap();
        assert!(reason.contains("delete:alert"));
        assert!(reason.contains("create:alert"));
    }
}
