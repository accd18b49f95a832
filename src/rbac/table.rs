//! Static role/permission table
//!
//! Pure lookup functions mapping roles to granted permissions. The table is
//! small and immutable, so nothing here is cached or locked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User roles, in order of privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full system access, user management, system configuration
    Admin,
    /// Manage trains and alerts at the assigned station
    StationMaster,
    /// Project oversight and team coordination
    ProjectManager,
    /// Team management and task assignment
    TeamLead,
    /// Basic access: view public data, receive alerts
    User,
}

/// Role hierarchy, most privileged first
pub const ROLE_HIERARCHY: [Role; 5] = [
    Role::Admin,
    Role::StationMaster,
    Role::ProjectManager,
    Role::TeamLead,
    Role::User,
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::StationMaster => "STATION_MASTER",
            Role::ProjectManager => "PROJECT_MANAGER",
            Role::TeamLead => "TEAM_LEAD",
            Role::User => "USER",
        }
    }

    /// Privilege level; lower is more privileged
    pub fn level(&self) -> usize {
        ROLE_HIERARCHY
            .iter()
            .position(|r| r == self)
            .expect("every role appears in the hierarchy")
    }

    /// True when `self` sits at or above `other` in the hierarchy.
    ///
    /// Display/introspection only: authorization decisions go through the
    /// permission table and the explicit admin pass in the middleware.
    pub fn outranks_or_equals(&self, other: Role) -> bool {
        self.level() <= other.level()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Full system access - manage all resources, users, and configuration",
            Role::StationMaster => "Station management - manage trains and alerts at assigned station",
            Role::ProjectManager => "Project oversight - view all data and coordinate teams",
            Role::TeamLead => "Team coordination - manage team activities and view project data",
            Role::User => "Basic access - view public information and receive personalized alerts",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "STATION_MASTER" => Ok(Role::StationMaster),
            "PROJECT_MANAGER" => Ok(Role::ProjectManager),
            "TEAM_LEAD" => Ok(Role::TeamLead),
            "USER" => Ok(Role::User),
            _ => Err(()),
        }
    }
}

/// Permissions of the form `<action>:<resource>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // User management
    #[serde(rename = "create:user")]
    CreateUser,
    #[serde(rename = "read:user")]
    ReadUser,
    #[serde(rename = "update:user")]
    UpdateUser,
    #[serde(rename = "delete:user")]
    DeleteUser,

    // Train management
    #[serde(rename = "create:train")]
    CreateTrain,
    #[serde(rename = "read:train")]
    ReadTrain,
    #[serde(rename = "update:train")]
    UpdateTrain,
    #[serde(rename = "delete:train")]
    DeleteTrain,
    #[serde(rename = "assign:train")]
    AssignTrain,

    // Alert management
    #[serde(rename = "create:alert")]
    CreateAlert,
    #[serde(rename = "read:alert")]
    ReadAlert,
    #[serde(rename = "update:alert")]
    UpdateAlert,
    #[serde(rename = "delete:alert")]
    DeleteAlert,

    // Reroute management
    #[serde(rename = "create:reroute")]
    CreateReroute,
    #[serde(rename = "read:reroute")]
    ReadReroute,
    #[serde(rename = "update:reroute")]
    UpdateReroute,
    #[serde(rename = "delete:reroute")]
    DeleteReroute,

    // File management
    #[serde(rename = "upload:file")]
    UploadFile,
    #[serde(rename = "read:file")]
    ReadFile,
    #[serde(rename = "delete:file")]
    DeleteFile,

    // System administration
    #[serde(rename = "manage:roles")]
    ManageRoles,
    #[serde(rename = "view:logs")]
    ViewLogs,
    #[serde(rename = "system:config")]
    SystemConfig,
}

impl Permission {
    /// Every permission in the system. ADMIN's grant is exactly this array,
    /// so the admin-superset rule holds by construction instead of by a
    /// hand-maintained list.
    pub const ALL: [Permission; 23] = [
        Permission::CreateUser,
        Permission::ReadUser,
        Permission::UpdateUser,
        Permission::DeleteUser,
        Permission::CreateTrain,
        Permission::ReadTrain,
        Permission::UpdateTrain,
        Permission::DeleteTrain,
        Permission::AssignTrain,
        Permission::CreateAlert,
        Permission::ReadAlert,
        Permission::UpdateAlert,
        Permission::DeleteAlert,
        Permission::CreateReroute,
        Permission::ReadReroute,
        Permission::UpdateReroute,
        Permission::DeleteReroute,
        Permission::UploadFile,
        Permission::ReadFile,
        Permission::DeleteFile,
        Permission::ManageRoles,
        Permission::ViewLogs,
        Permission::SystemConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateUser => "create:user",
            Permission::ReadUser => "read:user",
            Permission::UpdateUser => "update:user",
            Permission::DeleteUser => "delete:user",
            Permission::CreateTrain => "create:train",
            Permission::ReadTrain => "read:train",
            Permission::UpdateTrain => "update:train",
            Permission::DeleteTrain => "delete:train",
            Permission::AssignTrain => "assign:train",
            Permission::CreateAlert => "create:alert",
            Permission::ReadAlert => "read:alert",
            Permission::UpdateAlert => "update:alert",
            Permission::DeleteAlert => "delete:alert",
            Permission::CreateReroute => "create:reroute",
            Permission::ReadReroute => "read:reroute",
            Permission::UpdateReroute => "update:reroute",
            Permission::DeleteReroute => "delete:reroute",
            Permission::UploadFile => "upload:file",
            Permission::ReadFile => "read:file",
            Permission::DeleteFile => "delete:file",
            Permission::ManageRoles => "manage:roles",
            Permission::ViewLogs => "view:logs",
            Permission::SystemConfig => "system:config",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STATION_MASTER_PERMISSIONS: &[Permission] = &[
    Permission::ReadUser,
    Permission::CreateTrain,
    Permission::ReadTrain,
    Permission::UpdateTrain,
    Permission::DeleteTrain,
    Permission::CreateAlert,
    Permission::ReadAlert,
    Permission::UpdateAlert,
    Permission::DeleteAlert,
    Permission::CreateReroute,
    Permission::ReadReroute,
    Permission::UpdateReroute,
    Permission::UploadFile,
    Permission::ReadFile,
];

const PROJECT_MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ReadUser,
    Permission::ReadTrain,
    Permission::ReadAlert,
    Permission::CreateAlert,
    Permission::ReadReroute,
    Permission::UploadFile,
    Permission::ReadFile,
];

const TEAM_LEAD_PERMISSIONS: &[Permission] = &[
    Permission::ReadUser,
    Permission::ReadTrain,
    Permission::ReadAlert,
    Permission::ReadReroute,
    Permission::UploadFile,
    Permission::ReadFile,
];

const USER_PERMISSIONS: &[Permission] = &[
    Permission::ReadTrain,
    Permission::ReadAlert,
    Permission::ReadReroute,
    Permission::ReadFile,
];

/// Ordered permission set granted to a role
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => &Permission::ALL,
        Role::StationMaster => STATION_MASTER_PERMISSIONS,
        Role::ProjectManager => PROJECT_MANAGER_PERMISSIONS,
        Role::TeamLead => TEAM_LEAD_PERMISSIONS,
        Role::User => USER_PERMISSIONS,
    }
}

/// Check if a role has a specific permission
pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// Check if a role has at least one of the given permissions
pub fn has_any_permission(role: Role, permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| has_permission(role, *p))
}

/// Check if a role has all of the given permissions
pub fn has_all_permissions(role: Role, permissions: &[Permission]) -> bool {
    permissions.iter().all(|p| has_permission(role, *p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn admin_grant_is_superset_of_every_role() {
        for role in ROLE_HIERARCHY {
            for permission in permissions_for(role) {
                assert!(
                    has_permission(Role::Admin, *permission),
                    "ADMIN is missing {} granted to {}",
                    permission,
                    role
                );
            }
        }
    }

    #[test]
    fn table_lookup_is_deterministic() {
        for role in ROLE_HIERARCHY {
            let expected = permissions_for(role);
            for permission in Permission::ALL {
                let granted = expected.contains(&permission);
                assert_eq!(has_permission(role, permission), granted);
                assert_eq!(has_permission(role, permission), granted);
            }
        }
    }

    #[test]
    fn station_master_manages_trains_but_not_roles() {
        assert!(has_permission(Role::StationMaster, Permission::CreateTrain));
        assert!(has_permission(Role::StationMaster, Permission::DeleteTrain));
        assert!(!has_permission(Role::StationMaster, Permission::ManageRoles));
        assert!(!has_permission(Role::StationMaster, Permission::DeleteReroute));
    }

    #[test]
    fn user_is_read_only() {
        assert_eq!(
            permissions_for(Role::User),
            &[
                Permission::ReadTrain,
                Permission::ReadAlert,
                Permission::ReadReroute,
                Permission::ReadFile,
            ]
        );
        assert!(!has_permission(Role::User, Permission::CreateAlert));
    }

    #[test]
    fn any_and_all_combinators() {
        let wanted = [Permission::CreateTrain, Permission::ManageRoles];
        assert!(has_any_permission(Role::StationMaster, &wanted));
        assert!(!has_all_permissions(Role::StationMaster, &wanted));
        assert!(has_all_permissions(Role::Admin, &wanted));
        assert!(!has_any_permission(Role::User, &wanted));
    }

    #[test]
    fn hierarchy_ordering() {
        assert!(Role::Admin.outranks_or_equals(Role::User));
        assert!(Role::StationMaster.outranks_or_equals(Role::TeamLead));
        assert!(!Role::User.outranks_or_equals(Role::TeamLead));
        assert!(Role::ProjectManager.outranks_or_equals(Role::ProjectManager));
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in ROLE_HIERARCHY {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("CONDUCTOR".parse::<Role>().is_err());
    }

    #[test]
    fn permission_serializes_as_action_resource() {
        let json = serde_json::to_string(&Permission::CreateTrain).unwrap();
        assert_eq!(json, "\"create:train\"");
        let back: Permission = serde_json::from_str("\"view:logs\"").unwrap();
        assert_eq!(back, Permission::ViewLogs);
    }
}
