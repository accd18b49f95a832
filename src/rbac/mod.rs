//! Role-based access control
//!
//! Static role/permission table, handler-level permission gates, and the
//! audit log that records every authorization decision.

mod audit;
mod guard;
mod table;

pub use audit::{AuditEntry, AuditSink, AuditStats, DecisionCounts, MemoryAuditLog};
pub use guard::{require_any_permission, require_permission};
pub use table::{
    has_all_permissions, has_any_permission, has_permission, permissions_for, Permission, Role,
    ROLE_HIERARCHY,
};
