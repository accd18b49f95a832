//! Authorization audit log
//!
//! Every authorization decision is recorded through an injectable
//! [`AuditSink`]. The default sink keeps entries in process memory: no
//! persistence, no rotation, no size cap. Entries are lost on restart.

use crate::rbac::{Permission, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

/// One authorization decision. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    /// None when the request carried no verifiable identity
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub resource: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditEntry {
    pub fn new(resource: impl Into<String>, action: impl Into<String>, allowed: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: None,
            email: None,
            role: None,
            resource: resource.into(),
            action: action.into(),
            permission: None,
            allowed,
            reason: None,
        }
    }

    pub fn with_identity(mut self, user_id: i64, email: &str, role: Role) -> Self {
        self.user_id = Some(user_id);
        self.email = Some(email.to_string());
        self.role = Some(role);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Per-role allow/deny tally
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DecisionCounts {
    pub allowed: usize,
    pub denied: usize,
}

/// Summary statistics over the whole log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total_decisions: usize,
    pub allowed: usize,
    pub denied: usize,
    pub by_role: HashMap<Role, DecisionCounts>,
}

/// Destination for authorization decisions.
///
/// The middleware appends from every in-flight request, so implementations
/// must be safe under concurrent writers.
pub trait AuditSink: Send + Sync {
    /// Append one entry. O(1).
    fn record(&self, entry: AuditEntry);

    /// Last `n` entries, newest first
    fn recent(&self, n: usize) -> Vec<AuditEntry>;

    /// Last `n` entries for one user, newest first
    fn recent_for_user(&self, user_id: i64, n: usize) -> Vec<AuditEntry>;

    /// Last `n` denied decisions, newest first
    fn recent_denied(&self, n: usize) -> Vec<AuditEntry>;

    /// Empty the log. Administrative and test use only.
    fn clear(&self);

    fn stats(&self) -> AuditStats;
}

/// In-memory append-only audit log
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        info!(
            allowed = entry.allowed,
            user = entry.email.as_deref().unwrap_or("anonymous"),
            role = entry.role.map(|r| r.as_str()).unwrap_or("-"),
            resource = %entry.resource,
            action = %entry.action,
            reason = entry.reason.as_deref().unwrap_or(""),
            "authorization decision"
        );
        self.entries.lock().expect("audit log poisoned").push(entry);
    }

    fn recent(&self, n: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().expect("audit log poisoned");
        entries.iter().rev().take(n).cloned().collect()
    }

    fn recent_for_user(&self, user_id: i64, n: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().expect("audit log poisoned");
        entries
            .iter()
            .rev()
            .filter(|e| e.user_id == Some(user_id))
            .take(n)
            .cloned()
            .collect()
    }

    fn recent_denied(&self, n: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().expect("audit log poisoned");
        entries
            .iter()
            .rev()
            .filter(|e| !e.allowed)
            .take(n)
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.entries.lock().expect("audit log poisoned").clear();
    }

    fn stats(&self) -> AuditStats {
        let entries = self.entries.lock().expect("audit log poisoned");
        let mut stats = AuditStats {
            total_decisions: entries.len(),
            allowed: 0,
            denied: 0,
            by_role: HashMap::new(),
        };
        for entry in entries.iter() {
            if entry.allowed {
                stats.allowed += 1;
            } else {
                stats.denied += 1;
            }
            if let Some(role) = entry.role {
                let counts = stats.by_role.entry(role).or_default();
                if entry.allowed {
                    counts.allowed += 1;
                } else {
                    counts.denied += 1;
                }
            }
        }
        stats
    }
}
