//! Audit log records.
//!
//! Every mutation writes one audit record in the same transaction as the
//! change it describes, so the two commit or roll back together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for the audit entry.
    pub id: Uuid,
    /// The acting user.
    pub actor_id: Uuid,
    /// Dotted action name, e.g. `"clock.check_in"` or `"rates.create"`.
    pub action: String,
    /// The entity the action touched.
    pub entity_id: Uuid,
    /// When the action happened.
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a fresh audit record.
    pub fn new(actor_id: Uuid, action: &str, entity_id: Uuid, at: DateTime<Utc>) -> Self {
        AuditRecord {
            id: Uuid::new_v4(),
            actor_id,
            action: action.to_string(),
            entity_id,
            at,
        }
    }
}
