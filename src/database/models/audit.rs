use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Raw `audit_log` row. Labels stay as stored text; the history engine parses them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub table_name: String,
    pub row_id: Uuid,
    pub action: String,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
    pub actor_user_id: Option<Uuid>,
    pub origin: String,
    pub compensates: Option<i64>,
    pub created_at: DateTime<Utc>,
}
