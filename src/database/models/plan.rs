use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub folder_id: Uuid,
    pub owner_user_id: Uuid,
    pub title: String,
    /// Free-form reporting week, e.g. "2025-W10"; not validated as a date.
    pub week_label: String,
    pub created_at: DateTime<Utc>,
}
