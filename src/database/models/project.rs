use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row of a weekly plan. `folder_id` and `owner_user_id` are copied from the parent plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub folder_id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub last_week_notes: String,
    pub this_week_notes: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}
