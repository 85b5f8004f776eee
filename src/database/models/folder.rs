use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Folder row joined with its owner's name, for listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FolderListing {
    pub id: Uuid,
    pub name: String,
    pub owner_user_id: Uuid,
    pub owner_login_id: String,
    pub owner_display_name: Option<String>,
}
