use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full `users` row. Carries the password hash, so it is only serialized into
/// audit snapshots; API responses use [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login_id: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub login_id: String,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: String,
    pub is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login_id: user.login_id.clone(),
            display_name: user.display_name.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role.clone(),
            is_admin: user.is_admin,
        }
    }
}
