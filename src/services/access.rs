//! Who is calling, and what they may touch.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::database::snapshot;
use crate::services::error::{ServiceError, ServiceResult};

/// Authenticated caller, resolved from the id the access guard attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    /// Looks up the caller's current admin flag. A valid token for a user that
    /// has since been deleted is rejected.
    pub async fn load(conn: &mut PgConnection, user_id: Uuid) -> ServiceResult<Self> {
        let user = snapshot::fetch_user(conn, user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        Ok(Self { id: user.id, is_admin: user.is_admin })
    }

    pub fn can_touch(&self, owner_user_id: Uuid) -> bool {
        self.is_admin || self.id == owner_user_id
    }

    pub fn ensure_owner(&self, owner_user_id: Uuid) -> ServiceResult<()> {
        if self.can_touch(owner_user_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("not the owner of this resource"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_and_admins_may_touch() {
        let owner = Uuid::new_v4();
        let member = Actor { id: owner, is_admin: false };
        let stranger = Actor { id: Uuid::new_v4(), is_admin: false };
        let admin = Actor { id: Uuid::new_v4(), is_admin: true };

        assert!(member.ensure_owner(owner).is_ok());
        assert!(admin.ensure_owner(owner).is_ok());
        assert!(matches!(stranger.ensure_owner(owner), Err(ServiceError::Forbidden(_))));
    }
}
