use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::database::audit::{self, Change, Provenance};
use crate::database::models::{Folder, FolderListing};
use crate::database::snapshot::{self, Depth, Snapshot};
use crate::database::PartialUpdate;
use crate::services::access::Actor;
use crate::services::error::{required, ServiceError, ServiceResult};
use crate::types::TableName;

#[derive(Clone)]
pub struct FolderService {
    pool: PgPool,
}

impl FolderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Own folders for members; every folder, with its owner's name, for admins.
    pub async fn list(&self, caller: Uuid) -> ServiceResult<Vec<FolderListing>> {
        let mut conn = self.pool.acquire().await?;
        let actor = Actor::load(&mut conn, caller).await?;
        let folders = sqlx::query_as::<_, FolderListing>(
            "SELECT f.id, f.name, f.owner_user_id, u.login_id AS owner_login_id, u.display_name AS owner_display_name
             FROM folders f JOIN users u ON u.id = f.owner_user_id
             WHERE $1 OR f.owner_user_id = $2
             ORDER BY f.created_at, f.id",
        )
        .bind(actor.is_admin)
        .bind(actor.id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(folders)
    }

    pub async fn create(&self, caller: Uuid, name: &str) -> ServiceResult<Folder> {
        let name = required("name", name)?;
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;

        let folder: Folder = sqlx::query_as(
            "INSERT INTO folders (id, owner_user_id, name, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(actor.id)
        .bind(&name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;
        audit::record(&mut tx, &Change::Insert(Snapshot::folder(folder.clone())), Some(actor.id), Provenance::Mutation)
            .await?;
        tx.commit().await?;

        info!("Folder {} created by {}", folder.id, actor.id);
        Ok(folder)
    }

    pub async fn rename(&self, caller: Uuid, folder_id: Uuid, name: &str) -> ServiceResult<Folder> {
        let name = required("name", name)?;
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let old = owned_folder(&mut tx, &actor, folder_id).await?;

        let new: Folder = PartialUpdate::new(TableName::Folders)
            .set("name", name)
            .fetch_optional(&mut tx, folder_id)
            .await?
            .ok_or(ServiceError::NotFound("folder"))?;
        audit::record(
            &mut tx,
            &Change::Update { old: Snapshot::folder(old), new: Snapshot::folder(new.clone()) },
            Some(actor.id),
            Provenance::Mutation,
        )
        .await?;
        tx.commit().await?;
        Ok(new)
    }

    /// Deletes the folder with its plans and projects; the snapshot keeps all of them.
    pub async fn delete(&self, caller: Uuid, folder_id: Uuid) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        owned_folder(&mut tx, &actor, folder_id).await?;

        let tree = snapshot::load(&mut tx, TableName::Folders, folder_id, Depth::Tree)
            .await?
            .ok_or(ServiceError::NotFound("folder"))?;
        snapshot::remove(&mut tx, TableName::Folders, folder_id).await?;
        audit::record(&mut tx, &Change::Delete(tree), Some(actor.id), Provenance::Mutation).await?;
        tx.commit().await?;

        info!("Folder {} deleted by {}", folder_id, actor.id);
        Ok(())
    }
}

/// Fetches a folder the actor may modify.
pub async fn owned_folder(conn: &mut PgConnection, actor: &Actor, folder_id: Uuid) -> ServiceResult<Folder> {
    let folder = snapshot::fetch_folder(conn, folder_id)
        .await?
        .ok_or(ServiceError::NotFound("folder"))?;
    actor.ensure_owner(folder.owner_user_id)?;
    Ok(folder)
}
