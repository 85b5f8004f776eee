use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::audit::{self, Change, Provenance};
use crate::database::models::{Plan, Project};
use crate::database::snapshot::{self, Snapshot};
use crate::database::PartialUpdate;
use crate::services::access::Actor;
use crate::services::error::{required, ServiceError, ServiceResult};
use crate::services::plan_service::owned_plan;
use crate::types::TableName;

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub last_week_notes: String,
    #[serde(default)]
    pub this_week_notes: String,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub last_week_notes: Option<String>,
    pub this_week_notes: Option<String>,
    pub feedback: Option<String>,
}

/// Plan owner details shown next to a project listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlanOwnerInfo {
    pub display_name: Option<String>,
    pub role: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectListing {
    pub projects: Vec<Project>,
    pub user_info: Option<PlanOwnerInfo>,
}

#[derive(Clone)]
pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, caller: Uuid, folder_id: Uuid, plan_id: Uuid) -> ServiceResult<ProjectListing> {
        let mut conn = self.pool.acquire().await?;
        let actor = Actor::load(&mut conn, caller).await?;
        let plan = owned_plan(&mut conn, &actor, folder_id, plan_id).await?;

        let projects = snapshot::projects_in_plan(&mut conn, plan.id).await?;
        let user_info = sqlx::query_as::<_, PlanOwnerInfo>(
            "SELECT display_name, role, phone_number FROM users WHERE id = $1",
        )
        .bind(plan.owner_user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(ProjectListing { projects, user_info })
    }

    pub async fn create(&self, caller: Uuid, folder_id: Uuid, plan_id: Uuid, input: NewProject) -> ServiceResult<Project> {
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let plan = owned_plan(&mut tx, &actor, folder_id, plan_id).await?;

        let project = insert_project(&mut tx, &plan, input).await?;
        audit::record(&mut tx, &Change::Insert(Snapshot::project(project.clone())), Some(actor.id), Provenance::Mutation)
            .await?;
        tx.commit().await?;
        Ok(project)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        folder_id: Uuid,
        plan_id: Uuid,
        project_id: Uuid,
        fields: ProjectUpdate,
    ) -> ServiceResult<Project> {
        let name = fields.name.as_deref().map(|n| required("name", n)).transpose()?;
        let update = PartialUpdate::new(TableName::Projects)
            .set_if("name", name)
            .set_if("last_week_notes", fields.last_week_notes)
            .set_if("this_week_notes", fields.this_week_notes)
            .set_if("feedback", fields.feedback);
        if update.is_empty() {
            return Err(ServiceError::NothingToUpdate);
        }

        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let old = owned_project(&mut tx, &actor, folder_id, plan_id, project_id).await?;
        let new: Project = update
            .fetch_optional(&mut tx, project_id)
            .await?
            .ok_or(ServiceError::NotFound("project"))?;
        audit::record(
            &mut tx,
            &Change::Update { old: Snapshot::project(old), new: Snapshot::project(new.clone()) },
            Some(actor.id),
            Provenance::Mutation,
        )
        .await?;
        tx.commit().await?;
        Ok(new)
    }

    pub async fn delete(&self, caller: Uuid, folder_id: Uuid, plan_id: Uuid, project_id: Uuid) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let project = owned_project(&mut tx, &actor, folder_id, plan_id, project_id).await?;

        snapshot::remove(&mut tx, TableName::Projects, project_id).await?;
        audit::record(&mut tx, &Change::Delete(Snapshot::project(project)), Some(actor.id), Provenance::Mutation)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Inserts a project under `plan`, copying its folder and owner. No audit entry:
/// callers record one for the enclosing operation.
pub async fn insert_project(conn: &mut PgConnection, plan: &Plan, input: NewProject) -> ServiceResult<Project> {
    let name = required("project name", &input.name)?;
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, plan_id, folder_id, owner_user_id, name, last_week_notes, this_week_notes, feedback, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(plan.id)
    .bind(plan.folder_id)
    .bind(plan.owner_user_id)
    .bind(&name)
    .bind(&input.last_week_notes)
    .bind(&input.this_week_notes)
    .bind(&input.feedback)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(project)
}

async fn owned_project(
    conn: &mut PgConnection,
    actor: &Actor,
    folder_id: Uuid,
    plan_id: Uuid,
    project_id: Uuid,
) -> ServiceResult<Project> {
    owned_plan(conn, actor, folder_id, plan_id).await?;
    snapshot::fetch_project(conn, project_id)
        .await?
        .filter(|p| p.plan_id == plan_id)
        .ok_or(ServiceError::NotFound("project"))
}
