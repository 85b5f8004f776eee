use chrono::Utc;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::database::audit::{self, Change, Provenance};
use crate::database::models::{Plan, Project};
use crate::database::snapshot::{self, Depth, Snapshot};
use crate::database::PartialUpdate;
use crate::services::access::Actor;
use crate::services::error::{required, ServiceError, ServiceResult};
use crate::services::folder_service::owned_folder;
use crate::services::project_service::{insert_project, NewProject};
use crate::types::TableName;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    pub title: String,
    #[serde(default)]
    pub week_label: String,
    #[serde(default)]
    pub projects: Vec<NewProject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanUpdate {
    pub title: Option<String>,
    pub week_label: Option<String>,
}

#[derive(Clone)]
pub struct PlanService {
    pool: PgPool,
}

impl PlanService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, caller: Uuid, folder_id: Uuid) -> ServiceResult<Vec<Plan>> {
        let mut conn = self.pool.acquire().await?;
        let actor = Actor::load(&mut conn, caller).await?;
        owned_folder(&mut conn, &actor, folder_id).await?;

        let plans = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE folder_id = $1 ORDER BY created_at, id")
            .bind(folder_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(plans)
    }

    /// Creates a plan and any initial projects; one INSERT entry covers them all.
    pub async fn create(&self, caller: Uuid, folder_id: Uuid, input: NewPlan) -> ServiceResult<(Plan, Vec<Project>)> {
        let title = required("title", &input.title)?;
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let folder = owned_folder(&mut tx, &actor, folder_id).await?;

        let plan: Plan = sqlx::query_as(
            "INSERT INTO plans (id, folder_id, owner_user_id, title, week_label, created_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(folder.id)
        .bind(folder.owner_user_id)
        .bind(&title)
        .bind(input.week_label.trim())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let mut projects = Vec::with_capacity(input.projects.len());
        for project in input.projects {
            projects.push(insert_project(&mut tx, &plan, project).await?);
        }

        audit::record(
            &mut tx,
            &Change::Insert(Snapshot::plan(plan.clone(), projects.clone())),
            Some(actor.id),
            Provenance::Mutation,
        )
        .await?;
        tx.commit().await?;

        info!("Plan {} created in folder {} with {} projects", plan.id, folder.id, projects.len());
        Ok((plan, projects))
    }

    pub async fn update(&self, caller: Uuid, folder_id: Uuid, plan_id: Uuid, fields: PlanUpdate) -> ServiceResult<Plan> {
        let title = fields.title.as_deref().map(|t| required("title", t)).transpose()?;
        let update = PartialUpdate::new(TableName::Plans)
            .set_if("title", title)
            .set_if("week_label", fields.week_label.map(|w| w.trim().to_string()));
        if update.is_empty() {
            return Err(ServiceError::NothingToUpdate);
        }

        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        let old = owned_plan(&mut tx, &actor, folder_id, plan_id).await?;
        let new: Plan = update
            .fetch_optional(&mut tx, plan_id)
            .await?
            .ok_or(ServiceError::NotFound("plan"))?;
        audit::record(
            &mut tx,
            &Change::Update { old: Snapshot::plan(old, Vec::new()), new: Snapshot::plan(new.clone(), Vec::new()) },
            Some(actor.id),
            Provenance::Mutation,
        )
        .await?;
        tx.commit().await?;
        Ok(new)
    }

    pub async fn delete(&self, caller: Uuid, folder_id: Uuid, plan_id: Uuid) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;
        let actor = Actor::load(&mut tx, caller).await?;
        owned_plan(&mut tx, &actor, folder_id, plan_id).await?;

        let tree = snapshot::load(&mut tx, TableName::Plans, plan_id, Depth::Tree)
            .await?
            .ok_or(ServiceError::NotFound("plan"))?;
        snapshot::remove(&mut tx, TableName::Plans, plan_id).await?;
        audit::record(&mut tx, &Change::Delete(tree), Some(actor.id), Provenance::Mutation).await?;
        tx.commit().await?;

        info!("Plan {} deleted by {}", plan_id, actor.id);
        Ok(())
    }
}

/// Fetches a plan inside `folder_id` that the actor may modify.
pub async fn owned_plan(conn: &mut PgConnection, actor: &Actor, folder_id: Uuid, plan_id: Uuid) -> ServiceResult<Plan> {
    let plan = snapshot::fetch_plan(conn, plan_id)
        .await?
        .filter(|p| p.folder_id == folder_id)
        .ok_or(ServiceError::NotFound("plan"))?;
    actor.ensure_owner(plan.owner_user_id)?;
    Ok(plan)
}
