//! Audit snapshots and the per-table statements that replay them.
//!
//! A snapshot is the full state of one row, optionally with the child rows that
//! a cascading delete removed alongside it. Restoring inserts parents before
//! children; removal relies on `ON DELETE CASCADE`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Folder, Plan, Project, User};
use crate::types::TableName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTree {
    pub user: User,
    #[serde(default)]
    pub folders: Vec<FolderTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderTree {
    pub folder: Folder,
    #[serde(default)]
    pub plans: Vec<PlanTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTree {
    pub plan: Plan,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectLeaf {
    pub project: Project,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    User(UserTree),
    Folder(FolderTree),
    Plan(PlanTree),
    Project(ProjectLeaf),
}

/// How much of the row graph to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Row,
    Tree,
}

impl Snapshot {
    pub fn user(user: User) -> Self {
        Snapshot::User(UserTree { user, folders: Vec::new() })
    }

    pub fn folder(folder: Folder) -> Self {
        Snapshot::Folder(FolderTree { folder, plans: Vec::new() })
    }

    pub fn plan(plan: Plan, projects: Vec<Project>) -> Self {
        Snapshot::Plan(PlanTree { plan, projects })
    }

    pub fn project(project: Project) -> Self {
        Snapshot::Project(ProjectLeaf { project })
    }

    pub fn table(&self) -> TableName {
        match self {
            Snapshot::User(_) => TableName::Users,
            Snapshot::Folder(_) => TableName::Folders,
            Snapshot::Plan(_) => TableName::Plans,
            Snapshot::Project(_) => TableName::Projects,
        }
    }

    pub fn row_id(&self) -> Uuid {
        match self {
            Snapshot::User(t) => t.user.id,
            Snapshot::Folder(t) => t.folder.id,
            Snapshot::Plan(t) => t.plan.id,
            Snapshot::Project(l) => l.project.id,
        }
    }

    /// Same snapshot with every captured child dropped.
    pub fn row_only(&self) -> Snapshot {
        match self {
            Snapshot::User(t) => Snapshot::user(t.user.clone()),
            Snapshot::Folder(t) => Snapshot::folder(t.folder.clone()),
            Snapshot::Plan(t) => Snapshot::plan(t.plan.clone(), Vec::new()),
            Snapshot::Project(l) => Snapshot::Project(l.clone()),
        }
    }

    pub fn to_value(&self) -> Result<Value, DatabaseError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, DatabaseError> {
        Ok(Snapshot::deserialize(value)?)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub async fn load(
    conn: &mut PgConnection,
    table: TableName,
    id: Uuid,
    depth: Depth,
) -> Result<Option<Snapshot>, DatabaseError> {
    let snapshot = match table {
        TableName::Users => {
            let Some(user) = fetch_user(conn, id).await? else { return Ok(None) };
            let folders = match depth {
                Depth::Row => Vec::new(),
                Depth::Tree => load_owned_folder_trees(conn, id).await?,
            };
            Snapshot::User(UserTree { user, folders })
        }
        TableName::Folders => {
            let Some(folder) = fetch_folder(conn, id).await? else { return Ok(None) };
            let plans = match depth {
                Depth::Row => Vec::new(),
                Depth::Tree => {
                    let mut trees = assemble_folder_trees(
                        vec![folder.clone()],
                        plans_in_folders(conn, &[id]).await?,
                        projects_in_folders(conn, &[id]).await?,
                    );
                    trees.pop().map(|t| t.plans).unwrap_or_default()
                }
            };
            Snapshot::Folder(FolderTree { folder, plans })
        }
        TableName::Plans => {
            let Some(plan) = fetch_plan(conn, id).await? else { return Ok(None) };
            let projects = match depth {
                Depth::Row => Vec::new(),
                Depth::Tree => projects_in_plan(conn, id).await?,
            };
            Snapshot::Plan(PlanTree { plan, projects })
        }
        TableName::Projects => {
            let Some(project) = fetch_project(conn, id).await? else { return Ok(None) };
            Snapshot::project(project)
        }
    };
    Ok(Some(snapshot))
}

pub async fn fetch_user(conn: &mut PgConnection, id: Uuid) -> Result<Option<User>, DatabaseError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn fetch_folder(conn: &mut PgConnection, id: Uuid) -> Result<Option<Folder>, DatabaseError> {
    Ok(sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn fetch_plan(conn: &mut PgConnection, id: Uuid) -> Result<Option<Plan>, DatabaseError> {
    Ok(sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn fetch_project(conn: &mut PgConnection, id: Uuid) -> Result<Option<Project>, DatabaseError> {
    Ok(sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn projects_in_plan(conn: &mut PgConnection, plan_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
    Ok(sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE plan_id = $1 ORDER BY created_at, id",
    )
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?)
}

async fn load_owned_folder_trees(conn: &mut PgConnection, owner: Uuid) -> Result<Vec<FolderTree>, DatabaseError> {
    let folders = sqlx::query_as::<_, Folder>(
        "SELECT * FROM folders WHERE owner_user_id = $1 ORDER BY created_at, id",
    )
    .bind(owner)
    .fetch_all(&mut *conn)
    .await?;
    let ids: Vec<Uuid> = folders.iter().map(|f| f.id).collect();
    let plans = plans_in_folders(conn, &ids).await?;
    let projects = projects_in_folders(conn, &ids).await?;
    Ok(assemble_folder_trees(folders, plans, projects))
}

async fn plans_in_folders(conn: &mut PgConnection, folder_ids: &[Uuid]) -> Result<Vec<Plan>, DatabaseError> {
    Ok(sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE folder_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(folder_ids)
    .fetch_all(&mut *conn)
    .await?)
}

async fn projects_in_folders(conn: &mut PgConnection, folder_ids: &[Uuid]) -> Result<Vec<Project>, DatabaseError> {
    Ok(sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE folder_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(folder_ids)
    .fetch_all(&mut *conn)
    .await?)
}

/// Groups flat rows into folder → plan → project trees, keeping input order.
/// Rows whose parent is not in the input are dropped.
pub fn assemble_folder_trees(folders: Vec<Folder>, plans: Vec<Plan>, projects: Vec<Project>) -> Vec<FolderTree> {
    let mut projects_by_plan: HashMap<Uuid, Vec<Project>> = HashMap::new();
    for project in projects {
        projects_by_plan.entry(project.plan_id).or_default().push(project);
    }

    let mut plans_by_folder: HashMap<Uuid, Vec<PlanTree>> = HashMap::new();
    for plan in plans {
        let projects = projects_by_plan.remove(&plan.id).unwrap_or_default();
        plans_by_folder
            .entry(plan.folder_id)
            .or_default()
            .push(PlanTree { plan, projects });
    }

    folders
        .into_iter()
        .map(|folder| {
            let plans = plans_by_folder.remove(&folder.id).unwrap_or_default();
            FolderTree { folder, plans }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Re-inserts the snapshot, parents first. Rows that already exist are left
/// untouched. Returns whether the top-level row was inserted.
pub async fn restore(conn: &mut PgConnection, snapshot: &Snapshot) -> Result<bool, DatabaseError> {
    match snapshot {
        Snapshot::User(tree) => {
            let inserted = insert_user(conn, &tree.user).await?;
            for folder in &tree.folders {
                restore_folder_tree(conn, folder).await?;
            }
            Ok(inserted)
        }
        Snapshot::Folder(tree) => restore_folder_tree(conn, tree).await,
        Snapshot::Plan(tree) => restore_plan_tree(conn, tree).await,
        Snapshot::Project(leaf) => insert_project(conn, &leaf.project).await,
    }
}

async fn restore_folder_tree(conn: &mut PgConnection, tree: &FolderTree) -> Result<bool, DatabaseError> {
    let inserted = insert_folder(conn, &tree.folder).await?;
    for plan in &tree.plans {
        restore_plan_tree(conn, plan).await?;
    }
    Ok(inserted)
}

async fn restore_plan_tree(conn: &mut PgConnection, tree: &PlanTree) -> Result<bool, DatabaseError> {
    let inserted = insert_plan(conn, &tree.plan).await?;
    for project in &tree.projects {
        insert_project(conn, project).await?;
    }
    Ok(inserted)
}

pub async fn insert_user(conn: &mut PgConnection, user: &User) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO users (id, login_id, password_hash, display_name, phone_number, role, is_admin, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(user.id)
    .bind(&user.login_id)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(&user.phone_number)
    .bind(&user.role)
    .bind(user.is_admin)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn insert_folder(conn: &mut PgConnection, folder: &Folder) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO folders (id, owner_user_id, name, created_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(folder.id)
    .bind(folder.owner_user_id)
    .bind(&folder.name)
    .bind(folder.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn insert_plan(conn: &mut PgConnection, plan: &Plan) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO plans (id, folder_id, owner_user_id, title, week_label, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(plan.id)
    .bind(plan.folder_id)
    .bind(plan.owner_user_id)
    .bind(&plan.title)
    .bind(&plan.week_label)
    .bind(plan.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn insert_project(conn: &mut PgConnection, project: &Project) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO projects (id, plan_id, folder_id, owner_user_id, name, last_week_notes, this_week_notes, feedback, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(project.id)
    .bind(project.plan_id)
    .bind(project.folder_id)
    .bind(project.owner_user_id)
    .bind(&project.name)
    .bind(&project.last_week_notes)
    .bind(&project.this_week_notes)
    .bind(&project.feedback)
    .bind(project.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Deletes one row; children go with it through the foreign-key cascade.
/// Returns false when the row was already gone.
pub async fn remove(conn: &mut PgConnection, table: TableName, id: Uuid) -> Result<bool, DatabaseError> {
    let sql = match table {
        TableName::Users => "DELETE FROM users WHERE id = $1",
        TableName::Folders => "DELETE FROM folders WHERE id = $1",
        TableName::Plans => "DELETE FROM plans WHERE id = $1",
        TableName::Projects => "DELETE FROM projects WHERE id = $1",
    };
    let result = sqlx::query(sql).bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() == 1)
}

/// Writes every column of the snapshot's top-level row over the stored row.
/// Children are ignored. Returns false when the row does not exist.
pub async fn overwrite(conn: &mut PgConnection, snapshot: &Snapshot) -> Result<bool, DatabaseError> {
    let result = match snapshot {
        Snapshot::User(tree) => {
            let u = &tree.user;
            sqlx::query(
                "UPDATE users SET login_id = $2, password_hash = $3, display_name = $4,
                 phone_number = $5, role = $6, is_admin = $7 WHERE id = $1",
            )
            .bind(u.id)
            .bind(&u.login_id)
            .bind(&u.password_hash)
            .bind(&u.display_name)
            .bind(&u.phone_number)
            .bind(&u.role)
            .bind(u.is_admin)
            .execute(&mut *conn)
            .await?
        }
        Snapshot::Folder(tree) => {
            let f = &tree.folder;
            sqlx::query("UPDATE folders SET owner_user_id = $2, name = $3 WHERE id = $1")
                .bind(f.id)
                .bind(f.owner_user_id)
                .bind(&f.name)
                .execute(&mut *conn)
                .await?
        }
        Snapshot::Plan(tree) => {
            let p = &tree.plan;
            sqlx::query(
                "UPDATE plans SET folder_id = $2, owner_user_id = $3, title = $4, week_label = $5 WHERE id = $1",
            )
            .bind(p.id)
            .bind(p.folder_id)
            .bind(p.owner_user_id)
            .bind(&p.title)
            .bind(&p.week_label)
            .execute(&mut *conn)
            .await?
        }
        Snapshot::Project(leaf) => {
            let p = &leaf.project;
            sqlx::query(
                "UPDATE projects SET plan_id = $2, folder_id = $3, owner_user_id = $4, name = $5,
                 last_week_notes = $6, this_week_notes = $7, feedback = $8 WHERE id = $1",
            )
            .bind(p.id)
            .bind(p.plan_id)
            .bind(p.folder_id)
            .bind(p.owner_user_id)
            .bind(&p.name)
            .bind(&p.last_week_notes)
            .bind(&p.this_week_notes)
            .bind(&p.feedback)
            .execute(&mut *conn)
            .await?
        }
    };
    Ok(result.rows_affected() == 1)
}
