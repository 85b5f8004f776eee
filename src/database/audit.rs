//! Append-only audit log.
//!
//! Every mutation of users, folders, plans or projects calls [`record`] on the
//! same connection (and therefore the same transaction) that performed the
//! write. Entries are never updated or deleted.

use serde_json::Value;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::AuditEntry;
use crate::database::snapshot::Snapshot;
use crate::types::{AuditAction, AuditOrigin, TableName};

/// One documented mutation with its before/after state.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Snapshot),
    Update { old: Snapshot, new: Snapshot },
    Delete(Snapshot),
}

impl Change {
    pub fn action(&self) -> AuditAction {
        match self {
            Change::Insert(_) => AuditAction::Insert,
            Change::Update { .. } => AuditAction::Update,
            Change::Delete(_) => AuditAction::Delete,
        }
    }

    fn subject(&self) -> &Snapshot {
        match self {
            Change::Insert(s) | Change::Delete(s) => s,
            Change::Update { new, .. } => new,
        }
    }

    pub fn table(&self) -> TableName {
        self.subject().table()
    }

    pub fn row_id(&self) -> Uuid {
        self.subject().row_id()
    }

    pub fn before(&self) -> Option<&Snapshot> {
        match self {
            Change::Insert(_) => None,
            Change::Update { old, .. } => Some(old),
            Change::Delete(old) => Some(old),
        }
    }

    pub fn after(&self) -> Option<&Snapshot> {
        match self {
            Change::Insert(new) => Some(new),
            Change::Update { new, .. } => Some(new),
            Change::Delete(_) => None,
        }
    }

    /// Rebuilds a change from a stored entry.
    pub fn from_entry(entry: &AuditEntry) -> Result<Self, DatabaseError> {
        let action: AuditAction = entry
            .action
            .parse()
            .map_err(|e: crate::types::ParseTypeError| DatabaseError::QueryError(e.to_string()))?;
        let old = entry.old_data.as_ref().map(Snapshot::from_value).transpose()?;
        let new = entry.new_data.as_ref().map(Snapshot::from_value).transpose()?;

        match (action, old, new) {
            (AuditAction::Insert, None, Some(new)) => Ok(Change::Insert(new)),
            (AuditAction::Delete, Some(old), None) => Ok(Change::Delete(old)),
            (AuditAction::Update, Some(old), Some(new)) => Ok(Change::Update { old, new }),
            _ => Err(DatabaseError::QueryError(format!(
                "audit entry {} has data inconsistent with {}",
                entry.id, entry.action
            ))),
        }
    }
}

/// Where an entry came from. Compensating entries point at the entry they reverse or replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Mutation,
    Undo(i64),
    Redo(i64),
}

impl Provenance {
    pub fn origin(&self) -> AuditOrigin {
        match self {
            Provenance::Mutation => AuditOrigin::Mutation,
            Provenance::Undo(_) => AuditOrigin::Undo,
            Provenance::Redo(_) => AuditOrigin::Redo,
        }
    }

    pub fn compensates(&self) -> Option<i64> {
        match self {
            Provenance::Mutation => None,
            Provenance::Undo(id) | Provenance::Redo(id) => Some(*id),
        }
    }
}

/// Appends one entry and returns its id.
pub async fn record(
    conn: &mut PgConnection,
    change: &Change,
    actor: Option<Uuid>,
    provenance: Provenance,
) -> Result<i64, DatabaseError> {
    let old_data: Option<Value> = change.before().map(Snapshot::to_value).transpose()?;
    let new_data: Option<Value> = change.after().map(Snapshot::to_value).transpose()?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO audit_log (table_name, row_id, action, old_data, new_data, actor_user_id, origin, compensates)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id",
    )
    .bind(change.table().as_str())
    .bind(change.row_id())
    .bind(change.action().as_str())
    .bind(old_data)
    .bind(new_data)
    .bind(actor)
    .bind(provenance.origin().as_str())
    .bind(provenance.compensates())
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(
        "audit #{} {} {} {} ({})",
        id,
        change.action(),
        change.table(),
        change.row_id(),
        provenance.origin().as_str()
    );
    Ok(id)
}

/// The part of an entry the undo/redo cursor needs.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CursorRow {
    pub id: i64,
    pub origin: String,
    pub compensates: Option<i64>,
}

/// All cursor rows in scope, oldest first. `None` means the whole log.
///
/// A user's scope also holds undo and redo entries written by anyone else
/// (the CLI, a global-scope server) against that user's mutations, so the
/// user's cursor never reverses an entry twice.
pub async fn cursor_rows(conn: &mut PgConnection, actor: Option<Uuid>) -> Result<Vec<CursorRow>, DatabaseError> {
    let rows = match actor {
        Some(actor) => {
            sqlx::query_as::<_, CursorRow>(
                "SELECT id, origin, compensates FROM audit_log
                 WHERE actor_user_id = $1
                    OR compensates IN (
                        SELECT id FROM audit_log WHERE actor_user_id = $1 AND origin = 'mutation'
                    )
                 ORDER BY id",
            )
            .bind(actor)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, CursorRow>("SELECT id, origin, compensates FROM audit_log ORDER BY id")
                .fetch_all(&mut *conn)
                .await?
        }
    };
    Ok(rows)
}

pub async fn fetch(conn: &mut PgConnection, id: i64) -> Result<AuditEntry, DatabaseError> {
    sqlx::query_as::<_, AuditEntry>("SELECT * FROM audit_log WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("audit entry {}", id)))
}

/// The newest entry of `origin` that compensates `target`, if any.
pub async fn latest_compensation(
    conn: &mut PgConnection,
    target: i64,
    origin: AuditOrigin,
) -> Result<Option<AuditEntry>, DatabaseError> {
    let entry = sqlx::query_as::<_, AuditEntry>(
        "SELECT * FROM audit_log WHERE compensates = $1 AND origin = $2 ORDER BY id DESC LIMIT 1",
    )
    .bind(target)
    .bind(origin.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(entry)
}

/// Most recent entries in scope, newest first.
pub async fn recent(conn: &mut PgConnection, actor: Option<Uuid>, limit: i64) -> Result<Vec<AuditEntry>, DatabaseError> {
    let entries = match actor {
        Some(actor) => {
            sqlx::query_as::<_, AuditEntry>(
                "SELECT * FROM audit_log WHERE actor_user_id = $1 ORDER BY id DESC LIMIT $2",
            )
            .bind(actor)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, AuditEntry>("SELECT * FROM audit_log ORDER BY id DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&mut *conn)
                .await?
        }
    };
    Ok(entries)
}
