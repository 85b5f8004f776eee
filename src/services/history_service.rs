//! Undo/redo driven by the audit log.
//!
//! The log is the only state. Replaying its entries in id order yields two
//! stacks: mutations that can still be undone, and undone entries that can
//! still be redone. Undo and redo each apply one compensating step and append
//! an entry that records it, so the stacks advance exactly once per call.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::{HistoryConfig, HistoryScope};
use crate::database::audit::{self, Change, CursorRow, Provenance};
use crate::database::models::AuditEntry;
use crate::database::snapshot::{self, Depth, Snapshot};
use crate::database::DatabaseError;
use crate::services::access::Actor;
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::{AuditAction, AuditOrigin, TableName};

/// Advisory lock key used when the history is shared by everyone.
const GLOBAL_HISTORY_LOCK: i64 = 0x7765_656b_706c_616e;

pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// Undo and redo stacks reconstructed from the log.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub done: Vec<i64>,
    pub undone: Vec<i64>,
}

impl Cursor {
    pub fn replay(rows: &[CursorRow]) -> Result<Self, DatabaseError> {
        let mut cursor = Cursor::default();
        for row in rows {
            let origin: AuditOrigin = row
                .origin
                .parse()
                .map_err(|e: crate::types::ParseTypeError| DatabaseError::QueryError(e.to_string()))?;
            match (origin, row.compensates) {
                (AuditOrigin::Mutation, _) => {
                    cursor.done.push(row.id);
                    cursor.undone.clear();
                }
                (AuditOrigin::Undo, Some(target)) => {
                    if take(&mut cursor.done, target) {
                        cursor.undone.push(target);
                    }
                }
                (AuditOrigin::Redo, Some(target)) => {
                    if take(&mut cursor.undone, target) {
                        cursor.done.push(target);
                    }
                }
                (_, None) => {}
            }
        }
        Ok(cursor)
    }

    pub fn next(&self, direction: Direction) -> Option<i64> {
        match direction {
            Direction::Undo => self.done.last().copied(),
            Direction::Redo => self.undone.last().copied(),
        }
    }
}

/// Removes `id` from the stack. `false` when it was not there, e.g. a second
/// undo of an entry that is already undone.
fn take(stack: &mut Vec<i64>, id: i64) -> bool {
    match stack.iter().rposition(|&x| x == id) {
        Some(pos) => {
            stack.remove(pos);
            true
        }
        None => false,
    }
}

/// The compensating statement for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Delete the row (and its children).
    Remove(Snapshot),
    /// Re-insert the snapshot, parents first.
    Restore(Snapshot),
    /// Write `apply` over the current row. `prior` is what the row is expected to hold now.
    Overwrite { apply: Snapshot, prior: Snapshot },
}

/// `last_undo` is what the most recent undo of this entry recorded. Redoing an
/// insert restores the tree that undo removed, so children added after the
/// insert come back with it.
pub fn plan_step(change: Change, direction: Direction, last_undo: Option<Change>) -> Step {
    match (change, direction) {
        (Change::Insert(new), Direction::Undo) => Step::Remove(new),
        (Change::Insert(new), Direction::Redo) => match last_undo {
            Some(Change::Delete(removed)) if removed.table() == new.table() && removed.row_id() == new.row_id() => {
                Step::Restore(removed)
            }
            _ => Step::Restore(new),
        },
        (Change::Delete(old), Direction::Undo) => Step::Restore(old),
        (Change::Delete(old), Direction::Redo) => Step::Remove(old),
        (Change::Update { old, new }, Direction::Undo) => Step::Overwrite { apply: old, prior: new },
        (Change::Update { old, new }, Direction::Redo) => Step::Overwrite { apply: new, prior: old },
    }
}

/// Applies a step and describes what it did as a new change. A target that is
/// already in the requested state is not an error.
async fn apply_step(conn: &mut PgConnection, step: Step) -> Result<Change, DatabaseError> {
    match step {
        Step::Remove(expected) => {
            let current = snapshot::load(conn, expected.table(), expected.row_id(), Depth::Tree).await?;
            snapshot::remove(conn, expected.table(), expected.row_id()).await?;
            Ok(Change::Delete(current.unwrap_or(expected)))
        }
        Step::Restore(snapshot) => {
            snapshot::restore(conn, &snapshot).await?;
            Ok(Change::Insert(snapshot))
        }
        Step::Overwrite { apply, prior } => {
            let apply = apply.row_only();
            match snapshot::load(conn, apply.table(), apply.row_id(), Depth::Row).await? {
                Some(current) => {
                    snapshot::overwrite(conn, &apply).await?;
                    Ok(Change::Update { old: current, new: apply })
                }
                None => Ok(Change::Update { old: prior.row_only(), new: apply }),
            }
        }
    }
}

/// Result of one undo or redo.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryOutcome {
    pub entry_id: i64,
    pub compensates: i64,
    pub table: TableName,
    pub row_id: Uuid,
    pub action: AuditAction,
}

/// Audit entry without its snapshots; user snapshots carry password hashes.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub id: i64,
    pub table_name: String,
    pub row_id: Uuid,
    pub action: String,
    pub origin: String,
    pub compensates: Option<i64>,
    pub actor_user_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AuditEntry> for HistoryItem {
    fn from(e: AuditEntry) -> Self {
        Self {
            id: e.id,
            table_name: e.table_name,
            row_id: e.row_id,
            action: e.action,
            origin: e.origin,
            compensates: e.compensates,
            actor_user_id: e.actor_user_id,
            created_at: e.created_at,
        }
    }
}

#[derive(Clone)]
pub struct HistoryService {
    pool: PgPool,
    config: HistoryConfig,
}

impl HistoryService {
    pub fn new(pool: PgPool, config: HistoryConfig) -> Self {
        Self { pool, config }
    }

    /// Whose entries `actor` operates on. `None` is the whole log.
    pub fn scope_for(&self, actor: Option<Uuid>) -> Option<Uuid> {
        match self.config.scope {
            HistoryScope::User => actor,
            HistoryScope::Global => None,
        }
    }

    /// Confirms an HTTP caller still has an account. The CLI passes user ids
    /// straight to `undo`/`redo` and can act for a removed account.
    pub async fn caller(&self, user_id: Uuid) -> ServiceResult<Uuid> {
        let mut conn = self.pool.acquire().await?;
        Ok(Actor::load(&mut conn, user_id).await?.id)
    }

    pub async fn undo(&self, actor: Option<Uuid>) -> ServiceResult<HistoryOutcome> {
        self.step(actor, Direction::Undo).await
    }

    pub async fn redo(&self, actor: Option<Uuid>) -> ServiceResult<HistoryOutcome> {
        self.step(actor, Direction::Redo).await
    }

    pub async fn list(&self, actor: Option<Uuid>, limit: Option<i64>) -> ServiceResult<Vec<HistoryItem>> {
        let limit = limit.unwrap_or(self.config.list_limit).clamp(1, MAX_LIST_LIMIT);
        let mut conn = self.pool.acquire().await?;
        let entries = audit::recent(&mut conn, self.scope_for(actor), limit).await?;
        Ok(entries.into_iter().map(HistoryItem::from).collect())
    }

    async fn step(&self, actor: Option<Uuid>, direction: Direction) -> ServiceResult<HistoryOutcome> {
        let scope = self.scope_for(actor);
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(lock_key(scope))
            .execute(&mut *tx)
            .await?;

        let rows = audit::cursor_rows(&mut tx, scope).await?;
        let cursor = Cursor::replay(&rows)?;
        let target = cursor.next(direction).ok_or(match direction {
            Direction::Undo => ServiceError::NothingToUndo,
            Direction::Redo => ServiceError::NothingToRedo,
        })?;

        let entry = audit::fetch(&mut tx, target).await?;
        let last_undo = match direction {
            Direction::Undo => None,
            Direction::Redo => audit::latest_compensation(&mut tx, target, AuditOrigin::Undo)
                .await?
                .map(|undo| Change::from_entry(&undo))
                .transpose()?,
        };
        let step = plan_step(Change::from_entry(&entry)?, direction, last_undo);
        let change = apply_step(&mut tx, step).await.map_err(conflict_or)?;
        let provenance = match direction {
            Direction::Undo => Provenance::Undo(target),
            Direction::Redo => Provenance::Redo(target),
        };
        let entry_id = audit::record(&mut tx, &change, actor, provenance).await?;
        tx.commit().await?;

        info!(
            "{:?} of audit #{} applied as {} on {} {} (#{})",
            direction,
            target,
            change.action(),
            change.table(),
            change.row_id(),
            entry_id
        );
        Ok(HistoryOutcome {
            entry_id,
            compensates: target,
            table: change.table(),
            row_id: change.row_id(),
            action: change.action(),
        })
    }
}

fn lock_key(scope: Option<Uuid>) -> i64 {
    match scope {
        None => GLOBAL_HISTORY_LOCK,
        Some(id) => {
            let mut prefix = [0u8; 8];
            prefix.copy_from_slice(&id.as_bytes()[..8]);
            i64::from_be_bytes(prefix)
        }
    }
}

/// Constraint violations while replaying mean the surrounding rows changed
/// since the entry was written.
fn conflict_or(err: DatabaseError) -> ServiceError {
    if err.is_unique_violation() || err.is_foreign_key_violation() {
        ServiceError::HistoryConflict(err.to_string())
    } else {
        ServiceError::Database(err)
    }
}
