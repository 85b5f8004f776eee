use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Folder, Plan, Project};
use crate::services::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub folders: Vec<Folder>,
    pub plans: Vec<Plan>,
    pub projects: Vec<Project>,
}

#[derive(Clone)]
pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive substring search over the caller's own rows.
    pub async fn search(&self, caller: Uuid, keyword: &str) -> ServiceResult<SearchResults> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ServiceError::Validation("keyword is required".to_string()));
        }
        let pattern = like_pattern(keyword);

        let folders = sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_user_id = $1 AND name ILIKE $2 ESCAPE '\\'
             ORDER BY created_at, id",
        )
        .bind(caller)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let plans = sqlx::query_as::<_, Plan>(
            "SELECT * FROM plans WHERE owner_user_id = $1
             AND (title ILIKE $2 ESCAPE '\\' OR week_label ILIKE $2 ESCAPE '\\')
             ORDER BY created_at, id",
        )
        .bind(caller)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE owner_user_id = $1
             AND (name ILIKE $2 ESCAPE '\\' OR last_week_notes ILIKE $2 ESCAPE '\\'
                  OR this_week_notes ILIKE $2 ESCAPE '\\' OR feedback ILIKE $2 ESCAPE '\\')
             ORDER BY created_at, id",
        )
        .bind(caller)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(SearchResults { folders, plans, projects })
    }
}

/// `%keyword%` with LIKE metacharacters in the keyword escaped.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_pattern("plan"), "%plan%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
