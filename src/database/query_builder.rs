use sqlx::{postgres::PgRow, FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::TableName;

/// Value assigned to one column of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    NullableText(Option<String>),
    Bool(bool),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        SqlValue::NullableText(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

/// Columns each table accepts in a partial update. Keys, parents and
/// timestamps are never rewritten this way.
pub fn updatable_columns(table: TableName) -> &'static [&'static str] {
    match table {
        TableName::Users => &["display_name", "phone_number", "role", "is_admin", "password_hash"],
        TableName::Folders => &["name"],
        TableName::Plans => &["title", "week_label"],
        TableName::Projects => &["name", "last_week_notes", "this_week_notes", "feedback"],
    }
}

/// `UPDATE <table> SET ... WHERE id = $n RETURNING *` built from only the
/// fields a caller actually supplied. Column names come from code, values
/// are always bound.
#[derive(Debug, Clone)]
pub struct PartialUpdate {
    table: TableName,
    assignments: Vec<(&'static str, SqlValue)>,
}

impl PartialUpdate {
    pub fn new(table: TableName) -> Self {
        Self { table, assignments: Vec::new() }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Adds the assignment only when a value was supplied.
    pub fn set_if<V: Into<SqlValue>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(c, _)| *c).collect()
    }

    pub fn query(&self, id: Uuid) -> Result<QueryBuilder<'static, Postgres>, DatabaseError> {
        if self.is_empty() {
            return Err(DatabaseError::QueryError("no columns to update".to_string()));
        }
        let allowed = updatable_columns(self.table);
        if let Some((column, _)) = self.assignments.iter().find(|(c, _)| !allowed.contains(c)) {
            return Err(DatabaseError::QueryError(format!(
                "column '{}' cannot be updated on {}",
                column, self.table
            )));
        }

        let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", self.table.as_str()));
        {
            let mut set = builder.separated(", ");
            for (column, value) in &self.assignments {
                set.push(format!("{} = ", column));
                match value.clone() {
                    SqlValue::Text(v) => set.push_bind_unseparated(v),
                    SqlValue::NullableText(v) => set.push_bind_unseparated(v),
                    SqlValue::Bool(v) => set.push_bind_unseparated(v),
                };
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");
        Ok(builder)
    }

    /// Runs the update and returns the new row, or `None` if no row has that id.
    pub async fn fetch_optional<T>(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut builder = self.query(id)?;
        Ok(builder.build_query_as::<T>().fetch_optional(&mut *conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supplied_fields_are_assigned() {
        let update = PartialUpdate::new(TableName::Plans)
            .set_if("title", Some("Week 10".to_string()))
            .set_if::<String>("week_label", None);

        assert_eq!(update.columns(), vec!["title"]);
        let builder = update.query(Uuid::nil()).unwrap();
        assert_eq!(builder.sql(), "UPDATE plans SET title = $1 WHERE id = $2 RETURNING *");
    }

    #[test]
    fn placeholders_follow_assignment_order() {
        let update = PartialUpdate::new(TableName::Users)
            .set("display_name", Some("Alice".to_string()))
            .set("role", "lead")
            .set("is_admin", true);
        let builder = update.query(Uuid::nil()).unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE users SET display_name = $1, role = $2, is_admin = $3 WHERE id = $4 RETURNING *"
        );
    }

    #[test]
    fn values_never_reach_sql_text() {
        let update = PartialUpdate::new(TableName::Folders).set("name", "x'; DROP TABLE users; --");
        let builder = update.query(Uuid::nil()).unwrap();
        assert!(!builder.sql().contains("DROP"));
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(PartialUpdate::new(TableName::Projects).is_empty());
        assert!(PartialUpdate::new(TableName::Projects).query(Uuid::nil()).is_err());
    }

    #[test]
    fn columns_outside_the_table_whitelist_are_rejected() {
        let update = PartialUpdate::new(TableName::Projects).set("owner_user_id", "someone");
        assert!(matches!(update.query(Uuid::nil()), Err(DatabaseError::QueryError(_))));
    }
}
