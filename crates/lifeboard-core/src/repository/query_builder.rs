use crate::models::{TaskFilter, UserId};
use sqlx::{QueryBuilder, Sqlite};

/// Builds the `SELECT body` query for a task listing.
///
/// Filters are pushed down to SQLite's JSON functions so only matching
/// documents are decoded.
pub struct TaskQueryBuilder;

impl TaskQueryBuilder {
    pub fn build<'a>(collection: &'static str, owner: &UserId, filter: &TaskFilter) -> QueryBuilder<'a, Sqlite> {
        let mut builder: QueryBuilder<'a, Sqlite> =
            QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        builder.push_bind(collection);
        builder.push(" AND owner_id = ");
        builder.push_bind(owner.as_str().to_string());

        if let Some(status) = filter.status {
            builder.push(" AND json_extract(body, '$.status') = ");
            builder.push_bind(status.as_str());
        }

        if let Some(project) = &filter.project {
            builder.push(" AND json_extract(body, '$.project') = ");
            builder.push_bind(project.clone());
        }

        if let Some(tag) = &filter.tag {
            builder.push(
                " AND EXISTS (SELECT 1 FROM json_each(documents.body, '$.tags') WHERE json_each.value = ",
            );
            builder.push_bind(tag.clone());
            builder.push(")");
        }

        builder.push(" ORDER BY json_extract(body, '$.dueDate') IS NULL, json_extract(body, '$.dueDate'), created_at");
        builder
    }
}
