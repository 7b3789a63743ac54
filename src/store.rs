//! Document store: executes the generated SQL against PostgreSQL and maps
//! rows to JSON documents.

use crate::error::AppError;
use crate::schema::ResolvedModel;
use crate::sql::{self, PgBindValue, QueryBuf, SortDir};
use serde_json::Value;
use sqlx::PgPool;

pub struct DocumentStore;

impl DocumentStore {
    /// All documents of the model, with optional exact-match filters, sort,
    /// and limit.
    pub async fn find_all(
        pool: &PgPool,
        model: &ResolvedModel,
        filters: &[(String, Value)],
        sort: Option<(&str, SortDir)>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        let q = sql::select_all(model, filters, sort, limit);
        Self::fetch_many(pool, &q).await
    }

    /// One document by id string, or None when the id does not match a row.
    pub async fn find_by_id(
        pool: &PgPool,
        model: &ResolvedModel,
        id: &str,
    ) -> Result<Option<Value>, AppError> {
        let mut q = sql::select_by_id(model);
        q.params.push(Value::String(id.to_string()));
        Self::fetch_optional(pool, &q).await
    }

    /// Insert the given field values; returns the created document.
    pub async fn insert(
        pool: &PgPool,
        model: &ResolvedModel,
        values: &[(String, Value)],
    ) -> Result<Value, AppError> {
        let q = sql::insert(model, values);
        Self::fetch_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Update only the given fields of one document. None when the id is gone.
    pub async fn update(
        pool: &PgPool,
        model: &ResolvedModel,
        id: &str,
        values: &[(String, Value)],
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update(model, &Value::String(id.to_string()), values);
        Self::fetch_optional(pool, &q).await
    }

    /// Remove one document by id.
    pub async fn delete(pool: &PgPool, model: &ResolvedModel, id: &str) -> Result<(), AppError> {
        let mut q = sql::delete(model);
        q.params.push(Value::String(id.to_string()));
        Self::fetch_optional(pool, &q).await?;
        Ok(())
    }

    async fn fetch_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_document(&r)))
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
