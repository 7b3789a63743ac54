//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved model.
//!
//! Every document table has the same shape: `id UUID PRIMARY KEY` plus one
//! typed column per declared field. Values always bind as text with a SQL
//! cast (`$n::bigint`, `$n::timestamptz`, ...) so raw form strings coerce
//! inside the database; a failed coercion surfaces as a query error.

use crate::schema::ResolvedModel;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from registered schemas).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn keyword(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf { sql: String::new(), params: Vec::new() }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: id plus every declared column, in declaration order.
fn column_list(model: &ResolvedModel) -> String {
    let mut cols = vec![quoted("id")];
    cols.extend(model.fields.iter().map(|f| quoted(&f.name)));
    cols.join(", ")
}

/// Placeholder with a cast when the column has a known type.
fn placeholder(model: &ResolvedModel, column: &str, n: usize) -> String {
    match model.field(column) {
        Some(f) => format!("${}::{}", n, f.field_type.pg_type()),
        None => format!("${}", n),
    }
}

/// SELECT with optional exact-match filters, sort, and limit. Filters naming
/// columns the model does not declare are dropped.
pub fn select_all(
    model: &ResolvedModel,
    filters: &[(String, Value)],
    sort: Option<(&str, SortDir)>,
    limit: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if model.field(col).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        where_parts.push(format!("{} = {}", quoted(col), placeholder(model, col, n)));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = match sort {
        Some((col, dir)) if model.field(col).is_some() => {
            format!(" ORDER BY {} {}", quoted(col), dir.keyword())
        }
        _ => format!(" ORDER BY {}", quoted("id")),
    };
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        column_list(model),
        quoted(&model.name),
        where_clause,
        order_clause,
        limit_clause
    );
    q
}

/// SELECT one row by id. Caller binds the id (as text) as the sole parameter.
pub fn select_by_id(model: &ResolvedModel) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1::uuid",
        column_list(model),
        quoted(&model.name),
        quoted("id")
    );
    q
}

/// INSERT the given field values; omitted columns take their defaults.
/// Returns the created row.
pub fn insert(model: &ResolvedModel, values: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (col, val) in values {
        if model.field(col).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        cols.push(quoted(col));
        placeholders.push(placeholder(model, col, n));
    }
    if cols.is_empty() {
        q.sql = format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quoted(&model.name),
            column_list(model)
        );
        return q;
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(&model.name),
        cols.join(", "),
        placeholders.join(", "),
        column_list(model)
    );
    q
}

/// UPDATE by id: SET only the given columns. Returns the updated row, or no
/// row when the id no longer exists.
pub fn update(model: &ResolvedModel, id: &Value, values: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (col, val) in values {
        if model.field(col).is_none() {
            continue;
        }
        let n = q.push_param(val.clone());
        sets.push(format!("{} = {}", quoted(col), placeholder(model, col, n)));
    }
    if sets.is_empty() {
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = $1::uuid",
            column_list(model),
            quoted(&model.name),
            quoted("id")
        );
        q.params.push(id.clone());
        return q;
    }
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::uuid RETURNING {}",
        quoted(&model.name),
        sets.join(", "),
        quoted("id"),
        id_param,
        column_list(model)
    );
    q
}

/// DELETE by id. Caller binds the id (as text) as the sole parameter.
pub fn delete(model: &ResolvedModel) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1::uuid RETURNING {}",
        quoted(&model.name),
        quoted("id"),
        quoted("id")
    );
    q
}
