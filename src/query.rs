//! Chainable query helper for custom routes.

use crate::error::AppError;
use crate::resource::ResourceContext;
use crate::schema::ModelHandle;
use crate::sql::SortDir;
use crate::state::AppState;
use crate::store::DocumentStore;
use serde_json::Value;
use sqlx::PgPool;

/// A filter/sort/limit builder with the same contract as the find-all step,
/// parameterized by caller-supplied constraints instead of "all, unsorted".
///
/// ```no_run
/// # use prefab::{Query, SortDir};
/// # async fn recent(state: &prefab::AppState, post: prefab::ModelHandle) -> Result<(), prefab::AppError> {
/// let posts = Query::new(post)
///     .filter("published", "true")
///     .sort("created", SortDir::Desc)
///     .limit(10)
///     .fetch_all(&state.pool)
///     .await?;
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Query {
    model: ModelHandle,
    filters: Vec<(String, Value)>,
    sort: Option<(String, SortDir)>,
    limit: Option<u32>,
}

impl Query {
    pub fn new(model: ModelHandle) -> Query {
        Query { model, filters: Vec::new(), sort: None, limit: None }
    }

    /// Exact-match filter on a declared column. Filters naming undeclared
    /// columns are dropped at SQL generation time.
    pub fn filter(mut self, column: &str, value: impl Into<Value>) -> Query {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn sort(mut self, column: &str, dir: SortDir) -> Query {
        self.sort = Some((column.to_string(), dir));
        self
    }

    pub fn limit(mut self, n: u32) -> Query {
        self.limit = Some(n);
        self
    }

    pub async fn fetch_all(&self, pool: &PgPool) -> Result<Vec<Value>, AppError> {
        let sort = self.sort.as_ref().map(|(c, d)| (c.as_str(), *d));
        DocumentStore::find_all(pool, &self.model, &self.filters, sort, self.limit).await
    }

    /// Run as the first pipeline step of a custom route: attaches the result
    /// list to the request context, exactly like the find-all step.
    pub async fn apply(&self, state: &AppState, ctx: &mut ResourceContext) -> Result<(), AppError> {
        ctx.objects = Some(self.fetch_all(&state.pool).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use crate::sql;
    use serde_json::json;

    #[test]
    fn builder_accumulates_constraints() {
        let model = SchemaRegistry::new()
            .model("post", json!({"title": "string", "created": "date"}))
            .unwrap();
        let q = Query::new(model.clone())
            .filter("title", "a")
            .sort("created", SortDir::Desc)
            .limit(5);
        let sort = q.sort.as_ref().map(|(c, d)| (c.as_str(), *d));
        let built = sql::select_all(&model, &q.filters, sort, q.limit);
        assert!(built.sql.contains(r#""title" = $1::text"#));
        assert!(built.sql.ends_with(r#"ORDER BY "created" DESC LIMIT 5"#));
    }
}
