//! Application factory: connection pool, template engine, middleware stack,
//! and router assembly.

use crate::error::AppError;
use crate::migrate;
use crate::resource;
use crate::schema::ModelHandle;
use crate::state::AppState;
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tera::Tera;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_TITLE: &str = "Prefab App";
const VIEWS_GLOB: &str = "views/**/*.html";
const STATIC_DIR: &str = "static";
const DEFAULT_PORT: u16 = 3000;

/// The application under construction: one pool, one template engine, one
/// locals map, and the routers mounted so far.
pub struct App {
    state: AppState,
    router: Router,
}

impl App {
    /// Build an application against the given PostgreSQL URI with default
    /// locals. The pool is lazy: a bad or unreachable database surfaces at
    /// the first query, not here.
    pub fn new(database_url: &str) -> Result<App, AppError> {
        App::with_locals(database_url, Value::Null)
    }

    /// Like [`App::new`] but overlaying caller-supplied template locals on
    /// the defaults (caller wins per key).
    ///
    /// Templates load from `views/**/*.html`. The `markdown` filter renders
    /// markdown-typed fields (pair with `| safe`); tera's builtin `date`
    /// filter formats date fields. Static files serve from `static/`, with
    /// `/favicon.ico` aliased to `static/favicon.ico`.
    pub fn with_locals(database_url: &str, locals: Value) -> Result<App, AppError> {
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy(database_url)?;
        let mut templates = Tera::new(VIEWS_GLOB)?;
        templates.register_filter("markdown", markdown_filter);
        let state = AppState {
            pool,
            templates: Arc::new(templates),
            locals: Arc::new(merge_locals(locals)),
        };
        let router = Router::new()
            .nest_service("/static", ServeDir::new(STATIC_DIR))
            .route_service(
                "/favicon.ico",
                ServeFile::new(format!("{}/favicon.ico", STATIC_DIR)),
            );
        Ok(App { state, router })
    }

    /// Shared state handle for custom routes built from the step exports.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Create the model's table when missing. Call once per model at startup.
    pub async fn migrate(&self, model: &ModelHandle) -> Result<(), AppError> {
        migrate::ensure_model_table(&self.state.pool, model).await
    }

    /// Mount the seven conventional routes for `model` under `prefix`.
    pub fn resource(mut self, prefix: &str, model: ModelHandle) -> App {
        self.router = self
            .router
            .merge(resource::resource(self.state.clone(), prefix, model));
        self
    }

    /// Merge a caller-built router (custom routes) into the application.
    pub fn mount(mut self, router: Router) -> App {
        self.router = self.router.merge(router);
        self
    }

    /// The assembled router with the middleware stack applied. Used directly
    /// in tests and when embedding into a larger axum application.
    pub fn into_router(self) -> Router {
        self.router
            .layer(axum::middleware::from_fn(crate::middleware::method_override))
    }

    /// Bind and serve. Port from the `PORT` environment variable, default
    /// 3000.
    pub async fn serve(self) -> Result<(), AppError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

/// Default locals overlaid with caller overrides, caller wins per key.
fn merge_locals(overrides: Value) -> serde_json::Map<String, Value> {
    let mut merged = serde_json::Map::new();
    merged.insert("title".to_string(), Value::String(DEFAULT_TITLE.to_string()));
    if let Value::Object(overrides) = overrides {
        for (k, v) in overrides {
            merged.insert(k, v);
        }
    }
    merged
}

/// Tera filter rendering a markdown string to HTML.
fn markdown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let input = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("markdown filter expects a string"))?;
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(input));
    Ok(Value::String(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn locals_default_title() {
        let merged = merge_locals(Value::Null);
        assert_eq!(merged["title"], json!("Prefab App"));
    }

    #[test]
    fn locals_caller_wins_per_key() {
        let merged = merge_locals(json!({"title": "X", "author": "me"}));
        assert_eq!(merged["title"], json!("X"));
        assert_eq!(merged["author"], json!("me"));
    }

    #[test]
    fn locals_merge_is_idempotent() {
        let once = merge_locals(json!({"title": "X"}));
        let twice = merge_locals(Value::Object(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn markdown_filter_renders_html() {
        let out = markdown_filter(&json!("# hi"), &HashMap::new()).unwrap();
        assert_eq!(out.as_str().unwrap().trim(), "<h1>hi</h1>");
    }

    #[test]
    fn markdown_filter_rejects_non_strings() {
        assert!(markdown_filter(&json!(42), &HashMap::new()).is_err());
    }
}
