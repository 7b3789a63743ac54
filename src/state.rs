//! Shared application state for all routes.

use crate::schema::ModelHandle;
use sqlx::PgPool;
use std::sync::Arc;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub templates: Arc<Tera>,
    /// Application-wide template locals: defaults overlaid with caller
    /// overrides at construction, read-only afterwards.
    pub locals: Arc<serde_json::Map<String, serde_json::Value>>,
}

/// State of one mounted resource router: the shared application state, the
/// single model the router serves, and the mount prefix its redirects target.
/// Stateless across requests.
#[derive(Clone)]
pub struct ResourceState {
    pub app: AppState,
    pub model: ModelHandle,
    pub prefix: String,
}
