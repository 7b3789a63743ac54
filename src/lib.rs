//! prefab: declarative model-to-CRUD scaffolding.
//!
//! Declare a model once, get a table, seven RESTful routes, and
//! server-rendered views for it:
//!
//! ```no_run
//! use prefab::{App, SchemaRegistry};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), prefab::AppError> {
//! let registry = SchemaRegistry::new();
//! let post = registry.model("post", json!({
//!     "title": "string",
//!     "content": "markdown",
//!     "created": "date",
//! }))?;
//!
//! let app = App::new("postgres://localhost/blog")?;
//! app.migrate(&post).await?;
//! app.resource("/posts", post).serve().await
//! # }
//! ```

pub mod app;
pub mod error;
pub mod middleware;
pub mod migrate;
pub mod query;
pub mod resource;
pub mod schema;
pub mod sql;
pub mod state;
pub mod store;

pub use app::App;
pub use error::{AppError, SchemaError};
pub use migrate::ensure_model_table;
pub use query::Query;
pub use resource::{resource, ResourceContext};
pub use resource::steps;
pub use schema::{FieldSpec, FieldType, ModelHandle, ResolvedModel, SchemaRegistry};
pub use sql::SortDir;
pub use state::{AppState, ResourceState};
pub use store::DocumentStore;
