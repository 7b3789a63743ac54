//! Minimal blog: one model, seven generated routes, plus one custom route
//! built from the query helper and step exports.
//!
//! Templates and static files resolve relative to the working directory, so
//! run from this directory: `cd demos && cargo run --example blog`.

use axum::{extract::State, routing::get, Router};
use prefab::{steps, App, AppError, AppState, ModelHandle, Query, ResourceContext, SchemaRegistry, SortDir};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("prefab=debug".parse()?))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/blog".into());

    let registry = SchemaRegistry::new();
    let post = registry.model(
        "post",
        json!({
            "title": {"type": "string", "required": true},
            "content": "markdown",
            "created": "date",
        }),
    )?;

    let app = App::with_locals(&database_url, json!({"title": "My Blog"}))?;
    app.migrate(&post).await?;

    let recent = Router::new()
        .route("/recent", get(recent_posts))
        .with_state((app.state(), post.clone()));

    app.resource("/posts", post).mount(recent).serve().await?;
    Ok(())
}

async fn recent_posts(
    State((state, post)): State<(AppState, ModelHandle)>,
) -> Result<axum::response::Html<String>, AppError> {
    let mut ctx = ResourceContext::new(post.clone());
    Query::new(post)
        .sort("created", SortDir::Desc)
        .limit(5)
        .apply(&state, &mut ctx)
        .await?;
    steps::render(&state, &ctx, "post/index.html")
}
