//! The seven conventional routes for one model.
//!
//! | Method | Path            | Pipeline                                  |
//! |--------|-----------------|-------------------------------------------|
//! | GET    | `P`             | find-all, render `index`                  |
//! | GET    | `P/new`         | instantiate, render `new`                 |
//! | POST   | `P`             | instantiate, populate-and-save, redirect  |
//! | GET    | `P/:id`         | find-one, render `show`                   |
//! | GET    | `P/:id/edit`    | find-one, render `edit`                   |
//! | PUT    | `P/:id`         | find-one, populate-and-save, redirect     |
//! | DELETE | `P/:id`         | find-one, delete, redirect                |
//!
//! PUT and DELETE are reachable from plain HTML forms through the
//! method-override middleware installed by the application factory.

use crate::error::AppError;
use crate::resource::steps;
use crate::resource::steps::ResourceContext;
use crate::schema::ModelHandle;
use crate::state::{AppState, ResourceState};
use axum::{
    extract::{Form, Path, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use std::collections::HashMap;

/// Mount the seven-route table for `model` under `prefix` (e.g. `/posts`).
pub fn resource(app: AppState, prefix: &str, model: ModelHandle) -> Router {
    let state = ResourceState { app, model, prefix: prefix.to_string() };
    Router::new()
        .route(prefix, get(index).post(create))
        .route(&format!("{}/new", prefix), get(new_form))
        .route(&format!("{}/:id", prefix), get(show).put(update).delete(destroy))
        .route(&format!("{}/:id/edit", prefix), get(edit_form))
        .with_state(state)
}

async fn index(State(st): State<ResourceState>) -> Result<Html<String>, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::find(&st.app, &mut ctx).await?;
    steps::render(&st.app, &ctx, &st.model.template("index"))
}

async fn new_form(State(st): State<ResourceState>) -> Result<Html<String>, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::instantiate(&mut ctx);
    steps::render(&st.app, &ctx, &st.model.template("new"))
}

async fn create(
    State(st): State<ResourceState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::instantiate(&mut ctx);
    steps::populate_and_save(&st.app, &mut ctx, &form).await?;
    Ok(steps::redirect(&st.prefix, None))
}

async fn show(
    State(st): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::find_one(&st.app, &mut ctx, &id).await?;
    steps::render(&st.app, &ctx, &st.model.template("show"))
}

async fn edit_form(
    State(st): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::find_one(&st.app, &mut ctx, &id).await?;
    steps::render(&st.app, &ctx, &st.model.template("edit"))
}

async fn update(
    State(st): State<ResourceState>,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::find_one(&st.app, &mut ctx, &id).await?;
    steps::populate_and_save(&st.app, &mut ctx, &form).await?;
    Ok(steps::redirect(&st.prefix, None))
}

async fn destroy(
    State(st): State<ResourceState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let mut ctx = ResourceContext::new(st.model.clone());
    steps::find_one(&st.app, &mut ctx, &id).await?;
    steps::delete(&st.app, &mut ctx).await?;
    Ok(steps::redirect(&st.prefix, None))
}
