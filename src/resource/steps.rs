//! Composable middleware steps for resource routes.
//!
//! Each generated route is a strict left-to-right pipeline of these steps;
//! `?` short-circuits the rest of the chain with the step's response. The
//! steps are public so custom routes can compose them the same way the
//! generated ones do.

use crate::error::AppError;
use crate::schema::ModelHandle;
use crate::state::AppState;
use crate::store::DocumentStore;
use axum::response::{Html, Redirect};
use serde_json::Value;
use std::collections::HashMap;

/// Per-request scratch state carried between steps. Created at the top of a
/// handler, dropped with the response.
pub struct ResourceContext {
    pub model: ModelHandle,
    pub object: Option<Value>,
    pub objects: Option<Vec<Value>>,
}

impl ResourceContext {
    pub fn new(model: ModelHandle) -> ResourceContext {
        ResourceContext { model, object: None, objects: None }
    }
}

/// find-all: loads every document of the model, unfiltered, and attaches the
/// list to the context.
pub async fn find(state: &AppState, ctx: &mut ResourceContext) -> Result<(), AppError> {
    let objects = DocumentStore::find_all(&state.pool, &ctx.model, &[], None, None).await?;
    ctx.objects = Some(objects);
    Ok(())
}

/// find-one: loads the document with the given path id, 404 when missing.
pub async fn find_one(state: &AppState, ctx: &mut ResourceContext, id: &str) -> Result<(), AppError> {
    let object = DocumentStore::find_by_id(&state.pool, &ctx.model, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", ctx.model.name, id)))?;
    ctx.object = Some(object);
    Ok(())
}

/// instantiate: attaches a new, unsaved, empty document. Always continues.
pub fn instantiate(ctx: &mut ResourceContext) {
    ctx.object = Some(Value::Object(serde_json::Map::new()));
}

/// populate-and-save: mass-assigns submitted form values to the model's
/// assignable fields, then persists. A context document carrying an id is
/// updated (only the assigned fields); one without is inserted.
///
/// Date-typed fields follow the paired `<field>_date` / `<field>_time` form
/// convention: both submitted values combine into a single timestamp.
/// Everything else is assigned raw; the database coerces via bind cast, and
/// a failed coercion aborts the chain with 500.
pub async fn populate_and_save(
    state: &AppState,
    ctx: &mut ResourceContext,
    form: &HashMap<String, String>,
) -> Result<(), AppError> {
    let assigned = collect_assignments(&ctx.model, form);
    let existing_id = ctx
        .object
        .as_ref()
        .and_then(|o| o.get("id"))
        .and_then(Value::as_str)
        .map(String::from);
    let saved = match existing_id {
        Some(id) => DocumentStore::update(&state.pool, &ctx.model, &id, &assigned)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", ctx.model.name, id)))?,
        None => DocumentStore::insert(&state.pool, &ctx.model, &assigned).await?,
    };
    ctx.object = Some(saved);
    Ok(())
}

/// delete: removes the context document from storage.
pub async fn delete(state: &AppState, ctx: &mut ResourceContext) -> Result<(), AppError> {
    let id = ctx
        .object
        .as_ref()
        .and_then(|o| o.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::NotFound(ctx.model.name.clone()))?;
    DocumentStore::delete(&state.pool, &ctx.model, id).await
}

/// render: application locals merged with the context's `object` and/or
/// `objects`, rendered through the named template.
pub fn render(state: &AppState, ctx: &ResourceContext, template: &str) -> Result<Html<String>, AppError> {
    let mut tctx = tera::Context::new();
    // model first so an application local of the same name wins, like every
    // other locals key.
    tctx.insert("model", &ctx.model.name);
    for (key, value) in state.locals.iter() {
        tctx.insert(key, value);
    }
    if let Some(ref object) = ctx.object {
        tctx.insert("object", object);
    }
    if let Some(ref objects) = ctx.objects {
        tctx.insert("objects", objects);
    }
    let body = state.templates.render(template, &tctx)?;
    Ok(Html(body))
}

/// redirect: see-other to `path`, optionally appending `/` + the given id.
/// Generated routes always redirect to the bare collection path; the id form
/// exists for custom routes.
pub fn redirect(path: &str, id: Option<&str>) -> Redirect {
    match id {
        Some(id) => Redirect::to(&format!("{}/{}", path, id)),
        None => Redirect::to(path),
    }
}

/// Values to assign on save: every assignable field present in the form,
/// with date-typed fields combined from their `_date`/`_time` pair.
fn collect_assignments(model: &ModelHandle, form: &HashMap<String, String>) -> Vec<(String, Value)> {
    let mut assigned = Vec::new();
    for field in model.assignable_fields() {
        let paired_date = field
            .field_type
            .is_date()
            .then(|| form.get(&format!("{}_date", field.name)))
            .flatten()
            .filter(|d| !d.is_empty());
        match paired_date {
            Some(date) => {
                let time = form.get(&format!("{}_time", field.name)).map(String::as_str);
                assigned.push((field.name.clone(), Value::String(combine_date_time(date, time))));
            }
            None => {
                if let Some(value) = form.get(&field.name) {
                    assigned.push((field.name.clone(), Value::String(value.clone())));
                }
            }
        }
    }
    assigned
}

fn combine_date_time(date: &str, time: Option<&str>) -> String {
    match time {
        Some(t) if !t.is_empty() => format!("{} {}", date, t),
        _ => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn post_model() -> ModelHandle {
        SchemaRegistry::new()
            .model("post", json!({"title": "string", "content": "text", "created": "date"}))
            .unwrap()
    }

    fn test_state(templates: tera::Tera) -> AppState {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/prefab_test")
            .unwrap();
        let mut locals = serde_json::Map::new();
        locals.insert("title".into(), json!("Test App"));
        AppState { pool, templates: Arc::new(templates), locals: Arc::new(locals) }
    }

    #[test]
    fn instantiate_attaches_empty_document() {
        let mut ctx = ResourceContext::new(post_model());
        instantiate(&mut ctx);
        assert_eq!(ctx.object, Some(json!({})));
    }

    #[test]
    fn assignments_take_raw_form_values() {
        let model = post_model();
        let form: HashMap<String, String> = [
            ("title".to_string(), "a".to_string()),
            ("content".to_string(), "b".to_string()),
            ("ignored".to_string(), "x".to_string()),
        ]
        .into();
        let assigned = collect_assignments(&model, &form);
        assert_eq!(
            assigned,
            vec![
                ("title".to_string(), json!("a")),
                ("content".to_string(), json!("b")),
            ]
        );
    }

    #[test]
    fn absent_fields_are_left_untouched() {
        let model = post_model();
        let form: HashMap<String, String> = [("title".to_string(), "a".to_string())].into();
        let assigned = collect_assignments(&model, &form);
        assert!(!assigned.iter().any(|(name, _)| name == "created"));
        assert!(!assigned.iter().any(|(name, _)| name == "content"));
    }

    #[test]
    fn date_pairs_combine_into_one_timestamp() {
        let model = post_model();
        let form: HashMap<String, String> = [
            ("created_date".to_string(), "2020-01-01".to_string()),
            ("created_time".to_string(), "10:00".to_string()),
        ]
        .into();
        let assigned = collect_assignments(&model, &form);
        assert_eq!(assigned, vec![("created".to_string(), json!("2020-01-01 10:00"))]);
    }

    #[test]
    fn date_without_time_stands_alone() {
        assert_eq!(combine_date_time("2020-01-01", None), "2020-01-01");
        assert_eq!(combine_date_time("2020-01-01", Some("")), "2020-01-01");
    }

    #[tokio::test]
    async fn render_merges_locals_and_context() {
        let mut tera = tera::Tera::default();
        tera.add_raw_template("post/index.html", "{{ title }}: {{ objects | length }}")
            .unwrap();
        let state = test_state(tera);
        let mut ctx = ResourceContext::new(post_model());
        ctx.objects = Some(vec![json!({"title": "a"}), json!({"title": "b"})]);
        let Html(body) = render(&state, &ctx, "post/index.html").unwrap();
        assert_eq!(body, "Test App: 2");
    }

    #[tokio::test]
    async fn render_exposes_model_name_unless_a_local_shadows_it() {
        let mut tera = tera::Tera::default();
        tera.add_raw_template("post/show.html", "{{ model }}").unwrap();
        let state = test_state(tera);
        let ctx = ResourceContext::new(post_model());
        let Html(body) = render(&state, &ctx, "post/show.html").unwrap();
        assert_eq!(body, "post");

        let mut tera = tera::Tera::default();
        tera.add_raw_template("post/show.html", "{{ model }}").unwrap();
        let mut state = test_state(tera);
        let mut locals = serde_json::Map::new();
        locals.insert("model".into(), json!("shadowed"));
        state.locals = Arc::new(locals);
        let Html(body) = render(&state, &ctx, "post/show.html").unwrap();
        assert_eq!(body, "shadowed");
    }

    #[tokio::test]
    async fn render_missing_template_is_an_error() {
        let state = test_state(tera::Tera::default());
        let ctx = ResourceContext::new(post_model());
        assert!(render(&state, &ctx, "post/index.html").is_err());
    }

    #[test]
    fn redirect_optionally_appends_id() {
        use axum::response::IntoResponse;
        let plain = redirect("/posts", None).into_response();
        assert_eq!(plain.headers()["location"], "/posts");
        let with_id = redirect("/posts", Some("42")).into_response();
        assert_eq!(with_id.headers()["location"], "/posts/42");
    }
}
