//! DDL for model tables, derived from resolved schemas.

use crate::error::AppError;
use crate::schema::ResolvedModel;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// One table per model: `id UUID PRIMARY KEY DEFAULT gen_random_uuid()` plus
/// a typed column per declared field. Idempotent (IF NOT EXISTS); changing an
/// existing table's shape is out of scope.
pub async fn ensure_model_table(pool: &PgPool, model: &ResolvedModel) -> Result<(), AppError> {
    let ddl = model_table_ddl(model);
    tracing::debug!(sql = %ddl, "migrate");
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

pub(crate) fn model_table_ddl(model: &ResolvedModel) -> String {
    let mut col_defs = vec![format!(
        "{} UUID PRIMARY KEY DEFAULT gen_random_uuid()",
        quote("id")
    )];
    for f in &model.fields {
        let mut def = format!("{} {}", quote(&f.name), f.field_type.pg_type());
        if f.required {
            def.push_str(" NOT NULL");
        }
        if let Some(ref d) = f.default {
            def.push_str(" DEFAULT ");
            def.push_str(&format!("'{}'", d.replace('\'', "''")));
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(&model.name),
        col_defs.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use serde_json::json;

    #[test]
    fn ddl_has_one_column_per_field_plus_id() {
        let model = SchemaRegistry::new()
            .model(
                "post",
                json!({
                    "title": {"type": "string", "required": true},
                    "content": "markdown",
                    "views": "integer",
                    "created": "date",
                }),
            )
            .unwrap();
        let ddl = model_table_ddl(&model);
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS \"post\" (\
             \"id\" UUID PRIMARY KEY DEFAULT gen_random_uuid(), \
             \"title\" text NOT NULL, \
             \"content\" text, \
             \"views\" bigint, \
             \"created\" timestamptz)"
        );
    }

    #[test]
    fn defaults_are_quoted_literals() {
        let model = SchemaRegistry::new()
            .model("page", json!({"status": {"type": "string", "default": "draft"}}))
            .unwrap();
        assert!(model_table_ddl(&model).contains("\"status\" text DEFAULT 'draft'"));
    }
}
