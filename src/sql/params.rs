//! Convert serde_json::Value to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value bound to a PostgreSQL query. Everything scalar binds as text and
/// relies on the builder's SQL casts; arrays and objects bind as JSONB.
#[derive(Clone, Debug)]
pub enum PgBindValue {
    Null,
    Text(String),
    Json(Value),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> PgBindValue {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Text(b.to_string()),
            Value::Number(n) => PgBindValue::Text(n.to_string()),
            Value::String(s) => PgBindValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<&str> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Json(v) => <serde_json::Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_bind_as_text() {
        assert!(matches!(PgBindValue::from_json(&json!(42)), PgBindValue::Text(s) if s == "42"));
        assert!(matches!(PgBindValue::from_json(&json!(true)), PgBindValue::Text(s) if s == "true"));
        assert!(matches!(PgBindValue::from_json(&json!("a")), PgBindValue::Text(s) if s == "a"));
        assert!(matches!(PgBindValue::from_json(&Value::Null), PgBindValue::Null));
    }

    #[test]
    fn composites_bind_as_json() {
        assert!(matches!(PgBindValue::from_json(&json!({"a": 1})), PgBindValue::Json(_)));
        assert!(matches!(PgBindValue::from_json(&json!([1, 2])), PgBindValue::Json(_)));
    }
}
