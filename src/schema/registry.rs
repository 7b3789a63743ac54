//! Model factory and explicit schema registry.
//!
//! The registry replaces ambient process-global state: it is created by the
//! application owner and handed by reference to everything that needs to map
//! a model name back to its field list.

use crate::error::SchemaError;
use crate::schema::types::{FieldInfo, FieldSpec, FieldType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A registered model: name, ordered resolved fields, lookup by field name.
/// The name doubles as table name, route prefix stem, and template directory.
#[derive(Debug)]
pub struct ResolvedModel {
    pub name: String,
    pub fields: Vec<FieldInfo>,
}

impl ResolvedModel {
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields eligible for mass-assignment on save, in declaration order.
    pub fn assignable_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.assignable())
    }

    /// Template path for one of the four generated views.
    pub fn template(&self, view: &str) -> String {
        format!("{}/{}.html", self.name, view)
    }
}

/// Shared handle to a registered model. Cheap to clone into router state.
pub type ModelHandle = Arc<ResolvedModel>;

/// Explicit registry of resolved models, keyed by model name.
/// Re-registering a name replaces the previous entry (last wins).
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    models: Arc<RwLock<HashMap<String, ModelHandle>>>,
}

impl SchemaRegistry {
    pub fn new() -> SchemaRegistry {
        SchemaRegistry::default()
    }

    /// Define a model from a JSON field map. Each value is a friendly type
    /// name, an options object (`{"type": ..., "required": ..., "default":
    /// ..., "protected": ...}`), or an opaque value stored as JSONB.
    ///
    /// ```
    /// # use prefab::SchemaRegistry;
    /// # use serde_json::json;
    /// let registry = SchemaRegistry::new();
    /// let post = registry.model("post", json!({
    ///     "title": "string",
    ///     "content": {"type": "markdown", "required": true},
    ///     "created": "date",
    /// })).unwrap();
    /// assert_eq!(post.fields.len(), 3);
    /// ```
    pub fn model(&self, name: &str, fields: Value) -> Result<ModelHandle, SchemaError> {
        let Value::Object(map) = fields else {
            return Err(SchemaError::NotAnObject(name.to_string()));
        };
        if map.is_empty() {
            return Err(SchemaError::EmptyFieldMap(name.to_string()));
        }

        let mut resolved = Vec::with_capacity(map.len());
        for (field_name, raw) in map {
            let spec: FieldSpec = serde_json::from_value(raw)
                .map_err(|_| SchemaError::InvalidOptions(field_name.clone()))?;
            let info = match spec {
                FieldSpec::Name(type_name) => FieldInfo {
                    name: field_name.clone(),
                    field_type: FieldType::from_name(&field_name, &type_name)?,
                    required: false,
                    default: None,
                    protected: false,
                },
                FieldSpec::Options { type_name, required, default, protected } => FieldInfo {
                    name: field_name.clone(),
                    field_type: FieldType::from_name(&field_name, &type_name)?,
                    required,
                    default,
                    protected,
                },
                FieldSpec::Opaque(_) => FieldInfo {
                    name: field_name.clone(),
                    field_type: FieldType::Object,
                    required: false,
                    default: None,
                    protected: false,
                },
            };
            resolved.push(info);
        }

        let handle: ModelHandle = Arc::new(ResolvedModel {
            name: name.to_string(),
            fields: resolved,
        });
        self.models
            .write()
            .expect("schema registry lock poisoned")
            .insert(name.to_string(), handle.clone());
        tracing::debug!(model = name, fields = handle.fields.len(), "model registered");
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<ModelHandle> {
        self.models
            .read()
            .expect("schema registry lock poisoned")
            .get(name)
            .cloned()
    }
}
