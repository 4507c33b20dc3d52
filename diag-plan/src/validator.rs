//! Structural validation of plan files against `docs/plan-schema/schema.json`.

use serde_json::Value;
use std::sync::LazyLock;

const SCHEMA_JSON: &str = include_str!("../../docs/plan-schema/schema.json");

static PLAN_VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(SCHEMA_JSON).expect("embedded schema is valid JSON");
    jsonschema::draft202012::new(&schema).expect("embedded schema is a valid JSON Schema")
});

/// A validation error with a JSON path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validate a plan YAML string against the embedded JSON Schema.
///
/// Errors are ordered by instance path so output is stable across runs.
pub fn validate_plan_schema(yaml_text: &str) -> Result<(), Vec<SchemaError>> {
    let instance: Value = serde_yaml::from_str(yaml_text).map_err(|e| {
        vec![SchemaError {
            path: String::new(),
            message: format!("YAML parse error: {e}"),
        }]
    })?;

    let mut errors: Vec<SchemaError> = PLAN_VALIDATOR
        .iter_errors(&instance)
        .map(|e| SchemaError {
            path: e.instance_path().to_string(),
            message: e.to_string(),
        })
        .collect();
    errors.sort_by(|a, b| a.path.cmp(&b.path));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
