//! Bundled JSON Schema for deployment configs.
//!
//! The schema accepts every historical spelling the loader normalizes, so it
//! checks structure (required fields, types, palette ranges, non-empty
//! hostnames) without taking sides on naming. Running it before typed parsing
//! reports all structural violations in one error instead of serde's first.

use crate::error::{CatalogError, Result};
use jsonschema::JSONSchema;
use serde_json::{Value, json};
use std::sync::OnceLock;

const DEPLOYMENT_SCHEMA: &str = include_str!("../schema/deployment_config.schema.json");
const SCHEMA_VERSION_POINTER: &str = "/schema_version";

type CachedSchema = std::result::Result<SchemaLoadResult, String>;

static DEPLOYMENT_CONFIG_SCHEMA: OnceLock<CachedSchema> = OnceLock::new();
static CLOUD_LIST_SCHEMA: OnceLock<CachedSchema> = OnceLock::new();

/// Which document shape a source is validated as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SchemaRoot {
    /// A full deployment config.
    DeploymentConfig,
    /// A standalone `{ "clouds": [...] }` document.
    CloudList,
}

/// Result of loading and compiling the bundled schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

pub(crate) fn load_json_schema(root: SchemaRoot) -> Result<SchemaLoadResult> {
    let deployment: Value = serde_json::from_str(DEPLOYMENT_SCHEMA)
        .map_err(|err| CatalogError::malformed(format!("parsing bundled schema: {err}")))?;
    let schema_version = deployment
        .pointer(SCHEMA_VERSION_POINTER)
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::malformed("bundled schema missing schema_version"))?
        .to_string();

    let schema = match root {
        SchemaRoot::DeploymentConfig => deployment,
        SchemaRoot::CloudList => json!({
            "$schema": deployment.get("$schema").cloned().unwrap_or(Value::Null),
            "type": "object",
            "required": ["clouds"],
            "properties": {
                "clouds": { "type": "array", "items": { "$ref": "#/definitions/cloud" } }
            },
            "definitions": deployment.get("definitions").cloned().unwrap_or_else(|| json!({})),
        }),
    };

    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| CatalogError::malformed(format!("compiling bundled schema: {err}")))?;
    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

/// Compiled schema for `root`, built on first use and shared afterwards.
pub(crate) fn cached_schema(root: SchemaRoot) -> Result<&'static SchemaLoadResult> {
    let cell = match root {
        SchemaRoot::DeploymentConfig => &DEPLOYMENT_CONFIG_SCHEMA,
        SchemaRoot::CloudList => &CLOUD_LIST_SCHEMA,
    };
    cell.get_or_init(|| {
        load_json_schema(root).map_err(|err| match err {
            CatalogError::MalformedConfig(msg) => msg,
            other => other.to_string(),
        })
    })
    .as_ref()
    .map_err(|msg| CatalogError::malformed(msg.clone()))
}

/// Validate `value` against the bundled schema for `root`.
pub(crate) fn validate_against_schema(value: &Value, root: SchemaRoot, label: &str) -> Result<()> {
    let schema = cached_schema(root)?;
    tracing::debug!(
        source = label,
        schema_version = %schema.schema_version,
        ?root,
        "validating config against bundled schema"
    );
    if let Err(errors) = schema.compiled.validate(value) {
        let details = errors
            .map(|err| format!("at '{}': {}", err.instance_path, err))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(CatalogError::malformed(format!(
            "{label} failed schema validation:\n{details}"
        )));
    }
    Ok(())
}
