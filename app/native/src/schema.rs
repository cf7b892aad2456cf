//! JSON Schema for the configuration file.

use schemars::schema_for;

use crate::config::TetherConfig;

/// Generates the configuration JSON Schema as a pretty-printed string.
#[must_use]
pub fn generate_schema_json() -> String {
    let schema = schema_for!(TetherConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Returns the schema for `tether schema`.
#[must_use]
pub fn print_schema() -> String { generate_schema_json() }
