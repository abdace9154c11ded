//! Result schema version and JSON Schema document.

/// Current schema version for all JSON outputs.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// JSON Schema document describing [`crate::AnalyticsResult`].
pub fn analytics_result_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(crate::AnalyticsResult);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}
