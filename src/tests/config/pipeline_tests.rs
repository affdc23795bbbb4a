//! Tests for pipeline configuration parsing.

use serde_json::json;

use crate::config::{DEFAULT_MAX_RECORDS, FilterConfig, PipelineConfig, ReaderConfig};
use crate::reader::{Charset, DEFAULT_INITIAL_CAPACITY};

#[test]
fn empty_config_uses_defaults() {
    let config = PipelineConfig::from_json_str("{}").unwrap();

    assert!(config.filters.is_empty());
    assert!(config.error_policy.is_none());
    assert_eq!(config.reader.initial_capacity, DEFAULT_INITIAL_CAPACITY);
    assert_eq!(config.reader.charset, Charset::Utf8);
    assert!(config.reader.auto_flush);
    assert!(config.max_records.unwrap_or(DEFAULT_MAX_RECORDS) > 0);
}

#[test]
fn filter_arguments_are_flattened() {
    let config = PipelineConfig::from_json_str(
        r#"{
            "reader": { "charset": "latin1", "auto_flush": false },
            "error_policy": "fast_fail",
            "max_records": 50,
            "metadata": { "hostname": "web-1" },
            "filters": [
                { "type": "drop", "name": "no-debug", "contains": "DEBUG" },
                { "type": "json", "ignore_failure": true }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(config.reader.charset, Charset::Latin1);
    assert!(!config.reader.auto_flush);
    assert_eq!(config.error_policy.as_deref(), Some("fast_fail"));
    assert_eq!(config.max_records, Some(50));
    assert_eq!(config.metadata.get("hostname").map(String::as_str), Some("web-1"));

    let drop = &config.filters[0];
    assert_eq!(drop.kind, "drop");
    assert_eq!(drop.stage_name(), "no-debug");
    assert_eq!(drop.args.get("contains"), Some(&json!("DEBUG")));
    assert!(!drop.args.contains_key("type"));
    assert!(config.filters[1].ignore_failure);
    assert_eq!(config.filters[1].stage_name(), "json");
}

#[test]
fn builders_compose() {
    let config = PipelineConfig::new()
        .with_reader(ReaderConfig::default().with_initial_capacity(64))
        .add_filter(FilterConfig::new("split").with_arg("separator", ","))
        .with_error_policy("accumulate")
        .with_metadata("env", "prod");

    assert_eq!(config.reader.initial_capacity, 64);
    assert_eq!(config.filters.len(), 1);
    assert_eq!(config.metadata.len(), 1);
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_pipeline() {
    let config = PipelineConfig::from_yaml_str(
        r#"
reader:
  initial_capacity: 128
  charset: utf-8-lossy
filters:
  - type: multi_row
    pattern: " "
  - type: group_row
    fields: [thread]
    max_buffered_records: 10
"#,
    )
    .unwrap();

    assert_eq!(config.reader.initial_capacity, 128);
    assert_eq!(config.reader.charset, Charset::Utf8Lossy);
    assert_eq!(config.filters[1].kind, "group_row");
    assert_eq!(config.filters[1].args.get("max_buffered_records"), Some(&json!(10)));
}

#[cfg(feature = "toml")]
#[test]
fn toml_pipeline() {
    let config = PipelineConfig::from_toml_str(
        r#"
error_policy = "accumulate"

[reader]
auto_flush = false

[[filters]]
type = "rename"
field = "message"
target = "line"
"#,
    )
    .unwrap();

    assert!(!config.reader.auto_flush);
    assert_eq!(config.filters[0].args.get("target"), Some(&json!("line")));
}
