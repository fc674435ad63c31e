// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # JSONPath Extractor Tests

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use ws_datasource_core::{
    interface::{
        ExtractError, FrameExtractor, FrameExtractorFactory, IdentityTemplateSrv, TemplateSrv,
        TransformSetupError,
    },
    macros::VariableReplacer,
    models::{
        ErrorAnnotation, ExtractorConfig, Field, FieldType, FieldValue, Frame, FrameMeta, Query,
        QueryField, ScopedVar, ScopedVars, TimeRange, ValueType,
    },
};

use super::{JsonPathExtractor, JsonPathExtractorConfig, JsonPathExtractorFactory};
use crate::common::ErrorHandling;
#[cfg(feature = "template")]
use crate::template::ScopedVarsTemplateSrv;

// --- Test Helpers ---

fn extractor() -> JsonPathExtractor {
    JsonPathExtractor::with_config("test_extract", JsonPathExtractorConfig::default())
}

fn create_config(config_json: Value) -> ExtractorConfig {
    ExtractorConfig::new(
        "jsonpath",
        "test_extract",
        config_json
            .as_object()
            .expect("Config JSON must be an object")
            .clone(),
    )
}

fn data_frame(rows: &[&str]) -> Frame {
    Frame::new("response")
        .with_field(Field::new(
            "time",
            ValueType::Time,
            rows.iter().map(|_| FieldValue::Null).collect(),
        ))
        .with_field(Field::strings("data", rows.iter().copied()))
        .with_meta(FrameMeta::with_channel("ds/abc/devices"))
}

fn query(fields: Vec<QueryField>) -> Query {
    Query::new("A", "abc").with_fields(fields)
}

fn extract(source: &Frame, query: &Query) -> Result<Frame, ExtractError> {
    let vars = ScopedVars::new();
    let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
    extractor().extract(source, query, &replacer)
}

fn strings(values: &[&str]) -> Vec<FieldValue> {
    values.iter().map(|v| FieldValue::from(*v)).collect()
}

// --- Test Modules ---

mod shape {
    use super::*;

    #[test]
    fn test_no_fields_is_identity() {
        let source = data_frame(&[r#"{"a":1}"#]);
        let result = extract(&source, &query(vec![])).expect("extract failed");

        assert_eq!(result.ref_id.as_deref(), Some("A"));
        assert_eq!(result.fields, source.fields);
        assert_eq!(result.meta, source.meta);
    }

    #[test]
    fn test_blank_paths_are_skipped() {
        let source = data_frame(&[r#"{"a":1}"#]);
        let q = query(vec![QueryField::default(), QueryField::new("$.a")]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields.len(), 1);
        assert_eq!(result.fields[0].name, "a");
    }

    #[test]
    fn test_metadata_is_preserved() {
        let source = data_frame(&[r#"{"a":1}"#]);
        let result =
            extract(&source, &query(vec![QueryField::new("$.a")])).expect("extract failed");

        assert_eq!(result.name, "response");
        assert_eq!(result.channel(), Some("ds/abc/devices"));
        assert!(result.error_annotation().is_none());
    }

    #[test]
    fn test_values_across_rows_and_matches() {
        let source = data_frame(&[
            r#"{"items":[{"name":"a"},{"name":"b"}]}"#,
            r#"{"items":[]}"#,
            r#"{"items":[{"name":"c"}]}"#,
        ]);
        let q = query(vec![QueryField::new("$.items[*].name")]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields[0].name, "name");
        assert_eq!(result.fields[0].values, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_columns_may_differ_in_length() {
        let source = data_frame(&[r#"{"a":1,"b":2}"#, r#"{"a":3}"#]);
        let q = query(vec![QueryField::new("$.a"), QueryField::new("$.b")]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields[0].len(), 2);
        assert_eq!(result.fields[1].len(), 1);
    }

    #[test]
    fn test_falls_back_to_first_string_column() {
        let source = Frame::new("response")
            .with_field(Field::strings("payload", vec![r#"{"v":"x"}"#]));
        let result =
            extract(&source, &query(vec![QueryField::new("$.v")])).expect("extract failed");

        assert_eq!(result.fields[0].values, strings(&["x"]));
    }

    #[test]
    fn test_no_payload_column_gives_empty_columns() {
        let source = Frame::new("response");
        let result =
            extract(&source, &query(vec![QueryField::new("$.v")])).expect("extract failed");

        assert_eq!(result.fields.len(), 1);
        assert!(result.fields[0].is_empty());
    }
}

mod naming {
    use super::*;

    #[test]
    fn test_explicit_name_wins() {
        let source = data_frame(&[r#"{"temp":20}"#]);
        let q = query(vec![QueryField::new("$.temp").named("Temperature")]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields[0].name, "Temperature");
    }

    #[test]
    fn test_blank_name_uses_last_segment() {
        let source = data_frame(&[r#"{"items":[{"name":"a"}]}"#]);
        let q = query(vec![QueryField::new("$.items[*].name").named("  ")]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields[0].name, "name");
    }

    #[cfg(feature = "template")]
    #[test]
    fn test_name_and_path_are_interpolated() {
        let source = data_frame(&[r#"{"sensor-1":{"temp":21.5}}"#]);
        let q = query(vec![QueryField::new("$['$device'].temp").named("$device temp")]);

        let mut vars = ScopedVars::new();
        vars.insert("device".to_string(), ScopedVar::new("sensor-1"));
        let srv = ScopedVarsTemplateSrv::new();
        let replacer = VariableReplacer::new(&srv as &dyn TemplateSrv, &vars, None);

        let result = extractor()
            .extract(&source, &q, &replacer)
            .expect("extract failed");

        assert_eq!(result.fields[0].name, "sensor-1 temp");
        assert_eq!(result.fields[0].values, vec![FieldValue::Number(21.5)]);
    }

    #[test]
    fn test_macros_in_name() {
        let source = data_frame(&[r#"{"v":1}"#]);
        let q = query(vec![QueryField::new("$.v").named("v since $__unixEpochFrom()")]);
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        );
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, Some(&range));

        let result = extractor()
            .extract(&source, &q, &replacer)
            .expect("extract failed");

        assert_eq!(result.fields[0].name, "v since 1704067200");
    }
}

mod typing {
    use super::*;

    #[test]
    fn test_declared_string() {
        let source = data_frame(&[r#"{"v":1}"#, r#"{"v":"x"}"#]);
        let q = query(vec![QueryField::new("$.v").typed(FieldType::String)]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields[0].value_type, ValueType::String);
        assert_eq!(result.fields[0].values, strings(&["1", "x"]));
    }

    #[test]
    fn test_detected_number() {
        let source = data_frame(&[r#"{"v":1}"#, r#"{"v":2.5}"#]);
        let result =
            extract(&source, &query(vec![QueryField::new("$.v")])).expect("extract failed");

        assert_eq!(result.fields[0].value_type, ValueType::Number);
        assert_eq!(
            result.fields[0].values,
            vec![FieldValue::Number(1.0), FieldValue::Number(2.5)]
        );
    }

    #[test]
    fn test_detected_time() {
        let source = data_frame(&[r#"{"ts":"2024-01-01T00:00:00Z"}"#]);
        let result =
            extract(&source, &query(vec![QueryField::new("$.ts")])).expect("extract failed");

        assert_eq!(result.fields[0].value_type, ValueType::Time);
        assert_eq!(
            result.fields[0].values,
            vec![FieldValue::Time(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())]
        );
    }

    #[test]
    fn test_auto_behaves_like_undeclared() {
        let source = data_frame(&[r#"{"ok":true}"#]);
        let q = query(vec![QueryField::new("$.ok").typed(FieldType::Auto)]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(result.fields[0].value_type, ValueType::Boolean);
    }

    #[test]
    fn test_unparseable_becomes_null() {
        let source = data_frame(&[r#"{"v":"12"}"#, r#"{"v":"abc"}"#]);
        let q = query(vec![QueryField::new("$.v").typed(FieldType::Number)]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(
            result.fields[0].values,
            vec![FieldValue::Number(12.0), FieldValue::Null]
        );
    }

    #[test]
    fn test_unparseable_fails_when_configured() {
        let extractor = JsonPathExtractor::with_config(
            "strict",
            JsonPathExtractorConfig {
                on_coercion_error: ErrorHandling::Fail,
                ..Default::default()
            },
        );
        let source = data_frame(&[r#"{"v":"abc"}"#]);
        let q = query(vec![QueryField::new("$.v").named("value").typed(FieldType::Number)]);
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);

        match extractor.extract(&source, &q, &replacer) {
            Err(ExtractError::Coercion { field, .. }) => assert_eq!(field, "value"),
            other => panic!("Expected coercion error, got {other:?}"),
        }
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_upstream_error_annotates_frame() {
        let source = Frame::new("error")
            .with_field(Field::strings("error", vec!["timeout"]))
            .with_meta(FrameMeta::with_channel("ds/abc/devices"));
        let q = query(vec![
            QueryField::new("$.v"),
            QueryField::new("$.w").typed(FieldType::Number),
        ]);
        let result = extract(&source, &q).expect("extract failed");

        assert_eq!(
            result.error_annotation(),
            Some(&ErrorAnnotation {
                error: "timeout".to_string(),
                ref_id: "A".to_string(),
            })
        );
        assert_eq!(result.fields.len(), 2);
        assert!(result.fields.iter().all(|f| f.is_empty()));
        assert_eq!(result.fields[0].value_type, ValueType::String);
        assert_eq!(result.fields[1].value_type, ValueType::Number);
        assert_eq!(result.channel(), Some("ds/abc/devices"));
    }

    #[test]
    fn test_upstream_error_skips_payload_parsing() {
        let source = data_frame(&["not json"]).with_field(Field::strings("error", vec!["boom"]));
        let result =
            extract(&source, &query(vec![QueryField::new("$.v")])).expect("extract failed");

        assert_eq!(
            result.error_annotation().map(|a| a.error.as_str()),
            Some("boom")
        );
    }

    #[test]
    fn test_empty_error_column_is_ignored() {
        let source = data_frame(&[r#"{"v":"x"}"#])
            .with_field(Field::strings("error", Vec::<String>::new()));
        let result =
            extract(&source, &query(vec![QueryField::new("$.v")])).expect("extract failed");

        assert!(result.error_annotation().is_none());
        assert_eq!(result.fields[0].values, strings(&["x"]));
    }

    #[test]
    fn test_malformed_payload() {
        let source = data_frame(&[r#"{"v":1}"#, "not json"]);
        match extract(&source, &query(vec![QueryField::new("$.v")])) {
            Err(e @ ExtractError::MalformedPayload { .. }) => {
                assert!(e.to_string().starts_with("Invalid JSON: not json. Error: "));
            }
            other => panic!("Expected malformed payload, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_payload_ignored_without_fields() {
        let source = data_frame(&["not json"]);
        assert!(extract(&source, &query(vec![])).is_ok());
    }

    #[test]
    fn test_invalid_path() {
        let source = data_frame(&[r#"{"v":1}"#]);
        match extract(&source, &query(vec![QueryField::new("$.[")])) {
            Err(ExtractError::InvalidPath { expression, .. }) => assert_eq!(expression, "$.["),
            other => panic!("Expected invalid path, got {other:?}"),
        }
    }
}

mod factory {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(JsonPathExtractorFactory::new().name(), "jsonpath");
    }

    #[test]
    fn test_defaults() {
        let factory = JsonPathExtractorFactory::new();
        let extractor = factory
            .create(&create_config(json!({})))
            .expect("create failed");

        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let result = extractor
            .extract(
                &data_frame(&[r#"{"v":"x"}"#]),
                &query(vec![QueryField::new("$.v")]),
                &replacer,
            )
            .expect("extract failed");
        assert_eq!(result.fields[0].values, strings(&["x"]));
    }

    #[test]
    fn test_custom_columns() {
        let factory = JsonPathExtractorFactory::new();
        let extractor = factory
            .create(&create_config(json!({
                "data_column": "payload",
                "error_column": "failure",
                "on_coercion_error": "fail"
            })))
            .expect("create failed");

        let source = Frame::new("response")
            .with_field(Field::strings("data", vec!["not json"]))
            .with_field(Field::strings("payload", vec![r#"{"v":"x"}"#]));
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let result = extractor
            .extract(&source, &query(vec![QueryField::new("$.v")]), &replacer)
            .expect("extract failed");
        assert_eq!(result.fields[0].values, strings(&["x"]));
    }

    fn assert_invalid(config: Value) {
        let factory = JsonPathExtractorFactory::new();
        assert!(matches!(
            factory.create(&create_config(config)),
            Err(TransformSetupError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_other_kind() {
        let factory = JsonPathExtractorFactory::new();
        let config = ExtractorConfig::new("jq", "test_extract", serde_json::Map::new());
        match factory.create(&config) {
            Err(TransformSetupError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("'jq'"), "unexpected message: {msg}");
            }
            Err(e) => panic!("Expected invalid configuration, got {e:?}"),
            Ok(_) => panic!("Expected invalid configuration for kind 'jq'"),
        }
    }

    #[test]
    fn test_invalid_configs() {
        assert_invalid(json!({ "data_column": "" }));
        assert_invalid(json!({ "error_column": "" }));
        assert_invalid(json!({ "data_column": "x", "error_column": "x" }));
        assert_invalid(json!({ "on_coercion_error": "explode" }));
        assert_invalid(json!({ "unknown": true }));
    }
}
