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

use std::{str::FromStr, sync::Arc};

use serde::Deserialize;
use serde_json::Value;
use ws_datasource_core::{
    interface::{
        ExtractError, FieldTypeDetector, FrameExtractor, FrameExtractorFactory,
        TransformSetupError,
    },
    macros::VariableReplacer,
    models::{
        ErrorAnnotation, ExtractorConfig, Field, FieldValue, Frame, Query, QueryField, ValueType,
    },
    value_types::ValueTypeRegistry,
};

use crate::{
    common::ErrorHandling,
    field_types::{default_registry, DefaultTypeDetector},
    jsonpath::JsonPathExpression,
};

#[cfg(test)]
mod tests;

/// Configuration for the JSONPath frame extractor.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JsonPathExtractorConfig {
    /// Column holding one serialized JSON document per row.
    #[serde(default = "default_data_column")]
    pub data_column: String,
    /// Column the server uses to report a failure on the channel.
    #[serde(default = "default_error_column")]
    pub error_column: String,
    /// How to handle values the field's type cannot represent.
    #[serde(default)]
    pub on_coercion_error: ErrorHandling,
}

fn default_data_column() -> String {
    "data".to_string()
}

fn default_error_column() -> String {
    "error".to_string()
}

impl Default for JsonPathExtractorConfig {
    fn default() -> Self {
        JsonPathExtractorConfig {
            data_column: default_data_column(),
            error_column: default_error_column(),
            on_coercion_error: ErrorHandling::default(),
        }
    }
}

/// Builds one typed column per query field out of the JSON rows of a frame.
pub struct JsonPathExtractor {
    name: String,
    config: JsonPathExtractorConfig,
    registry: ValueTypeRegistry,
    detector: Arc<dyn FieldTypeDetector>,
}

impl JsonPathExtractor {
    pub fn new(
        name: String,
        config: JsonPathExtractorConfig,
        registry: ValueTypeRegistry,
        detector: Arc<dyn FieldTypeDetector>,
    ) -> Self {
        JsonPathExtractor {
            name,
            config,
            registry,
            detector,
        }
    }

    /// Default coercions and type detection.
    pub fn with_config(name: &str, config: JsonPathExtractorConfig) -> Self {
        Self::new(
            name.to_string(),
            config,
            default_registry(),
            Arc::new(DefaultTypeDetector),
        )
    }

    /// The configured data column, else the first other string column.
    fn payload_column<'f>(&self, frame: &'f Frame) -> Option<&'f Field> {
        frame.field(&self.config.data_column).or_else(|| {
            frame.fields.iter().find(|f| {
                f.value_type == ValueType::String && f.name != self.config.error_column
            })
        })
    }

    fn parse_payloads(&self, frame: &Frame) -> Result<Vec<Value>, ExtractError> {
        let column = match self.payload_column(frame) {
            Some(column) => column,
            None => {
                log::debug!(
                    "[{}] Frame '{}' has no payload column",
                    self.name,
                    frame.name
                );
                return Ok(Vec::new());
            }
        };

        column
            .values
            .iter()
            .filter_map(|v| match v {
                FieldValue::Null => None,
                FieldValue::String(text) => Some(text.as_str()),
                _ => None,
            })
            .map(|text| {
                serde_json::from_str::<Value>(text).map_err(|source| {
                    ExtractError::MalformedPayload {
                        payload: text.to_string(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// The first message of the error column, if the frame carries one.
    fn upstream_error(&self, frame: &Frame) -> Option<String> {
        let column = frame.field(&self.config.error_column)?;
        let first = column.values.first()?;
        Some(match first {
            FieldValue::String(s) => s.clone(),
            FieldValue::Null => "unknown error".to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Time(t) => t.to_rfc3339(),
        })
    }

    fn extract_field(
        &self,
        field: &QueryField,
        payloads: &[Value],
        replacer: &VariableReplacer<'_>,
    ) -> Result<Field, ExtractError> {
        let expression = replacer.replace(&field.json_path);
        let path = JsonPathExpression::from_str(&expression).map_err(|reason| {
            ExtractError::InvalidPath {
                expression: expression.clone(),
                reason,
            }
        })?;

        let values: Vec<Value> = payloads.iter().flat_map(|p| path.execute(p)).collect();

        let value_type = field
            .declared_type()
            .unwrap_or_else(|| self.detector.detect(&values));

        let coercion = self
            .registry
            .get(value_type)
            .ok_or(ExtractError::UnknownValueType(value_type))?;

        let name = field
            .name
            .as_deref()
            .map(|n| replacer.replace(n))
            .filter(|n| !n.trim().is_empty())
            .or_else(|| path.last_segment())
            .unwrap_or_else(|| expression.clone());

        let values = values
            .iter()
            .map(|raw| match coercion.coerce(raw) {
                Ok(value) => Ok(value),
                Err(source) => match self.config.on_coercion_error {
                    ErrorHandling::Null => {
                        log::debug!("[{}] Field '{}': {}, using null", self.name, name, source);
                        Ok(FieldValue::Null)
                    }
                    ErrorHandling::Fail => Err(ExtractError::Coercion {
                        field: name.clone(),
                        source,
                    }),
                },
            })
            .collect::<Result<Vec<FieldValue>, ExtractError>>()?;

        Ok(Field::new(name, value_type, values))
    }
}

impl FrameExtractor for JsonPathExtractor {
    fn extract(
        &self,
        source: &Frame,
        query: &Query,
        replacer: &VariableReplacer<'_>,
    ) -> Result<Frame, ExtractError> {
        let mut frame = source.clone();
        frame.ref_id = Some(query.ref_id.clone());

        if query.fields.is_empty() {
            return Ok(frame);
        }

        let upstream_error = self.upstream_error(source);
        let payloads = match upstream_error {
            Some(_) => Vec::new(),
            None => self.parse_payloads(source)?,
        };

        frame.fields = query
            .fields
            .iter()
            .filter(|f| !f.json_path.trim().is_empty())
            .map(|f| self.extract_field(f, &payloads, replacer))
            .collect::<Result<Vec<Field>, ExtractError>>()?;

        if let Some(error) = upstream_error {
            log::debug!(
                "[{}] Query {} received an upstream error: {}",
                self.name,
                query.ref_id,
                error
            );
            frame.meta_mut().custom = Some(ErrorAnnotation {
                error,
                ref_id: query.ref_id.clone(),
            });
        }

        Ok(frame)
    }
}

pub struct JsonPathExtractorFactory {}

impl JsonPathExtractorFactory {
    pub fn new() -> Self {
        JsonPathExtractorFactory {}
    }
}

impl Default for JsonPathExtractorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameExtractorFactory for JsonPathExtractorFactory {
    fn name(&self) -> String {
        "jsonpath".to_string()
    }

    fn create(
        &self,
        config: &ExtractorConfig,
    ) -> Result<Arc<dyn FrameExtractor>, TransformSetupError> {
        if config.kind.as_ref() != self.name() {
            return Err(TransformSetupError::InvalidConfiguration(format!(
                "[{}] Extractor kind '{}' is not handled by the {} factory",
                config.name,
                config.kind,
                self.name()
            )));
        }

        let extractor_config: JsonPathExtractorConfig =
            match serde_json::from_value(Value::Object(config.config.clone())) {
                Ok(cfg) => cfg,
                Err(e) => {
                    return Err(TransformSetupError::InvalidConfiguration(format!(
                        "[{}] Invalid jsonpath extractor configuration: {}",
                        config.name, e
                    )));
                }
            };

        if extractor_config.data_column.is_empty() {
            return Err(TransformSetupError::InvalidConfiguration(format!(
                "[{}] 'data_column' cannot be empty",
                config.name
            )));
        }

        if extractor_config.error_column.is_empty() {
            return Err(TransformSetupError::InvalidConfiguration(format!(
                "[{}] 'error_column' cannot be empty",
                config.name
            )));
        }

        if extractor_config.data_column == extractor_config.error_column {
            return Err(TransformSetupError::InvalidConfiguration(format!(
                "[{}] 'data_column' and 'error_column' must differ",
                config.name
            )));
        }

        log::debug!(
            "[{}] Creating JSONPath extractor with config: {:?}",
            config.name,
            extractor_config
        );

        Ok(Arc::new(JsonPathExtractor::with_config(
            &config.name,
            extractor_config,
        )))
    }
}
