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

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Concrete type of a frame column.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Time,
    Boolean,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Time => "time",
            ValueType::Boolean => "boolean",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell of a frame column. `Null` is the sentinel for absent or
/// unparseable values.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    Time(DateTime<Utc>),
    String(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Time(value)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub values: Vec<FieldValue>,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, value_type: ValueType, values: Vec<FieldValue>) -> Self {
        Field {
            name: name.into(),
            value_type,
            values,
            config: Map::new(),
        }
    }

    pub fn strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Field::new(
            name,
            ValueType::String,
            values
                .into_iter()
                .map(|v| FieldValue::String(v.into()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Error reported by the upstream server for a channel, attached to the
/// frame of the query that requested it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnnotation {
    pub error: String,
    pub ref_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<ErrorAnnotation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FrameMeta {
    pub fn with_channel(channel: impl Into<String>) -> Self {
        FrameMeta {
            channel: Some(channel.into()),
            ..Default::default()
        }
    }
}

/// Tabular unit exchanged with the host. Columns are ordered; each column is
/// internally uniform in length, but columns need not match each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FrameMeta>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Frame {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_meta(mut self, meta: FrameMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn channel(&self) -> Option<&str> {
        self.meta.as_ref()?.channel.as_deref()
    }

    pub fn error_annotation(&self) -> Option<&ErrorAnnotation> {
        self.meta.as_ref()?.custom.as_ref()
    }

    pub fn meta_mut(&mut self) -> &mut FrameMeta {
        self.meta.get_or_insert_with(FrameMeta::default)
    }
}
