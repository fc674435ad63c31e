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

use serde::{Deserialize, Serialize};

use super::ValueType;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl DataSourceRef {
    pub fn with_uid(uid: impl Into<String>) -> Self {
        DataSourceRef {
            uid: Some(uid.into()),
            kind: None,
        }
    }
}

/// Declared type of an extracted field. `Auto` defers to type detection.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Auto,
    String,
    Number,
    Time,
    Boolean,
}

impl FieldType {
    pub fn declared(&self) -> Option<ValueType> {
        match self {
            FieldType::Auto => None,
            FieldType::String => Some(ValueType::String),
            FieldType::Number => Some(ValueType::Number),
            FieldType::Time => Some(ValueType::Time),
            FieldType::Boolean => Some(ValueType::Boolean),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLanguage {
    #[default]
    JsonPath,
}

/// One extraction rule of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub json_path: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub language: QueryLanguage,
}

impl QueryField {
    pub fn new(json_path: impl Into<String>) -> Self {
        QueryField {
            json_path: json_path.into(),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn typed(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// The declared value type, `None` when the field asks for detection.
    pub fn declared_type(&self) -> Option<ValueType> {
        self.field_type.and_then(|t| t.declared())
    }
}

/// A dashboard request for one live channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub with_streaming: bool,
    #[serde(default)]
    pub fields: Vec<QueryField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
}

impl Query {
    /// A query as the editor creates it: streaming on, one blank field.
    pub fn new(ref_id: impl Into<String>, datasource_uid: impl Into<String>) -> Self {
        Query {
            ref_id: ref_id.into(),
            path: None,
            with_streaming: true,
            fields: vec![QueryField::default()],
            datasource: Some(DataSourceRef::with_uid(datasource_uid)),
            hide: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<QueryField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.hide.unwrap_or(false)
    }

    pub fn datasource_uid(&self) -> Option<&str> {
        self.datasource.as_ref()?.uid.as_deref()
    }

    /// The configured path, `.` when blank.
    pub fn channel_path(&self) -> &str {
        match self.path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => ".",
        }
    }
}
