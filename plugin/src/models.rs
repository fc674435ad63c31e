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

//! Request and response types exchanged with the dashboard host's backend
//! plugin runtime.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ws_datasource_core::models::{Frame, TimeRange};

/// Settings of one configured datasource instance. `json_data` holds the
/// plain settings, `decrypted_secure_json_data` the secrets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInstanceSettings {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub json_data: Value,
    #[serde(default)]
    pub decrypted_secure_json_data: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginContext {
    #[serde(default)]
    pub org_id: i64,
    #[serde(default)]
    pub plugin_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_instance_settings: Option<DataSourceInstanceSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    pub ref_id: String,
    #[serde(default)]
    pub query_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub max_data_points: i64,
    #[serde(default)]
    pub interval_ms: i64,
    /// The query model as the editor saved it.
    #[serde(default)]
    pub json: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDataRequest {
    #[serde(default)]
    pub plugin_context: PluginContext,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub queries: Vec<DataQuery>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DataResponse {
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DataResponse {
    pub fn error(message: impl Into<String>) -> Self {
        DataResponse {
            frames: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// One response per query, keyed by ref id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryDataResponse {
    pub responses: BTreeMap<String, DataResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckHealthRequest {
    #[serde(default)]
    pub plugin_context: PluginContext,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Ok,
    Error,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckHealthResult {
    pub status: HealthStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_details: Option<Value>,
}

impl CheckHealthResult {
    pub fn ok(message: impl Into<String>) -> Self {
        CheckHealthResult {
            status: HealthStatus::Ok,
            message: message.into(),
            json_details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CheckHealthResult {
            status: HealthStatus::Error,
            message: message.into(),
            json_details: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeStreamRequest {
    #[serde(default)]
    pub plugin_context: PluginContext,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscribeStreamStatus {
    Ok,
    NotFound,
    PermissionDenied,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeStreamResponse {
    pub status: SubscribeStreamStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_data: Option<Frame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishStreamRequest {
    #[serde(default)]
    pub plugin_context: PluginContext,
    pub path: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PublishStreamStatus {
    Ok,
    NotFound,
    PermissionDenied,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishStreamResponse {
    pub status: PublishStreamStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Opens a live channel. `path` is the channel path below `ds/{uid}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStreamRequest {
    #[serde(default)]
    pub plugin_context: PluginContext,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
