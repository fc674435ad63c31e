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

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Query, TimeRange};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedVar {
    #[serde(default)]
    pub text: Value,
    #[serde(default)]
    pub value: Value,
}

impl ScopedVar {
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        ScopedVar {
            text: value.clone(),
            value,
        }
    }
}

pub type ScopedVars = HashMap<String, ScopedVar>;

/// A panel's request as dispatched by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQueryRequest {
    pub targets: Vec<Query>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeRange>,
    #[serde(default)]
    pub scoped_vars: ScopedVars,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_id: Option<i64>,
}
