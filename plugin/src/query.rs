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

use serde::Deserialize;
use serde_json::Value;
use ws_datasource_core::models::{Frame, FrameMeta};

pub const RESPONSE_FRAME: &str = "response";

/// The part of a saved query the backend cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryModel {
    #[serde(default)]
    pub with_streaming: bool,
    #[serde(default)]
    pub path: String,
}

impl QueryModel {
    pub fn from_json(json: &Value) -> Result<Self, serde_json::Error> {
        QueryModel::deserialize(json)
    }

    /// The channel path, `.` when blank.
    pub fn channel_path(&self) -> &str {
        if self.path.is_empty() {
            "."
        } else {
            &self.path
        }
    }
}

/// `ds/{uid}/{path}`, the live channel a streaming query subscribes to.
pub fn live_channel(uid: &str, path: &str) -> String {
    format!("ds/{uid}/{path}")
}

/// The frame a query gets back: empty, carrying its channel when streaming.
pub fn response_frame(uid: &str, model: &QueryModel) -> Frame {
    let frame = Frame::new(RESPONSE_FRAME);
    if model.with_streaming {
        frame.with_meta(FrameMeta::with_channel(live_channel(uid, model.channel_path())))
    } else {
        frame
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_model_defaults() {
        let model = QueryModel::from_json(&json!({ "refId": "A", "fields": [] })).unwrap();
        assert_eq!(model, QueryModel::default());
        assert_eq!(model.channel_path(), ".");
    }

    #[test]
    fn test_streaming_frame_has_channel() {
        let model =
            QueryModel::from_json(&json!({ "withStreaming": true, "path": "devices" })).unwrap();
        let frame = response_frame("abc", &model);
        assert_eq!(frame.name, "response");
        assert_eq!(frame.channel(), Some("ds/abc/devices"));
    }

    #[test]
    fn test_blank_path_uses_dot() {
        let model = QueryModel {
            with_streaming: true,
            path: String::new(),
        };
        assert_eq!(response_frame("abc", &model).channel(), Some("ds/abc/."));
    }

    #[test]
    fn test_non_streaming_frame_has_no_meta() {
        let model = QueryModel::from_json(&json!({ "path": "devices" })).unwrap();
        assert!(response_frame("abc", &model).meta.is_none());
    }

    #[test]
    fn test_invalid_model() {
        assert!(QueryModel::from_json(&json!({ "withStreaming": "yes" })).is_err());
    }
}
