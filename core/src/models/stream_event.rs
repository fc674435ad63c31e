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

use serde::Serialize;

use super::Frame;

#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize)]
pub enum LoadingState {
    #[default]
    NotStarted,
    Loading,
    Streaming,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventErrorData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventError {
    pub message: String,
    pub data: EventErrorData,
}

/// A notification delivered by the host's live channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamEvent {
    pub state: LoadingState,
    pub data: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EventError>,
}

impl StreamEvent {
    pub fn streaming(data: Vec<Frame>) -> Self {
        StreamEvent {
            state: LoadingState::Streaming,
            data,
            key: None,
            error: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.state == LoadingState::Streaming
    }

    /// Channel id carried by the first frame's metadata.
    pub fn channel(&self) -> Option<&str> {
        self.data.first()?.channel()
    }
}
