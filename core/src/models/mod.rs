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

use std::sync::Arc;

use serde_json::{Map, Value};

mod frame;
mod query;
mod request;
mod stream_event;
mod time_range;

pub use frame::{ErrorAnnotation, Field, FieldValue, Frame, FrameMeta, ValueType};
pub use query::{DataSourceRef, FieldType, Query, QueryField, QueryLanguage};
pub use request::{DataQueryRequest, ScopedVar, ScopedVars};
pub use stream_event::{EventError, EventErrorData, LoadingState, StreamEvent};
pub use time_range::TimeRange;

/// Named configuration handed to a frame extractor factory.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub kind: Arc<str>,
    pub name: Arc<str>,
    pub config: Map<String, Value>,
}

impl ExtractorConfig {
    pub fn new(kind: &str, name: &str, config: Map<String, Value>) -> Self {
        ExtractorConfig {
            kind: Arc::from(kind),
            name: Arc::from(name),
            config,
        }
    }
}
