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

use thiserror::Error;

use crate::{
    interface::CoercionError,
    macros::VariableReplacer,
    models::{ExtractorConfig, Frame, Query, ValueType},
};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid JSON: {payload}. Error: {source}")]
    MalformedPayload {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSONPath '{expression}': {reason}")]
    InvalidPath { expression: String, reason: String },

    #[error("Field '{field}': {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error("No coercion registered for value type {0}")]
    UnknownValueType(ValueType),
}

#[derive(Error, Debug)]
pub enum TransformSetupError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Reshapes the raw frame delivered on a channel into the frame one query
/// asked for.
pub trait FrameExtractor: Send + Sync {
    fn extract(
        &self,
        source: &Frame,
        query: &Query,
        replacer: &VariableReplacer<'_>,
    ) -> Result<Frame, ExtractError>;
}

pub trait FrameExtractorFactory: Send + Sync {
    fn name(&self) -> String;
    fn create(
        &self,
        config: &ExtractorConfig,
    ) -> Result<Arc<dyn FrameExtractor>, TransformSetupError>;
}
