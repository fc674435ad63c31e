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

use serde_json::Value;
use thiserror::Error;

use crate::models::{FieldValue, ValueType};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("Cannot parse {value} as {target}")]
    Unparseable { value: String, target: ValueType },
}

impl CoercionError {
    pub fn unparseable(value: &Value, target: ValueType) -> Self {
        CoercionError::Unparseable {
            value: value.to_string(),
            target,
        }
    }
}

/// Parsing policy for one value type.
pub trait ValueCoercion: Send + Sync {
    fn value_type(&self) -> ValueType;

    /// Converts a raw JSON value. `null` always maps to [`FieldValue::Null`].
    fn coerce(&self, value: &Value) -> Result<FieldValue, CoercionError>;
}

/// Picks a value type for a field declared as `auto`.
pub trait FieldTypeDetector: Send + Sync {
    fn detect(&self, values: &[Value]) -> ValueType;
}
