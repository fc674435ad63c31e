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

use std::{collections::HashMap, sync::Arc};

use crate::{interface::ValueCoercion, models::ValueType};

/// Coercion strategies keyed by the value type they produce.
pub struct ValueTypeRegistry {
    coercions: HashMap<ValueType, Arc<dyn ValueCoercion>>,
}

impl Default for ValueTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTypeRegistry {
    pub fn new() -> Self {
        ValueTypeRegistry {
            coercions: HashMap::new(),
        }
    }

    /// Registers a strategy, replacing any previous one for the same type
    pub fn register(&mut self, coercion: Arc<dyn ValueCoercion>) {
        let value_type = coercion.value_type();
        if self.coercions.insert(value_type, coercion).is_some() {
            log::debug!("Replaced coercion strategy for value type {}", value_type);
        }
    }

    pub fn get(&self, value_type: ValueType) -> Option<Arc<dyn ValueCoercion>> {
        self.coercions.get(&value_type).cloned()
    }

    pub fn count(&self) -> usize {
        self.coercions.len()
    }
}
