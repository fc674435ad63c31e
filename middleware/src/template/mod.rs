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

//! Dashboard variable interpolation for query paths and field expressions.
//!
//! Recognises `$name`, `${name}`, `${name:format}` and `[[name]]`. Unknown
//! variables, including the time-range macros, are left as written.

use regex::{Captures, Regex};
use serde_json::Value;
use ws_datasource_core::{
    interface::TemplateSrv,
    models::{ScopedVar, ScopedVars},
};

#[cfg(test)]
mod tests;

const VARIABLE_PATTERN: &str =
    r"\$(\w+)|\$\{(\w+)(?::([^}]+))?\}|\[\[(\w+)(?::(\w+))?\]\]";

pub struct ScopedVarsTemplateSrv {
    pattern: Regex,
    variables: ScopedVars,
}

impl Default for ScopedVarsTemplateSrv {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopedVarsTemplateSrv {
    pub fn new() -> Self {
        Self::with_variables(ScopedVars::new())
    }

    /// Dashboard-wide variables, consulted when a name is not scoped.
    #[allow(clippy::expect_used)]
    pub fn with_variables(variables: ScopedVars) -> Self {
        ScopedVarsTemplateSrv {
            pattern: Regex::new(VARIABLE_PATTERN).expect("variable pattern is valid"),
            variables,
        }
    }

    fn lookup<'a>(&'a self, name: &str, scoped_vars: &'a ScopedVars) -> Option<&'a ScopedVar> {
        scoped_vars.get(name).or_else(|| self.variables.get(name))
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_value(var: &ScopedVar, format: Option<&str>) -> String {
    let separator = match format {
        Some("json") => return var.value.to_string(),
        Some("text") => return plain(&var.text),
        Some("pipe") => "|",
        _ => ",",
    };
    match &var.value {
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(separator),
        other => plain(other),
    }
}

impl TemplateSrv for ScopedVarsTemplateSrv {
    fn replace(&self, target: &str, scoped_vars: &ScopedVars) -> String {
        self.pattern
            .replace_all(target, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(4))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                let format = caps.get(3).or_else(|| caps.get(5)).map(|m| m.as_str());

                match self.lookup(name, scoped_vars) {
                    Some(var) => format_value(var, format),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
