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

use std::{ops::Deref, str::FromStr};

use jsonpath_rust::{path::config::JsonPathConfig, JsonPathInst};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;


/// Compiled JSONPath expression that keeps its source text.
#[derive(Clone)]
pub struct JsonPathExpression {
    expression: String,
    path: JsonPathInst,
}

impl JsonPathExpression {
    /// All values the expression selects, in document order.
    pub fn execute(&self, value: &Value) -> Vec<Value> {
        self.path
            .find_slice(value, JsonPathConfig::default())
            .into_iter()
            .map(|v| v.deref().clone())
            .collect()
    }

    /// The final segment of the path, used as a default column name.
    pub fn last_segment(&self) -> Option<String> {
        path_segments(&self.expression).pop()
    }
}

impl FromStr for JsonPathExpression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // jsonpath_rust accepts empty strings, reject them up front
        if s.trim().is_empty() {
            return Err("Empty JSONPath".to_string());
        }
        match JsonPathInst::from_str(s) {
            Ok(path) => Ok(JsonPathExpression {
                expression: s.to_string(),
                path,
            }),
            Err(e) => Err(format!("Failed to parse JSONPath: {e}")),
        }
    }
}

impl<'de> Deserialize<'de> for JsonPathExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let expression = String::deserialize(deserializer)?;
        JsonPathExpression::from_str(&expression).map_err(de::Error::custom)
    }
}

impl std::fmt::Debug for JsonPathExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#?}", self.expression)
    }
}

/// Strips the quotes of a quoted bracket member like `'device id'`.
fn unquote(member: &str) -> &str {
    let mut chars = member.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && (first == '\'' || first == '"') => {
            &member[1..member.len() - 1]
        }
        _ => member,
    }
}

/// Splits a JSONPath expression into its segments.
///
/// `$.items[*].name` gives `["$", "items", "*", "name"]`. Quoted bracket
/// members are unquoted, filters are kept as written, `..` acts as a plain
/// separator.
pub fn path_segments(expression: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = expression.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let mut depth = 1;
                let mut quote: Option<char> = None;
                let mut member = String::new();
                for c in chars.by_ref() {
                    match (quote, c) {
                        (Some(q), c) if c == q => quote = None,
                        (Some(_), _) => {}
                        (None, '\'') | (None, '"') => quote = Some(c),
                        (None, '[') => depth += 1,
                        (None, ']') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        (None, _) => {}
                    }
                    member.push(c);
                }
                let member = unquote(member.trim());
                if !member.is_empty() {
                    segments.push(member.to_string());
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
