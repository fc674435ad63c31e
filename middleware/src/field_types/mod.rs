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

//! Default type detection and coercion policies for extracted values.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use ws_datasource_core::{
    interface::{CoercionError, FieldTypeDetector, ValueCoercion},
    models::{FieldValue, ValueType},
    value_types::ValueTypeRegistry,
};


/// 1990-01-01T00:00:00Z in epoch milliseconds
const EPOCH_MS_1990: f64 = 631_152_000_000.0;
/// 2030-01-01T00:00:00Z in epoch milliseconds
const EPOCH_MS_2030: f64 = 1_893_456_000_000.0;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A registry holding the string, number, time and boolean policies.
pub fn default_registry() -> ValueTypeRegistry {
    let mut registry = ValueTypeRegistry::new();
    registry.register(Arc::new(StringCoercion));
    registry.register(Arc::new(NumberCoercion));
    registry.register(Arc::new(TimeCoercion));
    registry.register(Arc::new(BooleanCoercion));
    registry
}

/// Parses ISO-8601 date-times and dates. Naive values are taken as UTC.
pub fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn from_epoch_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(ms.round() as i64).single()
}

fn is_epoch_millis(value: &Value) -> bool {
    match value.as_f64() {
        Some(n) => n.fract() == 0.0 && (EPOCH_MS_1990..=EPOCH_MS_2030).contains(&n),
        None => false,
    }
}

/// Strings pass through, everything else is rendered as JSON text.
pub struct StringCoercion;

impl ValueCoercion for StringCoercion {
    fn value_type(&self) -> ValueType {
        ValueType::String
    }

    fn coerce(&self, value: &Value) -> Result<FieldValue, CoercionError> {
        Ok(match value {
            Value::Null => FieldValue::Null,
            Value::String(s) => FieldValue::String(s.clone()),
            other => FieldValue::String(other.to_string()),
        })
    }
}

/// Numbers, and strings holding a finite decimal number.
pub struct NumberCoercion;

impl ValueCoercion for NumberCoercion {
    fn value_type(&self) -> ValueType {
        ValueType::Number
    }

    fn coerce(&self, value: &Value) -> Result<FieldValue, CoercionError> {
        let parsed = match value {
            Value::Null => return Ok(FieldValue::Null),
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if n.is_finite() => Ok(FieldValue::Number(n)),
            _ => Err(CoercionError::unparseable(value, ValueType::Number)),
        }
    }
}

/// Epoch milliseconds (numeric or string) and ISO-8601 strings. Numbers are
/// always milliseconds, never seconds.
pub struct TimeCoercion;

impl ValueCoercion for TimeCoercion {
    fn value_type(&self) -> ValueType {
        ValueType::Time
    }

    fn coerce(&self, value: &Value) -> Result<FieldValue, CoercionError> {
        let parsed = match value {
            Value::Null => return Ok(FieldValue::Null),
            Value::Number(n) => n.as_f64().and_then(from_epoch_millis),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(ms) => Utc.timestamp_millis_opt(ms).single(),
                Err(_) => parse_iso8601(s),
            },
            _ => None,
        };
        parsed
            .map(FieldValue::Time)
            .ok_or_else(|| CoercionError::unparseable(value, ValueType::Time))
    }
}

/// Booleans, `true`/`false`/`yes`/`no`/`1`/`0` strings and the numbers 0 and 1.
pub struct BooleanCoercion;

impl ValueCoercion for BooleanCoercion {
    fn value_type(&self) -> ValueType {
        ValueType::Boolean
    }

    fn coerce(&self, value: &Value) -> Result<FieldValue, CoercionError> {
        let parsed = match value {
            Value::Null => return Ok(FieldValue::Null),
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Value::Number(n) => match n.as_f64() {
                Some(v) if v == 1.0 => Some(true),
                Some(v) if v == 0.0 => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed
            .map(FieldValue::Boolean)
            .ok_or_else(|| CoercionError::unparseable(value, ValueType::Boolean))
    }
}

/// Infers a column type from the values a path selected.
///
/// Nulls are ignored. Only-null (or no) values are strings; ISO-8601 strings
/// are time; whole numbers that all fall inside 1990..2030 as epoch
/// milliseconds are time, other numbers are numbers; booleans are booleans;
/// anything mixed is a string.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTypeDetector;

impl FieldTypeDetector for DefaultTypeDetector {
    fn detect(&self, values: &[Value]) -> ValueType {
        let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();

        if present.is_empty() {
            return ValueType::String;
        }

        if present
            .iter()
            .all(|v| v.as_str().and_then(parse_iso8601).is_some())
        {
            return ValueType::Time;
        }

        if present.iter().all(|v| v.is_number()) {
            if present.iter().all(|v| is_epoch_millis(v)) {
                return ValueType::Time;
            }
            return ValueType::Number;
        }

        if present.iter().all(|v| v.is_boolean()) {
            return ValueType::Boolean;
        }

        ValueType::String
    }
}
