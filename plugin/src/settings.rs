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

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::DataSourceInstanceSettings;

const HOST_KEY: &str = "host";
const API_KEY: &str = "apiKey";
const HEADER_PREFIX: &str = "header";
const QUERY_PARAM_PREFIX: &str = "queryParam";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read JSON data source instance settings: {0}")]
    InvalidJsonData(String),

    #[error("Missing '{0}' in data source settings")]
    MissingSetting(&'static str),

    #[error("Failed to parse host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported scheme '{0}', expected ws, wss, http or https")]
    UnsupportedScheme(String),
}

/// Connection settings of one datasource instance.
///
/// Custom headers and query parameters are configured as numbered pairs: the
/// name lives in the plain settings (`headerName1`, `queryParamName1`) and the
/// value in the secure settings (`headerValue1`, `queryParamValue1`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomSettings {
    pub host: String,
    pub api_key: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub query_parameters: BTreeMap<String, String>,
}

impl CustomSettings {
    pub fn from_instance(settings: &DataSourceInstanceSettings) -> Result<Self, SettingsError> {
        let json_data = match &settings.json_data {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(SettingsError::InvalidJsonData(format!(
                    "expected an object, got {other}"
                )))
            }
        };

        let host = match json_data.get(HOST_KEY) {
            Some(Value::String(host)) if !host.trim().is_empty() => host.trim().to_string(),
            Some(Value::String(_)) | None if !settings.url.trim().is_empty() => {
                settings.url.trim().to_string()
            }
            Some(Value::String(_)) | None => return Err(SettingsError::MissingSetting(HOST_KEY)),
            Some(other) => {
                return Err(SettingsError::InvalidJsonData(format!(
                    "'{HOST_KEY}' must be a string, got {other}"
                )))
            }
        };

        let secure = &settings.decrypted_secure_json_data;
        let api_key = secure.get(API_KEY).filter(|key| !key.is_empty()).cloned();

        Ok(CustomSettings {
            host,
            api_key,
            headers: named_pairs(&json_data, secure, HEADER_PREFIX),
            query_parameters: named_pairs(&json_data, secure, QUERY_PARAM_PREFIX),
        })
    }
}

/// Collects `{prefix}Name{N}` entries with their `{prefix}Value{N}` secret.
fn named_pairs(
    json_data: &Map<String, Value>,
    secure: &HashMap<String, String>,
    prefix: &str,
) -> BTreeMap<String, String> {
    let name_prefix = format!("{prefix}Name");
    json_data
        .iter()
        .filter_map(|(key, value)| {
            let suffix = key.strip_prefix(&name_prefix)?;
            let name = value.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let value_key = format!("{prefix}Value{suffix}");
            let value = match secure.get(&value_key) {
                Some(value) => value.clone(),
                None => {
                    log::warn!("Custom setting '{name}' has no value ('{value_key}'), using empty");
                    String::new()
                }
            };
            Some((name.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn instance(json_data: Value, secure: &[(&str, &str)]) -> DataSourceInstanceSettings {
        DataSourceInstanceSettings {
            uid: "abc".to_string(),
            json_data,
            decrypted_secure_json_data: secure
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reads_host_and_api_key() {
        let settings = CustomSettings::from_instance(&instance(
            json!({ "host": " wss://api.example.com/v1 " }),
            &[("apiKey", "secret")],
        ))
        .unwrap();

        assert_eq!(settings.host, "wss://api.example.com/v1");
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert!(settings.headers.is_empty());
    }

    #[test]
    fn test_empty_api_key_is_none() {
        let settings = CustomSettings::from_instance(&instance(
            json!({ "host": "ws://localhost" }),
            &[("apiKey", "")],
        ))
        .unwrap();
        assert_eq!(settings.api_key, None);
    }

    #[test]
    fn test_custom_headers_and_params() {
        let settings = CustomSettings::from_instance(&instance(
            json!({
                "host": "ws://localhost",
                "headerName1": "Authorization",
                "headerName2": "X-Tenant",
                "headerName3": "  ",
                "queryParamName1": "token",
            }),
            &[
                ("headerValue1", "Bearer abc"),
                ("queryParamValue1", "xyz"),
            ],
        ))
        .unwrap();

        assert_eq!(
            settings.headers,
            BTreeMap::from([
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("X-Tenant".to_string(), String::new()),
            ])
        );
        assert_eq!(
            settings.query_parameters,
            BTreeMap::from([("token".to_string(), "xyz".to_string())])
        );
    }

    #[test]
    fn test_url_fallback() {
        let mut settings = instance(json!({}), &[]);
        settings.url = "ws://fallback".to_string();
        assert_eq!(
            CustomSettings::from_instance(&settings).unwrap().host,
            "ws://fallback"
        );
    }

    #[test]
    fn test_missing_host() {
        assert!(matches!(
            CustomSettings::from_instance(&instance(Value::Null, &[])),
            Err(SettingsError::MissingSetting("host"))
        ));
    }

    #[test]
    fn test_invalid_json_data() {
        assert!(matches!(
            CustomSettings::from_instance(&instance(json!({ "host": 5 }), &[])),
            Err(SettingsError::InvalidJsonData(_))
        ));
        assert!(matches!(
            CustomSettings::from_instance(&instance(json!([1, 2]), &[])),
            Err(SettingsError::InvalidJsonData(_))
        ));
    }
}
