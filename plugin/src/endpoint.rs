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

//! Builds the WebSocket URL a live channel connects to.

use url::Url;

use crate::settings::{CustomSettings, SettingsError};

pub const API_KEY_PARAM: &str = "x-api-key";

/// `{host}/{path}?x-api-key={apiKey}&{custom params}`.
///
/// `http` and `https` hosts are switched to `ws` and `wss`. The path is
/// joined onto the host path with `.` and `..` segments resolved; any query
/// string on the host is replaced.
pub fn encode_url(settings: &CustomSettings, path: &str) -> Result<Url, SettingsError> {
    let mut url = Url::parse(&settings.host).map_err(|source| SettingsError::InvalidHost {
        host: settings.host.clone(),
        source,
    })?;

    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => return Err(SettingsError::UnsupportedScheme(other.to_string())),
    };
    if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
        return Err(SettingsError::UnsupportedScheme(url.scheme().to_string()));
    }

    let joined = join_path(url.path(), path);
    url.set_path(&joined);

    url.set_query(None);
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(api_key) = settings.api_key.as_deref() {
        params.push((API_KEY_PARAM, api_key));
    }
    params.extend(
        settings
            .query_parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}

/// Joins two slash separated paths, dropping empty and `.` segments and
/// resolving `..`. Always absolute.
pub fn join_path(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
