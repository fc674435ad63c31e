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

//! Matches streamed events to the queries that subscribed to their channel.

use crate::{
    macros::VariableReplacer,
    models::{Query, StreamEvent},
};

#[cfg(test)]
mod tests;

/// The channel a query subscribes to, `ds/{uid}/{path}` after substitution.
///
/// Returns `None` for queries without a datasource uid; they cannot own a
/// live channel.
pub fn expected_channel(query: &Query, replacer: &VariableReplacer<'_>) -> Option<String> {
    let uid = query.datasource_uid()?;
    Some(replacer.replace(&format!("ds/{}/{}", uid, query.channel_path())))
}

/// Selects the active queries whose expected channel equals the event's
/// channel. Hidden queries never match. Matches keep the order of `queries`.
pub fn route<'q>(
    event: &StreamEvent,
    queries: &'q [Query],
    replacer: &VariableReplacer<'_>,
) -> Vec<&'q Query> {
    let channel = match event.channel() {
        Some(channel) => channel,
        None => {
            log::debug!("Streaming event carries no channel, nothing to route");
            return Vec::new();
        }
    };

    queries
        .iter()
        .filter(|query| !query.is_hidden())
        .filter(|query| match expected_channel(query, replacer) {
            Some(expected) => expected == channel,
            None => {
                log::debug!("Query {} has no datasource uid, skipping", query.ref_id);
                false
            }
        })
        .collect()
}
