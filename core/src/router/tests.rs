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

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};

use super::{expected_channel, route};
use crate::{
    interface::{IdentityTemplateSrv, TemplateSrv},
    macros::VariableReplacer,
    models::{Frame, FrameMeta, Query, ScopedVar, ScopedVars, StreamEvent, TimeRange},
};

// --- Test Helpers ---

fn event_on(channel: &str) -> StreamEvent {
    StreamEvent::streaming(vec![
        Frame::new("response").with_meta(FrameMeta::with_channel(channel))
    ])
}

fn query(ref_id: &str, uid: &str, path: &str) -> Query {
    Query::new(ref_id, uid).with_path(path)
}

fn matched_ids(matches: &[&Query]) -> Vec<String> {
    matches.iter().map(|q| q.ref_id.clone()).collect()
}

struct VarsTemplateSrv;

impl TemplateSrv for VarsTemplateSrv {
    fn replace(&self, target: &str, scoped_vars: &ScopedVars) -> String {
        scoped_vars.iter().fold(target.to_string(), |acc, (name, var)| {
            acc.replace(
                &format!("${name}"),
                var.value.as_str().unwrap_or_default(),
            )
        })
    }
}

// --- Test Modules ---

mod expected {
    use super::*;

    #[test]
    fn test_empty_path_defaults_to_dot() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let q = Query::new("A", "abc");
        assert_eq!(
            expected_channel(&q, &replacer),
            Some("ds/abc/.".to_string())
        );

        let q = Query::new("A", "abc").with_path("");
        assert_eq!(
            expected_channel(&q, &replacer),
            Some("ds/abc/.".to_string())
        );
    }

    #[test]
    fn test_missing_uid_has_no_channel() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let mut q = Query::new("A", "abc");
        q.datasource = None;
        assert_eq!(expected_channel(&q, &replacer), None);
    }

    #[test]
    fn test_substitutes_variables_and_macros() {
        let mut vars = ScopedVars::new();
        vars.insert("room".to_string(), ScopedVar::new("kitchen"));
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        );
        let replacer = VariableReplacer::new(&VarsTemplateSrv, &vars, Some(&range));
        let q = query("A", "abc", "rooms/$room/$__unixEpochFrom()");

        assert_eq!(
            expected_channel(&q, &replacer),
            Some("ds/abc/rooms/kitchen/1704067200".to_string())
        );
    }
}

mod routing {
    use super::*;

    #[test]
    fn test_empty_path_matches_dot_channel() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let queries = vec![Query::new("A", "abc").with_path("")];

        let matches = route(&event_on("ds/abc/."), &queries, &replacer);
        assert_eq!(matched_ids(&matches), vec!["A"]);
    }

    #[test]
    fn test_exact_match_only() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let queries = vec![
            query("A", "abc", "devices"),
            query("B", "abc", "devices/1"),
            query("C", "xyz", "devices"),
        ];

        let matches = route(&event_on("ds/abc/devices"), &queries, &replacer);
        assert_eq!(matched_ids(&matches), vec!["A"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let queries = vec![query("A", "abc", "devices")];

        assert!(route(&event_on("ds/abc/other"), &queries, &replacer).is_empty());
    }

    #[test]
    fn test_hidden_queries_excluded() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let mut hidden = query("B", "abc", "devices");
        hidden.hide = Some(true);
        let queries = vec![query("A", "abc", "devices"), hidden];

        let matches = route(&event_on("ds/abc/devices"), &queries, &replacer);
        assert_eq!(matched_ids(&matches), vec!["A"]);
    }

    #[test]
    fn test_shared_channel_matches_many() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let queries = vec![
            query("A", "abc", "devices"),
            query("B", "abc", "devices"),
            query("C", "abc", "other"),
        ];

        let matches = route(&event_on("ds/abc/devices"), &queries, &replacer);
        assert_eq!(matched_ids(&matches), vec!["A", "B"]);
    }

    #[test]
    fn test_event_without_channel() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let queries = vec![query("A", "abc", "devices")];

        let event = StreamEvent::streaming(vec![Frame::new("response")]);
        assert!(route(&event, &queries, &replacer).is_empty());
        assert!(route(&StreamEvent::default(), &queries, &replacer).is_empty());
    }

    #[test]
    fn test_order_insensitive() {
        let vars = ScopedVars::new();
        let replacer = VariableReplacer::new(&IdentityTemplateSrv, &vars, None);
        let base = vec![
            query("A", "abc", "devices"),
            query("B", "abc", "other"),
            query("C", "abc", "devices"),
            query("D", "xyz", "devices"),
        ];
        let event = event_on("ds/abc/devices");

        let expected: BTreeSet<String> = ["A", "C"].iter().map(|s| s.to_string()).collect();

        // every rotation and its reverse
        for shift in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            let forward: BTreeSet<String> = matched_ids(&route(&event, &rotated, &replacer))
                .into_iter()
                .collect();
            assert_eq!(forward, expected);

            rotated.reverse();
            let backward: BTreeSet<String> = matched_ids(&route(&event, &rotated, &replacer))
                .into_iter()
                .collect();
            assert_eq!(backward, expected);
        }
    }
}
