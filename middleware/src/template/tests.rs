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

use serde_json::json;
use ws_datasource_core::{
    interface::TemplateSrv,
    models::{ScopedVar, ScopedVars},
};

use super::ScopedVarsTemplateSrv;

fn vars() -> ScopedVars {
    let mut vars = ScopedVars::new();
    vars.insert("device".to_string(), ScopedVar::new("sensor-1"));
    vars.insert("limit".to_string(), ScopedVar::new(25));
    vars.insert(
        "rooms".to_string(),
        ScopedVar {
            text: json!("Kitchen + Hall"),
            value: json!(["kitchen", "hall"]),
        },
    );
    vars
}

#[test]
fn test_all_syntaxes() {
    let srv = ScopedVarsTemplateSrv::new();
    assert_eq!(
        srv.replace("devices/$device/${device}/[[device]]", &vars()),
        "devices/sensor-1/sensor-1/sensor-1"
    );
}

#[test]
fn test_non_string_values() {
    let srv = ScopedVarsTemplateSrv::new();
    assert_eq!(srv.replace("top/$limit", &vars()), "top/25");
}

#[test]
fn test_multi_value_formats() {
    let srv = ScopedVarsTemplateSrv::new();
    let vars = vars();
    assert_eq!(srv.replace("$rooms", &vars), "kitchen,hall");
    assert_eq!(srv.replace("${rooms:pipe}", &vars), "kitchen|hall");
    assert_eq!(srv.replace("${rooms:json}", &vars), r#"["kitchen","hall"]"#);
    assert_eq!(srv.replace("${rooms:text}", &vars), "Kitchen + Hall");
    assert_eq!(srv.replace("[[rooms:csv]]", &vars), "kitchen,hall");
}

#[test]
fn test_unknown_and_macros_untouched() {
    let srv = ScopedVarsTemplateSrv::new();
    let input = "$missing/${other}/$__unixEpochFrom()/$.items[*]";
    assert_eq!(srv.replace(input, &vars()), input);
}

#[test]
fn test_scoped_wins_over_dashboard_variables() {
    let mut globals = ScopedVars::new();
    globals.insert("device".to_string(), ScopedVar::new("global"));
    globals.insert("site".to_string(), ScopedVar::new("north"));
    let srv = ScopedVarsTemplateSrv::with_variables(globals);

    assert_eq!(srv.replace("$site/$device", &vars()), "north/sensor-1");
    assert_eq!(
        srv.replace("$site/$device", &ScopedVars::new()),
        "north/global"
    );
}
