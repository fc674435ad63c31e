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

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        TimeRange { from, to }
    }

    pub fn from_unix(&self) -> i64 {
        self.from.timestamp()
    }

    pub fn to_unix(&self) -> i64 {
        self.to.timestamp()
    }

    // millisecond precision with a `Z` suffix, e.g. 2024-01-01T00:00:00.000Z
    pub fn from_iso(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn to_iso(&self) -> String {
        self.to.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
