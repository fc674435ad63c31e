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

//! Time-range macros recognised in query paths and field expressions.
//!
//! Macros are literal, case-sensitive tokens. They are only substituted when a
//! time range is available; otherwise the tokens are left in place.

use crate::{
    interface::TemplateSrv,
    models::{ScopedVars, TimeRange},
};

pub const UNIX_EPOCH_FROM: &str = "$__unixEpochFrom()";
pub const UNIX_EPOCH_TO: &str = "$__unixEpochTo()";
pub const ISO_FROM: &str = "$__isoFrom()";
pub const ISO_TO: &str = "$__isoTo()";

/// Substitutes every known macro with its value for `range`.
pub fn replace_macros(target: &str, range: Option<&TimeRange>) -> String {
    let range = match range {
        Some(range) => range,
        None => return target.to_string(),
    };

    target
        .replace(UNIX_EPOCH_FROM, &range.from_unix().to_string())
        .replace(UNIX_EPOCH_TO, &range.to_unix().to_string())
        .replace(ISO_FROM, &range.from_iso())
        .replace(ISO_TO, &range.to_iso())
}

/// Template substitution followed by macro substitution, bound to the
/// context of one request.
pub struct VariableReplacer<'a> {
    template_srv: &'a dyn TemplateSrv,
    scoped_vars: &'a ScopedVars,
    range: Option<&'a TimeRange>,
}

impl<'a> VariableReplacer<'a> {
    pub fn new(
        template_srv: &'a dyn TemplateSrv,
        scoped_vars: &'a ScopedVars,
        range: Option<&'a TimeRange>,
    ) -> Self {
        VariableReplacer {
            template_srv,
            scoped_vars,
            range,
        }
    }

    pub fn replace(&self, target: &str) -> String {
        replace_macros(
            &self.template_srv.replace(target, self.scoped_vars),
            self.range,
        )
    }

    pub fn range(&self) -> Option<&TimeRange> {
        self.range
    }
}
