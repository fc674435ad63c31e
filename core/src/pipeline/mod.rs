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

//! Reassembles streamed events into the frames each query asked for.

use std::sync::Arc;

use crate::{
    interface::{ExtractError, FrameExtractor, TemplateSrv},
    macros::VariableReplacer,
    models::{
        DataQueryRequest, EventError, EventErrorData, Frame, Query, ScopedVars, StreamEvent,
        TimeRange,
    },
    router,
};


pub const STREAMING_ERROR_MESSAGE: &str = "Streaming error: click to see details";

/// Per-request context the host supplies alongside each event.
#[derive(Debug, Clone, Default)]
pub struct ReshapeContext {
    pub queries: Vec<Query>,
    pub scoped_vars: ScopedVars,
    pub range: Option<TimeRange>,
    pub dashboard_id: Option<String>,
    pub panel_id: Option<i64>,
}

impl From<&DataQueryRequest> for ReshapeContext {
    fn from(request: &DataQueryRequest) -> Self {
        ReshapeContext {
            queries: request
                .targets
                .iter()
                .filter(|q| !q.is_hidden())
                .cloned()
                .collect(),
            scoped_vars: request.scoped_vars.clone(),
            range: request.range,
            dashboard_id: request.dashboard_id.clone(),
            panel_id: request.panel_id,
        }
    }
}

/// A query whose frame could not be derived from the event.
#[derive(Debug)]
pub struct QueryFailure {
    pub ref_id: String,
    pub error: ExtractError,
}

#[derive(Debug)]
pub struct ReshapedEvent {
    pub event: StreamEvent,
    pub failures: Vec<QueryFailure>,
}

/// Key shared by every query multiplexed on one channel of one panel.
pub fn multi_query_key(dashboard_id: Option<&str>, panel_id: Option<i64>, channel: &str) -> String {
    format!(
        "{}/{}/{}",
        dashboard_id.unwrap_or_default(),
        panel_id.map(|id| id.to_string()).unwrap_or_default(),
        channel
    )
}

/// Builds the event error from annotated frames and local failures, one
/// `Query {refId} - {error}` line each.
pub fn aggregate_errors(frames: &[Frame], failures: &[QueryFailure]) -> Option<EventError> {
    let lines: Vec<String> = frames
        .iter()
        .filter_map(|frame| frame.error_annotation())
        .map(|annotation| format!("Query {} - {}", annotation.ref_id, annotation.error))
        .chain(
            failures
                .iter()
                .map(|failure| format!("Query {} - {}", failure.ref_id, failure.error)),
        )
        .collect();

    if lines.is_empty() {
        return None;
    }

    Some(EventError {
        message: STREAMING_ERROR_MESSAGE.to_string(),
        data: EventErrorData {
            message: format!("Some queries returned an error:\n{}", lines.join("\n")),
        },
    })
}

#[derive(Clone)]
pub struct StreamReshaper {
    extractor: Arc<dyn FrameExtractor>,
    template_srv: Arc<dyn TemplateSrv>,
}

impl StreamReshaper {
    pub fn new(extractor: Arc<dyn FrameExtractor>, template_srv: Arc<dyn TemplateSrv>) -> Self {
        StreamReshaper {
            extractor,
            template_srv,
        }
    }

    /// Non-streaming events are returned untouched. Streaming events get one
    /// frame per matching query; a query that fails is reported without
    /// holding back its siblings.
    pub fn reshape(&self, event: StreamEvent, context: &ReshapeContext) -> ReshapedEvent {
        if !event.is_streaming() {
            return ReshapedEvent {
                event,
                failures: Vec::new(),
            };
        }

        let replacer = VariableReplacer::new(
            self.template_srv.as_ref(),
            &context.scoped_vars,
            context.range.as_ref(),
        );

        let matches = router::route(&event, &context.queries, &replacer);
        let channel = event.channel().map(str::to_string);

        let mut frames = Vec::with_capacity(matches.len());
        let mut failures = Vec::new();

        if let Some(source) = event.data.first() {
            for query in &matches {
                match self.extractor.extract(source, query, &replacer) {
                    Ok(frame) => frames.push(frame),
                    Err(error) => {
                        log::warn!("Query {} failed to extract frame: {}", query.ref_id, error);
                        failures.push(QueryFailure {
                            ref_id: query.ref_id.clone(),
                            error,
                        });
                    }
                }
            }
        }

        let key = match (&channel, matches.len() > 1) {
            (Some(channel), true) => Some(multi_query_key(
                context.dashboard_id.as_deref(),
                context.panel_id,
                channel,
            )),
            _ => event.key.clone(),
        };

        let error = aggregate_errors(&frames, &failures);

        ReshapedEvent {
            event: StreamEvent {
                state: event.state,
                data: frames,
                key,
                error,
            },
            failures,
        }
    }
}
