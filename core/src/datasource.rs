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

//! Frontend-side datasource: dispatches through the host backend and reshapes
//! every event it streams back.

use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};

use crate::{
    interface::{FrameExtractor, QueryBackend, TemplateSrv},
    macros::VariableReplacer,
    models::DataQueryRequest,
    pipeline::{ReshapeContext, ReshapedEvent, StreamReshaper},
};

pub struct DataSource {
    backend: Arc<dyn QueryBackend>,
    template_srv: Arc<dyn TemplateSrv>,
    reshaper: StreamReshaper,
}

impl DataSource {
    pub fn new(
        backend: Arc<dyn QueryBackend>,
        extractor: Arc<dyn FrameExtractor>,
        template_srv: Arc<dyn TemplateSrv>,
    ) -> Self {
        DataSource {
            backend,
            reshaper: StreamReshaper::new(extractor, template_srv.clone()),
            template_srv,
        }
    }

    pub fn query(&self, request: DataQueryRequest) -> BoxStream<'static, ReshapedEvent> {
        let context = ReshapeContext::from(&request);

        let mut dispatched = request;
        {
            let replacer = VariableReplacer::new(
                self.template_srv.as_ref(),
                &context.scoped_vars,
                context.range.as_ref(),
            );
            for target in dispatched.targets.iter_mut() {
                target.path = target.path.as_deref().map(|p| replacer.replace(p));
            }
        }

        log::debug!(
            "Dispatching {} targets for panel {:?}",
            dispatched.targets.len(),
            context.panel_id
        );

        let reshaper = self.reshaper.clone();
        self.backend
            .base_query(dispatched)
            .map(move |event| reshaper.reshape(event, &context))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        interface::{EventStream, ExtractError},
        models::{
            Field, Frame, FrameMeta, LoadingState, Query, ScopedVar, ScopedVars, StreamEvent,
        },
    };
    use futures::stream;

    struct RecordingBackend {
        seen: Mutex<Vec<DataQueryRequest>>,
        events: Vec<StreamEvent>,
    }

    impl QueryBackend for RecordingBackend {
        fn base_query(&self, request: DataQueryRequest) -> EventStream {
            self.seen.lock().unwrap().push(request);
            stream::iter(self.events.clone()).boxed()
        }
    }

    struct RefIdOnly;

    impl FrameExtractor for RefIdOnly {
        fn extract(
            &self,
            source: &Frame,
            query: &Query,
            _replacer: &VariableReplacer<'_>,
        ) -> Result<Frame, ExtractError> {
            let mut frame = source.clone();
            frame.ref_id = Some(query.ref_id.clone());
            Ok(frame)
        }
    }

    struct DollarTemplateSrv;

    impl TemplateSrv for DollarTemplateSrv {
        fn replace(&self, target: &str, scoped_vars: &ScopedVars) -> String {
            scoped_vars.iter().fold(target.to_string(), |acc, (k, v)| {
                acc.replace(&format!("${k}"), v.value.as_str().unwrap_or_default())
            })
        }
    }

    fn channel_event(channel: &str) -> StreamEvent {
        StreamEvent::streaming(vec![Frame::new("response")
            .with_field(Field::strings("data", vec!["{}"]))
            .with_meta(FrameMeta::with_channel(channel))])
    }

    #[tokio::test]
    async fn test_query_substitutes_paths_and_reshapes() {
        let backend = Arc::new(RecordingBackend {
            seen: Mutex::new(Vec::new()),
            events: vec![
                channel_event("ds/abc/devices/d1"),
                StreamEvent {
                    state: LoadingState::Done,
                    ..Default::default()
                },
            ],
        });

        let ds = DataSource::new(
            backend.clone(),
            Arc::new(RefIdOnly),
            Arc::new(DollarTemplateSrv),
        );

        let mut scoped_vars = ScopedVars::new();
        scoped_vars.insert("device".to_string(), ScopedVar::new("d1"));
        let request = DataQueryRequest {
            targets: vec![Query::new("A", "abc").with_path("devices/$device")],
            scoped_vars,
            ..Default::default()
        };

        let results: Vec<ReshapedEvent> = ds.query(request).collect().await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].targets[0].path.as_deref(), Some("devices/d1"));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].event.data.len(), 1);
        assert_eq!(results[0].event.data[0].ref_id.as_deref(), Some("A"));
        assert_eq!(results[1].event.state, LoadingState::Done);
    }
}
