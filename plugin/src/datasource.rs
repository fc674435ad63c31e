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

//! Backend half of the WebSocket datasource.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    handlers::{CheckHealthHandler, QueryDataHandler, StreamHandler},
    models::{
        CheckHealthRequest, CheckHealthResult, DataQuery, DataResponse, DataSourceInstanceSettings,
        PublishStreamRequest, PublishStreamResponse, PublishStreamStatus, QueryDataRequest,
        QueryDataResponse, RunStreamRequest, SubscribeStreamRequest, SubscribeStreamResponse,
        SubscribeStreamStatus,
    },
    proxy::{probe, WsDataProxy, RECONNECT_DELAY},
    query::{response_frame, QueryModel},
    settings::{CustomSettings, SettingsError},
    stream::StreamSender,
};

pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
pub const HEALTHY_MESSAGE: &str = "Data source is working";

pub struct WebSocketDataSource {
    uid: String,
    settings: CustomSettings,
    reconnect_delay: Duration,
}

impl WebSocketDataSource {
    /// Builds the instance for one set of datasource settings. A new instance
    /// is created whenever the settings change.
    pub fn new(instance: &DataSourceInstanceSettings) -> Result<Self, SettingsError> {
        Ok(WebSocketDataSource {
            uid: instance.uid.clone(),
            settings: CustomSettings::from_instance(instance)?,
            reconnect_delay: RECONNECT_DELAY,
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn settings(&self) -> &CustomSettings {
        &self.settings
    }

    fn query(&self, query: &DataQuery) -> DataResponse {
        match QueryModel::from_json(&query.json) {
            Ok(model) => DataResponse {
                frames: vec![response_frame(&self.uid, &model)],
                error: None,
            },
            Err(e) => {
                log::warn!("Query {} has an invalid model: {}", query.ref_id, e);
                DataResponse::error(e.to_string())
            }
        }
    }
}

#[async_trait]
impl QueryDataHandler for WebSocketDataSource {
    async fn query_data(&self, request: QueryDataRequest) -> Result<QueryDataResponse> {
        log::debug!("QueryData called with {} queries", request.queries.len());

        let responses = request
            .queries
            .iter()
            .map(|q| (q.ref_id.clone(), self.query(q)))
            .collect();

        Ok(QueryDataResponse { responses })
    }
}

#[async_trait]
impl CheckHealthHandler for WebSocketDataSource {
    async fn check_health(&self, _request: CheckHealthRequest) -> Result<CheckHealthResult> {
        log::debug!("CheckHealth called for {}", self.uid);

        let attempt = tokio::time::timeout(HEALTH_CHECK_TIMEOUT, probe(&self.settings, "."));
        let result = match attempt.await {
            Ok(Ok(())) => CheckHealthResult::ok(HEALTHY_MESSAGE),
            Ok(Err(e)) => CheckHealthResult::error(e.to_string()),
            Err(_) => CheckHealthResult::error(format!(
                "Connection timed out after {}s",
                HEALTH_CHECK_TIMEOUT.as_secs()
            )),
        };

        Ok(result)
    }
}

#[async_trait]
impl StreamHandler for WebSocketDataSource {
    async fn subscribe_stream(
        &self,
        request: SubscribeStreamRequest,
    ) -> Result<SubscribeStreamResponse> {
        log::debug!("SubscribeStream called for {}", request.path);
        Ok(SubscribeStreamResponse {
            status: SubscribeStreamStatus::Ok,
            initial_data: None,
        })
    }

    async fn publish_stream(
        &self,
        request: PublishStreamRequest,
    ) -> Result<PublishStreamResponse> {
        log::debug!("PublishStream called for {}", request.path);
        Ok(PublishStreamResponse {
            status: PublishStreamStatus::PermissionDenied,
            data: None,
        })
    }

    async fn run_stream(
        &self,
        request: RunStreamRequest,
        sender: Arc<dyn StreamSender>,
        cancel: CancellationToken,
    ) -> Result<()> {
        log::info!("RunStream called for {}", request.path);

        let proxy = WsDataProxy::new(&self.settings, &request.path, sender)?
            .with_reconnect_delay(self.reconnect_delay);
        proxy.run(cancel).await?;

        log::info!("Closing channel {}", request.path);
        Ok(())
    }
}
