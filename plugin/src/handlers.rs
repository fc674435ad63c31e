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

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    models::{
        CheckHealthRequest, CheckHealthResult, PublishStreamRequest, PublishStreamResponse,
        QueryDataRequest, QueryDataResponse, RunStreamRequest, SubscribeStreamRequest,
        SubscribeStreamResponse,
    },
    stream::StreamSender,
};

#[async_trait]
pub trait QueryDataHandler: Send + Sync {
    /// Answers every query of the request, keyed by ref id.
    async fn query_data(&self, request: QueryDataRequest) -> Result<QueryDataResponse>;
}

#[async_trait]
pub trait CheckHealthHandler: Send + Sync {
    async fn check_health(&self, request: CheckHealthRequest) -> Result<CheckHealthResult>;
}

#[async_trait]
pub trait StreamHandler: Send + Sync {
    async fn subscribe_stream(
        &self,
        request: SubscribeStreamRequest,
    ) -> Result<SubscribeStreamResponse>;

    async fn publish_stream(&self, request: PublishStreamRequest)
        -> Result<PublishStreamResponse>;

    /// Runs once per open channel until `cancel` fires. Frames sent through
    /// `sender` are shared by every subscriber of the channel.
    async fn run_stream(
        &self,
        request: RunStreamRequest,
        sender: Arc<dyn StreamSender>,
        cancel: CancellationToken,
    ) -> Result<()>;
}
