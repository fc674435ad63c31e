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

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use ws_datasource_core::models::Frame;

/// Pushes frames to everyone subscribed to a live channel.
#[async_trait]
pub trait StreamSender: Send + Sync {
    async fn send_frame(&self, frame: Frame) -> Result<()>;
}

/// Forwards frames into a bounded channel.
#[derive(Clone)]
pub struct ChannelStreamSender {
    tx: mpsc::Sender<Frame>,
}

impl ChannelStreamSender {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ChannelStreamSender { tx }, rx)
    }
}

#[async_trait]
impl StreamSender for ChannelStreamSender {
    async fn send_frame(&self, frame: Frame) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| anyhow!("Stream receiver has been dropped"))
    }
}
