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

//! Relays messages from an upstream WebSocket into frames on a live channel.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        handshake::client::Request,
        http::{HeaderName, HeaderValue},
        protocol::CloseFrame,
        Message,
    },
    MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use url::Url;
use ws_datasource_core::models::{Field, FieldValue, Frame, ValueType};

use crate::{
    endpoint::encode_url,
    settings::{CustomSettings, SettingsError},
    stream::StreamSender,
};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

pub const DATA_FRAME: &str = "response";
pub const ERROR_FRAME: &str = "error";

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Encode URL Error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Connection Error: {0}")]
    Connect(#[source] tungstenite::Error),
}

/// A frame holding one received message: a `time` column with the receive
/// time and a `data` column with the raw text.
pub fn data_frame(message: String, received_at: DateTime<Utc>) -> Frame {
    Frame::new(DATA_FRAME)
        .with_field(Field::new(
            "time",
            ValueType::Time,
            vec![FieldValue::Time(received_at)],
        ))
        .with_field(Field::strings("data", vec![message]))
}

/// A frame reporting a connection problem in its `error` column.
pub fn error_frame(message: impl Into<String>) -> Frame {
    Frame::new(ERROR_FRAME).with_field(Field::strings("error", vec![message.into()]))
}

/// Reconnect failure text; the inner transport error is reported without
/// the `Connection Error` prefix.
fn reconnection_error(error: &ProxyError) -> String {
    match error {
        ProxyError::Connect(e) => format!("Reconnection Error: {e}"),
        other => format!("Reconnection Error: {other}"),
    }
}

fn describe_close(frame: Option<CloseFrame<'_>>) -> String {
    match frame {
        Some(frame) if frame.reason.is_empty() => format!("close {}", u16::from(frame.code)),
        Some(frame) => format!("close {} ({})", u16::from(frame.code), frame.reason),
        None => "connection closed".to_string(),
    }
}

fn client_request(url: &Url, headers: &BTreeMap<String, String>) -> Result<Request, ProxyError> {
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(ProxyError::Connect)?;

    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ProxyError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ProxyError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        request.headers_mut().insert(header_name, header_value);
    }

    Ok(request)
}

async fn dial(url: &Url, headers: &BTreeMap<String, String>) -> Result<WsStream, ProxyError> {
    log::info!("Connecting to {url}");
    let (stream, _response) = connect_async(client_request(url, headers)?)
        .await
        .map_err(ProxyError::Connect)?;
    log::info!("Connected to {url}");
    Ok(stream)
}

/// Opens and immediately closes a connection to the channel's endpoint.
pub async fn probe(settings: &CustomSettings, path: &str) -> Result<(), ProxyError> {
    let url = encode_url(settings, path)?;
    let mut stream = dial(&url, &settings.headers).await?;
    let _ = stream.close(None).await;
    Ok(())
}

pub struct WsDataProxy {
    url: Url,
    headers: BTreeMap<String, String>,
    sender: Arc<dyn StreamSender>,
    reconnect_delay: Duration,
}

impl WsDataProxy {
    pub fn new(
        settings: &CustomSettings,
        path: &str,
        sender: Arc<dyn StreamSender>,
    ) -> Result<Self, ProxyError> {
        let proxy = WsDataProxy {
            url: encode_url(settings, path)?,
            headers: settings.headers.clone(),
            sender,
            reconnect_delay: RECONNECT_DELAY,
        };
        // headers are validated once up front
        client_request(&proxy.url, &proxy.headers)?;
        Ok(proxy)
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn connect(&self) -> Result<WsStream, ProxyError> {
        dial(&self.url, &self.headers).await
    }

    /// Connects, then relays until `cancel` fires. Read failures and
    /// disconnects are reported as error frames and followed by a reconnect
    /// after the reconnect delay. Only the first connection attempt can fail
    /// the call.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ProxyError> {
        let mut stream = self.connect().await?;

        loop {
            let (mut write, mut read) = stream.split();

            let failure = loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::debug!("Closing connection to {}", self.url);
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(());
                    }
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => self.forward(text, &cancel).await,
                            Some(Ok(Message::Binary(data))) => {
                                let text = String::from_utf8_lossy(&data).into_owned();
                                self.forward(text, &cancel).await
                            }
                            Some(Ok(Message::Ping(data))) => {
                                let _ = write.send(Message::Pong(data)).await;
                            }
                            Some(Ok(Message::Close(frame))) => {
                                break format!("Disconnection Error: {}", describe_close(frame));
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => break format!("Read WebSocket Error: {e}"),
                            None => break "Disconnection Error: connection closed".to_string(),
                        }
                    }
                }
            };

            log::error!("{} on {}", failure, self.url);
            self.send(error_frame(failure), &cancel).await;

            stream = loop {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(self.reconnect_delay) => {}
                }
                match self.connect().await {
                    Ok(stream) => break stream,
                    Err(e) => {
                        let message = reconnection_error(&e);
                        log::error!("{message}");
                        self.send(error_frame(message), &cancel).await;
                    }
                }
            };
        }
    }

    async fn forward(&self, message: String, cancel: &CancellationToken) {
        self.send(data_frame(message, Utc::now()), cancel).await;
    }

    /// Waits for the sender to accept the frame unless the stream is
    /// cancelled first.
    async fn send(&self, frame: Frame, cancel: &CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("Dropping frame for {}, stream cancelled", self.url);
            }
            result = self.sender.send_frame(frame) => {
                if let Err(e) = result {
                    log::error!("Failed to send frame: {e}");
                }
            }
        }
    }
}
