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

//! Connects to a WebSocket API the way the datasource does and prints the
//! frames each message would produce for a query.

use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use ws_datasource_core::{
    models::{Query, QueryField, StreamEvent},
    pipeline::{ReshapeContext, StreamReshaper},
};
use ws_datasource_middleware::{
    extract::{JsonPathExtractor, JsonPathExtractorConfig},
    template::ScopedVarsTemplateSrv,
};
use ws_datasource_plugin::{
    handlers::{QueryDataHandler, StreamHandler},
    models::{DataQuery, DataSourceInstanceSettings, QueryDataRequest, RunStreamRequest},
    stream::ChannelStreamSender,
    WebSocketDataSource,
};

const PROBE_UID: &str = "probe";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct ProbeArgs {
    /// WebSocket host, e.g. wss://api.example.com/v1
    #[arg(long)]
    host: String,

    /// Channel path appended to the host
    #[arg(short, long, default_value = "")]
    path: String,

    /// Sent as the x-api-key query parameter
    #[arg(long)]
    api_key: Option<String>,

    /// Custom header, NAME=VALUE
    #[arg(long = "header", value_parser = parse_pair)]
    headers: Vec<(String, String)>,

    /// Custom query parameter, NAME=VALUE
    #[arg(long = "param", value_parser = parse_pair)]
    params: Vec<(String, String)>,

    /// JSONPath of a field to extract; may be repeated
    #[arg(short, long = "field")]
    fields: Vec<String>,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("Expected NAME=VALUE, got '{s}'")),
    }
}

impl ProbeArgs {
    fn instance_settings(&self) -> DataSourceInstanceSettings {
        let mut json_data = Map::new();
        json_data.insert("host".to_string(), json!(self.host));
        let mut secure = HashMap::new();

        if let Some(api_key) = &self.api_key {
            secure.insert("apiKey".to_string(), api_key.clone());
        }
        for (i, (name, value)) in self.headers.iter().enumerate() {
            json_data.insert(format!("headerName{i}"), json!(name));
            secure.insert(format!("headerValue{i}"), value.clone());
        }
        for (i, (name, value)) in self.params.iter().enumerate() {
            json_data.insert(format!("queryParamName{i}"), json!(name));
            secure.insert(format!("queryParamValue{i}"), value.clone());
        }

        DataSourceInstanceSettings {
            uid: PROBE_UID.to_string(),
            name: "ws-probe".to_string(),
            json_data: Value::Object(json_data),
            decrypted_secure_json_data: secure,
            ..Default::default()
        }
    }

    fn query(&self) -> Query {
        Query::new("A", PROBE_UID)
            .with_path(self.path.clone())
            .with_fields(self.fields.iter().map(QueryField::new).collect())
    }
}

#[allow(clippy::print_stdout)]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = ProbeArgs::parse();

    let datasource = Arc::new(WebSocketDataSource::new(&args.instance_settings())?);
    let query = args.query();

    let response = datasource
        .query_data(QueryDataRequest {
            queries: vec![DataQuery {
                ref_id: query.ref_id.clone(),
                json: serde_json::to_value(&query)?,
                ..Default::default()
            }],
            ..Default::default()
        })
        .await?;
    let channel = response
        .responses
        .get(&query.ref_id)
        .and_then(|r| r.frames.first())
        .and_then(|f| f.channel())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Query did not return a live channel"))?;
    println!("Subscribed to {channel}");

    let (sender, mut frames) = ChannelStreamSender::new(64);
    let cancel = CancellationToken::new();

    let stream = {
        let datasource = datasource.clone();
        let cancel = cancel.clone();
        let path = query.channel_path().to_string();
        tokio::spawn(async move {
            datasource
                .run_stream(
                    RunStreamRequest {
                        path,
                        ..Default::default()
                    },
                    Arc::new(sender),
                    cancel,
                )
                .await
        })
    };

    let reshaper = StreamReshaper::new(
        Arc::new(JsonPathExtractor::with_config(
            "ws-probe",
            JsonPathExtractorConfig::default(),
        )),
        Arc::new(ScopedVarsTemplateSrv::new()),
    );
    let context = ReshapeContext {
        queries: vec![query],
        ..Default::default()
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            }
            frame = frames.recv() => {
                let Some(mut frame) = frame else { break };
                frame.meta_mut().channel = Some(channel.clone());

                let reshaped = reshaper.reshape(StreamEvent::streaming(vec![frame]), &context);
                println!("{}", serde_json::to_string(&reshaped.event)?);
            }
        }
    }

    stream
        .await
        .context("Stream task panicked")?
        .context("Stream failed")?;
    Ok(())
}
