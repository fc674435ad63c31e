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

//! Backend plugin of the WebSocket datasource: answers data queries with the
//! live channel to subscribe to, and relays an upstream WebSocket into that
//! channel.

pub mod datasource;
pub mod endpoint;
pub mod handlers;
pub mod models;
pub mod proxy;
pub mod query;
pub mod settings;
pub mod stream;

pub use datasource::WebSocketDataSource;
