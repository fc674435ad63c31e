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

mod frame_extractor;
mod query_backend;
mod template_srv;
mod value_coercion;

pub use frame_extractor::ExtractError;
pub use frame_extractor::FrameExtractor;
pub use frame_extractor::FrameExtractorFactory;
pub use frame_extractor::TransformSetupError;
pub use query_backend::EventStream;
pub use query_backend::QueryBackend;
pub use template_srv::IdentityTemplateSrv;
pub use template_srv::TemplateSrv;
pub use value_coercion::CoercionError;
pub use value_coercion::FieldTypeDetector;
pub use value_coercion::ValueCoercion;
