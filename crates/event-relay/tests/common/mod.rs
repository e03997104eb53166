// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use core::time::Duration;
use event_relay::{
    cache::InMemoryCache, config::RelayConfig, pipeline::Pipeline, state::ProcessState,
    transport::ReqwestTransport,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const WRITE_KEY: &str = "abc";
pub const AUTHORIZATION: &str = "Basic YWJjOg==";
pub const BATCH_PATH: &str = "/v1/batch";

/// Pipeline posting to `server_url` with a fresh cache the test can inspect.
pub fn relay(server_url: &str, config: Option<RelayConfig>) -> (Pipeline, Arc<InMemoryCache>) {
    let config = config.unwrap_or_else(|| relay_config(server_url));
    let state = Arc::new(ProcessState::setup(&config).expect("failed to set up relay"));
    let cache = Arc::new(InMemoryCache::new());
    let transport = Arc::new(ReqwestTransport::from_settings(
        None,
        Some(Duration::from_secs(5)),
    ));
    (Pipeline::new(state, cache.clone(), transport), cache)
}

pub fn relay_config(server_url: &str) -> RelayConfig {
    RelayConfig::new(WRITE_KEY, format!("{server_url}{BATCH_PATH}"))
}

pub fn capture_event(name: &str, distinct_id: &str, properties: Value) -> Value {
    json!({
        "event": name,
        "distinct_id": distinct_id,
        "sent_at": "2024-05-01T10:00:00.000Z",
        "properties": properties,
    })
}
