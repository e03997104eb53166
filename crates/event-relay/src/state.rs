// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::{NonRetryablePolicy, RelayConfig};
use crate::error::ConfigError;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

/// Immutable state derived once from [`RelayConfig`] and shared across batch calls.
#[derive(Debug, Clone)]
pub struct ProcessState {
    write_key: String,
    data_plane_url: String,
    headers: HeaderMap,
    non_retryable_policy: NonRetryablePolicy,
    max_buffered_events: Option<usize>,
}

impl ProcessState {
    pub fn setup(config: &RelayConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut authorization = HeaderValue::from_str(&basic_auth(&config.write_key))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        debug!("Relay set up for {}", config.data_plane_url);
        Ok(ProcessState {
            write_key: config.write_key.clone(),
            data_plane_url: config.data_plane_url.clone(),
            headers,
            non_retryable_policy: config.non_retryable_policy,
            max_buffered_events: config.max_buffered_events,
        })
    }

    /// Cache key of the single buffered batch.
    pub fn buffer_key(&self) -> &str {
        &self.write_key
    }

    pub fn data_plane_url(&self) -> &str {
        &self.data_plane_url
    }

    /// `Content-Type` and `Authorization` headers sent with every batch.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn non_retryable_policy(&self) -> NonRetryablePolicy {
        self.non_retryable_policy
    }

    pub fn max_buffered_events(&self) -> Option<usize> {
        self.max_buffered_events
    }
}

/// `Basic` credentials with the write key as user name and an empty password.
pub fn basic_auth(write_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{write_key}:")))
}
