// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use core::time::Duration;
use reqwest::Url;
use std::env;

pub const DEFAULT_LOG_LEVEL: &str = "info";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// What to do with a batch the data plane rejected with a non-retryable status
/// (any non-2xx status other than 5xx and 429).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonRetryablePolicy {
    /// Count the batch as delivered and clear the buffer.
    #[default]
    Drop,
    /// Treat the rejection as a delivery failure and buffer the batch.
    Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Write key used for authentication and as the buffer key
    pub write_key: String,
    /// Batch endpoint of the data plane
    pub data_plane_url: String,
    /// Per-request timeout. Requests never time out when unset
    pub request_timeout: Option<Duration>,
    pub proxy_url: Option<String>,
    pub log_level: String,
    pub non_retryable_policy: NonRetryablePolicy,
    /// Maximum number of events kept in a merged batch; oldest are dropped first
    pub max_buffered_events: Option<usize>,
}

impl RelayConfig {
    pub fn new(write_key: impl Into<String>, data_plane_url: impl Into<String>) -> Self {
        RelayConfig {
            write_key: write_key.into(),
            data_plane_url: data_plane_url.into(),
            request_timeout: None,
            proxy_url: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            non_retryable_policy: NonRetryablePolicy::default(),
            max_buffered_events: None,
        }
    }

    /// Reads the configuration from `RELAY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let write_key =
            env::var("RELAY_WRITE_KEY").map_err(|_| ConfigError::MissingVar("RELAY_WRITE_KEY"))?;
        let data_plane_url = env::var("RELAY_DATA_PLANE_URL")
            .map_err(|_| ConfigError::MissingVar("RELAY_DATA_PLANE_URL"))?;

        let request_timeout = match env::var("RELAY_REQUEST_TIMEOUT_SECS") {
            Ok(secs) => Some(Duration::from_secs(secs.trim().parse::<u64>().map_err(
                |_| {
                    ConfigError::Invalid(format!(
                        "RELAY_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"
                    ))
                },
            )?)),
            Err(_) => None,
        };

        let proxy_url = env::var("RELAY_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        let log_level = env::var("RELAY_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let non_retryable_policy = match env::var("RELAY_BUFFER_NON_RETRYABLE") {
            Ok(val) if val.to_lowercase() == "true" => NonRetryablePolicy::Buffer,
            _ => NonRetryablePolicy::Drop,
        };

        let max_buffered_events = match env::var("RELAY_MAX_BUFFERED_EVENTS") {
            Ok(val) => Some(val.trim().parse::<usize>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "RELAY_MAX_BUFFERED_EVENTS must be a positive integer, got '{val}'"
                ))
            })?),
            Err(_) => None,
        };

        let config = RelayConfig {
            write_key,
            data_plane_url,
            request_timeout,
            proxy_url,
            log_level,
            non_retryable_policy,
            max_buffered_events,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_key.trim().is_empty() {
            return Err(ConfigError::Invalid("write key cannot be empty".to_string()));
        }

        let url = Url::parse(&self.data_plane_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "data plane URL '{}' is not a valid URL: {e}",
                self.data_plane_url
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "data plane URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if self.max_buffered_events == Some(0) {
            return Err(ConfigError::Invalid(
                "max buffered events must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
