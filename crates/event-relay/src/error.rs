// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for each stage of the relay.

use reqwest::StatusCode;

/// Errors raised while reading or validating [`crate::config::RelayConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid header value derived from configuration: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Errors raised while turning capture events into ingestion events.
///
/// A transform error aborts the whole batch; no partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("event at index {index} has no properties map")]
    MissingProperties { index: usize },

    #[error("event at index {index} has properties that are not a map")]
    PropertiesNotAMap { index: usize },
}

/// Errors raised by a [`crate::transport::Transport`] before any response was received.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connectivity(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Errors raised by a [`crate::cache::Cache`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// A single delivery attempt that should be retried.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("request failed with {} {status_text}", .status.as_u16())]
    RetryableStatus {
        status: StatusCode,
        status_text: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Delivery failed for good and the batch must be buffered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("{method} request to {url} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        method: reqwest::Method,
        url: String,
        attempts: usize,
        #[source]
        source: AttemptError,
    },

    #[error("{method} request to {url} was rejected with {status}")]
    Rejected {
        method: reqwest::Method,
        url: String,
        status: StatusCode,
    },

    #[error("failed to serialize outbound batch: {0}")]
    Serialize(#[from] serde_json::Error),
}
