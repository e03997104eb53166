// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of outbound batches to the data plane.
//!
//! Every call merges the buffered backlog (if any) in front of the fresh
//! batch and posts the result once, retrying a single time on 5xx, 429 or a
//! transport error:
//!
//! ```text
//!   cache.get(write key) ──> backlog ++ fresh ──> POST ──┬─ ok ────> cache.expire(key, 0)
//!                                                     └─ failed ─> cache.set(key, merged)
//! ```
//!
//! At most one batch is ever buffered. A failure overwrites the buffer with the
//! merged batch, so the backlog keeps growing until a delivery succeeds unless
//! a cap is configured. When the buffer cannot be read the fresh batch is sent
//! alone and the buffer is left as it was.

use crate::batch::OutboundBatch;
use crate::cache::Cache;
use crate::config::NonRetryablePolicy;
use crate::error::{AttemptError, CacheError, DeliveryError};
use crate::state::ProcessState;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// The initial attempt plus one retry.
pub const MAX_ATTEMPTS: usize = 2;

/// 5xx and 429 responses are worth one more attempt.
pub fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Sends `request`, retrying once without delay on a retryable status or a
/// transport error.
///
/// A non-retryable error status is returned as a normal response.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    request: &HttpRequest,
) -> Result<HttpResponse, DeliveryError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt(transport, request).await {
            Ok(response) => return Ok(response),
            Err(e) if attempts >= MAX_ATTEMPTS => {
                error!(
                    "{} request to {} failed after {} attempts: {}",
                    request.method, request.url, attempts, e
                );
                return Err(DeliveryError::RetriesExhausted {
                    method: request.method.clone(),
                    url: request.url.clone(),
                    attempts,
                    source: e,
                });
            }
            Err(e) => {
                warn!(
                    "Request to {} failed (attempt {}): {}. Sending payload again",
                    request.url, attempts, e
                );
            }
        }
    }
}

async fn attempt(
    transport: &dyn Transport,
    request: &HttpRequest,
) -> Result<HttpResponse, AttemptError> {
    debug!("Sending {} bytes to {}", request.body.len(), request.url);
    let response = transport.fetch(request).await?;
    debug!(
        "Response: {} {} {}",
        response.status.as_u16(),
        response.status_text,
        response.body
    );
    if !response.is_ok() && is_retryable(response.status) {
        return Err(AttemptError::RetryableStatus {
            status: response.status,
            status_text: response.status_text,
        });
    }
    Ok(response)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The data plane accepted the batch. The buffer was cleared if it could
    /// be read.
    Delivered { events: usize, status: StatusCode },
    /// The data plane rejected the batch with a non-retryable status and the
    /// batch was discarded.
    Dropped { events: usize, status: StatusCode },
    /// Delivery failed and the merged batch now sits in the buffer.
    Buffered { events: usize },
    /// Delivery failed and the batch could not be buffered, either because
    /// storing failed or because an unread buffer would have been overwritten.
    Lost { events: usize },
}

pub struct DeliveryManager {
    state: Arc<ProcessState>,
    cache: Arc<dyn Cache>,
    transport: Arc<dyn Transport>,
    // serializes the read-modify-write of the buffer entry
    buffer_lock: Mutex<()>,
}

impl DeliveryManager {
    pub fn new(
        state: Arc<ProcessState>,
        cache: Arc<dyn Cache>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        DeliveryManager {
            state,
            cache,
            transport,
            buffer_lock: Mutex::new(()),
        }
    }

    /// Delivers `fresh` together with any buffered backlog. Never fails; the
    /// outcome is reported for logging.
    pub async fn send(&self, fresh: OutboundBatch) -> DeliveryOutcome {
        let _guard = self.buffer_lock.lock().await;
        let key = self.state.buffer_key();

        // a buffer that could not be read is neither cleared nor overwritten
        let (backlog, buffer_read) = match self.load_backlog(key).await {
            Ok(backlog) => (backlog, true),
            Err(e) => {
                warn!("Failed to read buffered batch, leaving it in place: {e}");
                (None, false)
            }
        };
        let mut payload = OutboundBatch::merge(backlog, fresh);
        if let Some(max_events) = self.state.max_buffered_events() {
            let dropped = payload.truncate_oldest(max_events);
            if dropped > 0 {
                warn!("Backlog exceeds {max_events} events, dropped the {dropped} oldest");
            }
        }
        let events = payload.len();

        match self.deliver(&payload).await {
            Ok(response) => {
                info!(
                    "Sending payload to the data plane gave a response ({})",
                    response.status.as_u16()
                );
                if buffer_read {
                    debug!("Clearing buffered data");
                    if let Err(e) = self.cache.expire(key, 0).await {
                        warn!("Failed to clear buffered batch: {e}");
                    }
                }
                if response.is_ok() {
                    DeliveryOutcome::Delivered {
                        events,
                        status: response.status,
                    }
                } else {
                    warn!(
                        "Data plane rejected {events} events with {} {}: {}. Data dropped",
                        response.status.as_u16(),
                        response.status_text,
                        response.body
                    );
                    DeliveryOutcome::Dropped {
                        events,
                        status: response.status,
                    }
                }
            }
            Err(e) => {
                error!("Failed to deliver {events} events: {e}");
                if !buffer_read {
                    error!("Buffered batch was not read, not overwriting it. {events} events dropped");
                    return DeliveryOutcome::Lost { events };
                }
                self.store_backlog(key, &payload).await
            }
        }
    }

    async fn deliver(&self, payload: &OutboundBatch) -> Result<HttpResponse, DeliveryError> {
        let request = HttpRequest {
            url: self.state.data_plane_url().to_string(),
            method: Method::POST,
            headers: self.state.headers().clone(),
            body: serde_json::to_vec(payload)?,
        };
        let response = fetch_with_retry(self.transport.as_ref(), &request).await?;

        if !response.is_ok() && self.state.non_retryable_policy() == NonRetryablePolicy::Buffer {
            return Err(DeliveryError::Rejected {
                method: request.method,
                url: request.url,
                status: response.status,
            });
        }
        Ok(response)
    }

    /// `Ok(None)` when nothing usable is buffered, `Err` when the cache could
    /// not be read at all.
    async fn load_backlog(&self, key: &str) -> Result<Option<OutboundBatch>, CacheError> {
        let Some(blob) = self.cache.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Option<OutboundBatch>>(&blob) {
            Ok(backlog) => {
                if let Some(backlog) = &backlog {
                    debug!("Found {} buffered events", backlog.len());
                }
                Ok(backlog)
            }
            Err(e) => {
                warn!("Discarding unreadable buffered batch: {e}");
                Ok(None)
            }
        }
    }

    async fn store_backlog(&self, key: &str, payload: &OutboundBatch) -> DeliveryOutcome {
        let events = payload.len();
        let blob = match serde_json::to_string(payload) {
            Ok(blob) => blob,
            Err(e) => {
                error!("Failed to serialize {events} events for buffering. Data dropped: {e}");
                return DeliveryOutcome::Lost { events };
            }
        };
        match self.cache.set(key, blob).await {
            Ok(()) => {
                info!("Stored {events} failed events in the buffer");
                DeliveryOutcome::Buffered { events }
            }
            Err(e) => {
                error!("Failed to buffer {events} events. Data dropped: {e}");
                DeliveryOutcome::Lost { events }
            }
        }
    }
}
