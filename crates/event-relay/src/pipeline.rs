// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::cache::Cache;
use crate::delivery::{DeliveryManager, DeliveryOutcome};
use crate::error::TransformError;
use crate::state::ProcessState;
use crate::transformer::transform_batch;
use crate::transport::Transport;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Per-batch entry point. Transforms the incoming capture events, delivers
/// them with any buffered backlog, and hands the original events back to the
/// caller.
pub struct Pipeline {
    delivery: DeliveryManager,
}

impl Pipeline {
    pub fn new(
        state: Arc<ProcessState>,
        cache: Arc<dyn Cache>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Pipeline {
            delivery: DeliveryManager::new(state, cache, transport),
        }
    }

    /// Returns `events` unchanged once delivery has been attempted.
    ///
    /// Delivery failures never surface here; only an event without a usable
    /// `properties` map aborts the batch, before anything is sent.
    pub async fn process_event_batch(
        &self,
        events: Vec<Value>,
    ) -> Result<Vec<Value>, TransformError> {
        debug!("Processing batch of {} events", events.len());
        let batch = match transform_batch(&events) {
            Ok(batch) => batch,
            Err(e) => {
                error!("Failed to transform batch: {e}");
                return Err(e);
            }
        };

        match self.delivery.send(batch).await {
            DeliveryOutcome::Delivered { events, status } => {
                info!("Delivered {events} events ({})", status.as_u16());
            }
            DeliveryOutcome::Dropped { events, status } => {
                info!("Dropped {events} events rejected with {}", status.as_u16());
            }
            DeliveryOutcome::Buffered { events } => {
                info!("Buffered {events} events for the next batch");
            }
            DeliveryOutcome::Lost { events } => {
                error!("Lost {events} events");
            }
        }
        Ok(events)
    }
}
