// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The body posted to the batch ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundBatch {
    pub batch: Vec<Value>,
    #[serde(rename = "sentAt")]
    pub sent_at: String,
}

impl OutboundBatch {
    /// Wraps `batch`, stamping `sentAt` with the current time.
    pub fn new(batch: Vec<Value>) -> Self {
        OutboundBatch {
            batch,
            sent_at: now_iso8601(),
        }
    }

    /// Appends `fresh` after the events of `backlog`, if any, under a new `sentAt`.
    pub fn merge(backlog: Option<OutboundBatch>, fresh: OutboundBatch) -> Self {
        let batch = match backlog {
            Some(mut backlog) => {
                backlog.batch.extend(fresh.batch);
                backlog.batch
            }
            None => fresh.batch,
        };
        OutboundBatch::new(batch)
    }

    /// Keeps only the newest `max_events` events. Returns how many were dropped.
    pub fn truncate_oldest(&mut self, max_events: usize) -> usize {
        let excess = self.batch.len().saturating_sub(max_events);
        if excess > 0 {
            self.batch.drain(..excess);
        }
        excess
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

/// UTC timestamp with millisecond precision, e.g. `2024-03-01T12:00:00.000Z`.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
