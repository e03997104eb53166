// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::mapping::{self, MappingTable};
use crate::path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ingestion event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Identify,
    Alias,
    Page,
    Group,
    Track,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Identify => "identify",
            EventType::Alias => "alias",
            EventType::Page => "page",
            EventType::Group => "group",
            EventType::Track => "track",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub event_type: EventType,
    pub mapping: &'static MappingTable,
}

fn fallback() -> Classification {
    Classification {
        event_type: EventType::Track,
        mapping: &mapping::TRACK,
    }
}

/// Classifies a capture event name. Unknown names are tracked with the
/// minimal `track` table.
pub fn classify_name(name: &str) -> Classification {
    let (event_type, mapping) = match name {
        "$identify" => (EventType::Identify, &mapping::IDENTIFY),
        "$create_alias" => (EventType::Alias, &mapping::ALIAS),
        "$pageview" | "$page" => (EventType::Page, &mapping::PAGE),
        "$group" => (EventType::Group, &mapping::GROUP),
        "$autocapture" => (EventType::Track, &mapping::AUTO_CAPTURE),
        _ => return fallback(),
    };
    Classification {
        event_type,
        mapping,
    }
}

/// Classifies a capture event by its `event` field. A missing or non-string
/// discriminator falls back to `track`.
pub fn classify(event: &Value) -> Classification {
    match path::get(event, "event").and_then(Value::as_str) {
        Some(name) => classify_name(name),
        None => fallback(),
    }
}
