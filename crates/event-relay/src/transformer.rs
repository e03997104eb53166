// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Rewrites capture events into ingestion events.
//!
//! Every event goes through three passes, in this order:
//!
//! 1. the generic table (identity, context, page and screen fields),
//! 2. the table picked by [`crate::classifier::classify`], after `type` is set,
//! 3. passthrough of custom properties, i.e. every `properties` key that does
//!    not start with `$` and whose value is not null, copied verbatim.

use crate::batch::OutboundBatch;
use crate::classifier;
use crate::error::TransformError;
use crate::mapping;
use crate::path;
use crate::payload::construct_payload;
use serde_json::{Map, Value};
use tracing::debug;

const RESERVED_PREFIX: char = '$';

/// Transforms a single capture event. `index` is only used for error reporting.
pub fn transform_event(index: usize, event: &Value) -> Result<Value, TransformError> {
    debug!("Transforming event {index}: {event}");
    let mut output = Value::Object(Map::new());

    construct_payload(&mut output, event, &mapping::GENERIC);

    let classification = classifier::classify(event);
    path::set(
        &mut output,
        "type",
        Value::String(classification.event_type.as_str().to_string()),
    );
    construct_payload(&mut output, event, classification.mapping);

    let properties = match event.get("properties") {
        Some(Value::Object(properties)) => properties,
        None | Some(Value::Null) => return Err(TransformError::MissingProperties { index }),
        Some(_) => return Err(TransformError::PropertiesNotAMap { index }),
    };
    for (key, value) in properties {
        if key.starts_with(RESERVED_PREFIX) || value.is_null() {
            continue;
        }
        path::set_segments(&mut output, &["properties", key.as_str()], value.clone());
    }

    Ok(output)
}

/// Transforms `events` in order into one outbound batch.
///
/// Fails on the first malformed event; no partial batch is returned.
pub fn transform_batch(events: &[Value]) -> Result<OutboundBatch, TransformError> {
    let batch = events
        .iter()
        .enumerate()
        .map(|(index, event)| transform_event(index, event))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OutboundBatch::new(batch))
}
