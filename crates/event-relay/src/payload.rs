// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::mapping::{FieldMapping, MappingTable};
use crate::path;
use serde_json::Value;
use tracing::trace;

/// Returns the first source value that is present and not null.
pub fn resolve_sources<'a>(input: &'a Value, field: &FieldMapping) -> Option<&'a Value> {
    field
        .sources
        .iter()
        .find_map(|source| path::get(input, *source).filter(|value| !value.is_null()))
}

/// Copies every mapped field of `input` into `output`.
///
/// Destinations whose sources are all absent or null are left untouched.
pub fn construct_payload(output: &mut Value, input: &Value, mapping: &MappingTable) {
    for field in mapping.iter() {
        let value = resolve_sources(input, field);
        trace!(
            "{} | mapping {} from {:?}: {:?}",
            mapping.name,
            field.destination,
            field.sources,
            value
        );
        if let Some(value) = value {
            path::set(output, field.destination, value.clone());
        }
    }
}
