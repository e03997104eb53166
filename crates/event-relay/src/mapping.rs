// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Field mapping tables from the capture schema to the ingestion schema.
//!
//! Each row names a destination path on the outgoing payload and one or more
//! source paths on the incoming event. Sources are tried in order and the
//! first one that resolves to a non-null value wins. Downstream consumers rely
//! on these exact field names.

/// A single destination path and its ordered, non-empty list of source paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub destination: &'static str,
    pub sources: &'static [&'static str],
}

const fn field(destination: &'static str, sources: &'static [&'static str]) -> FieldMapping {
    FieldMapping {
        destination,
        sources,
    }
}

/// An ordered mapping table.
#[derive(Debug, PartialEq, Eq)]
pub struct MappingTable {
    pub name: &'static str,
    pub fields: &'static [FieldMapping],
}

impl MappingTable {
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn sources_for(&self, destination: &str) -> Option<&'static [&'static str]> {
        self.fields
            .iter()
            .find(|field| field.destination == destination)
            .map(|field| field.sources)
    }
}

pub static ALIAS: MappingTable = MappingTable {
    name: "alias",
    fields: &[
        field("userId", &["properties.alias"]),
        field("previousId", &["properties.distinct_id"]),
    ],
};

pub static PAGE: MappingTable = MappingTable {
    name: "page",
    fields: &[
        field("name", &["properties.name"]),
        field("properties.category", &["properties.category"]),
        field("properties.host", &["properties.$host"]),
        field("properties.url", &["properties.$current_url"]),
        field("properties.path", &["properties.$pathname"]),
        field("properties.referrer", &["properties.$referrer"]),
        field("properties.initial_referrer", &["properties.$initial_referrer"]),
        field("properties.referring_domain", &["properties.$referring_domain"]),
        field(
            "properties.initial_referring_domain",
            &["properties.$initial_referring_domain"],
        ),
    ],
};

pub static IDENTIFY: MappingTable = MappingTable {
    name: "identify",
    fields: &[field("context.traits", &["$set"]), field("traits", &["$set"])],
};

pub static GROUP: MappingTable = MappingTable {
    name: "group",
    fields: &[field("groupId", &["groupId"]), field("traits", &["traits"])],
};

pub static TRACK: MappingTable = MappingTable {
    name: "track",
    fields: &[field("event", &["event"])],
};

pub static AUTO_CAPTURE: MappingTable = MappingTable {
    name: "autoCapture",
    fields: &[
        field("event", &["properties.$event_type"]),
        field("properties.elements", &["properties.$elements"]),
    ],
};

pub static GENERIC: MappingTable = MappingTable {
    name: "generic",
    fields: &[
        field("context.os.name", &["properties.$os"]),
        field("context.browser", &["properties.$browser"]),
        field("context.page.host", &["properties.$host"]),
        field("context.page.url", &["properties.$current_url"]),
        field("context.page.path", &["properties.$pathname"]),
        field("context.page.referrer", &["properties.$referrer"]),
        field("context.page.initial_referrer", &["properties.$initial_referrer"]),
        field("context.page.referring_domain", &["properties.$referring_domain"]),
        field(
            "context.page.initial_referring_domain",
            &["properties.$initial_referring_domain"],
        ),
        field("context.browser_version", &["properties.$browser_version"]),
        field("context.screen.height", &["properties.$screen_height"]),
        field("context.screen.width", &["properties.$screen_width"]),
        field("context.channel", &["properties.$lib"]),
        field("context.ip", &["ip"]),
        field("messageId", &["$insert_id"]),
        field("originalTimestamp", &["sent_at"]),
        field("userId", &["$user_id", "distinct_id"]),
        field(
            "anonymousId",
            &[
                "properties.$anon_distinct_id",
                "properties.$device_id",
                "properties.distinct_id",
            ],
        ),
        field(
            "context.active_feature_flags",
            &["properties.$active_feature_flags"],
        ),
        field("context.posthog_version", &["properties.posthog_version"]),
        field("context.has_slack_webhook", &["properties.has_slack_webhook"]),
        field("context.token", &["properties.token"]),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TABLES: [&MappingTable; 7] =
        [&ALIAS, &PAGE, &IDENTIFY, &GROUP, &TRACK, &AUTO_CAPTURE, &GENERIC];

    #[test]
    fn test_every_field_has_a_source() {
        for table in ALL_TABLES {
            assert!(!table.is_empty(), "{} is empty", table.name);
            for field in table.iter() {
                assert!(
                    !field.sources.is_empty(),
                    "{}.{} has no source",
                    table.name,
                    field.destination
                );
            }
        }
    }

    #[test]
    fn test_destinations_are_unique() {
        for table in ALL_TABLES {
            let mut seen = std::collections::HashSet::new();
            for field in table.iter() {
                assert!(
                    seen.insert(field.destination),
                    "{} maps {} twice",
                    table.name,
                    field.destination
                );
            }
        }
    }

    #[test]
    fn test_generic_identity_candidates_in_order() {
        assert_eq!(
            GENERIC.sources_for("userId"),
            Some(&["$user_id", "distinct_id"][..])
        );
        assert_eq!(
            GENERIC.sources_for("anonymousId"),
            Some(
                &[
                    "properties.$anon_distinct_id",
                    "properties.$device_id",
                    "properties.distinct_id",
                ][..]
            )
        );
        assert_eq!(GENERIC.len(), 22);
    }

    #[test]
    fn test_alias_previous_id() {
        assert_eq!(
            ALIAS.sources_for("previousId"),
            Some(&["properties.distinct_id"][..])
        );
        assert_eq!(ALIAS.sources_for("missing"), None);
    }
}
