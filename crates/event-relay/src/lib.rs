// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Relays batches of capture events (`event`, `distinct_id`, `properties`) to a
//! batch-ingestion data plane as `track`, `page`, `identify`, `group` and
//! `alias` events.
//!
//! A [`pipeline::Pipeline`] transforms each incoming batch with the static
//! [`mapping`] tables, posts it together with any previously failed batch, and
//! parks the merged batch in a [`cache::Cache`] when delivery fails.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod batch;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod delivery;
pub mod error;
pub mod http_client;
pub mod mapping;
pub mod path;
pub mod payload;
pub mod pipeline;
pub mod state;
pub mod transformer;
pub mod transport;
