// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use serde_json::Value;
use std::{env, sync::Arc};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use event_relay::{
    cache::InMemoryCache,
    config::{RelayConfig, DEFAULT_LOG_LEVEL},
    http_client::prepare_client_provider,
    pipeline::Pipeline,
    state::ProcessState,
    transport::ReqwestTransport,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("RELAY_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or(DEFAULT_LOG_LEVEL.to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    if let Err(e) = prepare_client_provider() {
        error!("{e}");
        return;
    }

    let config = match RelayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on event relay startup: {e}");
            return;
        }
    };

    let state = match ProcessState::setup(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Error setting up event relay: {e}");
            return;
        }
    };

    let transport = Arc::new(ReqwestTransport::from_settings(
        config.proxy_url.as_deref(),
        config.request_timeout,
    ));
    let pipeline = Pipeline::new(state, Arc::new(InMemoryCache::new()), transport);

    info!(
        "Event relay started, forwarding to {}",
        config.data_plane_url
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read from stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let events = match serde_json::from_str::<Vec<Value>>(&line) {
            Ok(events) => events,
            Err(e) => {
                error!("Skipping line that is not a JSON array of events: {e}");
                continue;
            }
        };

        match pipeline.process_event_batch(events).await {
            Ok(events) => {
                info!("Acknowledged {} events", events.len());
                let echoed = match serde_json::to_string(&events) {
                    Ok(echoed) => echoed,
                    Err(e) => {
                        error!("Failed to serialize processed events: {e}");
                        continue;
                    }
                };
                if let Err(e) = stdout.write_all(format!("{echoed}\n").as_bytes()).await {
                    error!("Failed to write to stdout: {e}");
                    break;
                }
            }
            Err(e) => error!("Batch rejected: {e}"),
        }
    }

    if let Err(e) = stdout.flush().await {
        error!("Failed to flush stdout: {e}");
    }
    info!("Input closed, shutting down event relay");
}
