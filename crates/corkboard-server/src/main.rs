// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use corkboard_core::{BoardConfig, BoardServices, ServiceStatus};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() {
    let config = BoardConfig::default();

    let env_filter = format!("hyper=off,hyper_util=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
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
    debug!("Starting board services");

    let handle = match BoardServices::new(config).start().await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Error starting board services: {e}");
            return;
        }
    };

    if !handle.is_running().await {
        error!("Board services failed to reach the running state");
        return;
    }

    let mut status_rx = handle.status_receiver();

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupt received, shutting down"),
        Err(e) => {
            error!("Failed to listen for interrupt: {e}");
            return;
        }
    }

    if let Err(e) = handle.stop().await {
        error!("Error stopping board services: {e}");
        return;
    }

    // Wait for the services task to finish draining before exiting.
    while let Ok(status) = status_rx.recv().await {
        if status == ServiceStatus::Stopped {
            break;
        }
    }

    info!("Board services stopped");
}
