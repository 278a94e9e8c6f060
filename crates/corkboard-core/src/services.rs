// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{config::BoardConfig, error::ServicesError};
use corkboard_http::server::BoardServer;
use corkboard_intake::journal::JournalService;
use corkboard_intake::udp::{UdpIntake, UdpIntakeConfig};

/// Status of the board services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Services are starting up.
    Starting,
    /// Services are running normally.
    Running,
    /// Services are shutting down.
    Stopping,
    /// Services have stopped.
    Stopped,
}

/// Handle to the running board services.
///
/// This handle allows checking the status and stopping the services.
#[derive(Debug, Clone)]
pub struct ServicesHandle {
    status: Arc<RwLock<ServiceStatus>>,
    status_tx: broadcast::Sender<ServiceStatus>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ServicesHandle {
    /// Check if the services are currently running.
    pub async fn is_running(&self) -> bool {
        matches!(*self.status.read().await, ServiceStatus::Running)
    }

    /// Get a receiver for status updates.
    pub fn status_receiver(&self) -> broadcast::Receiver<ServiceStatus> {
        self.status_tx.subscribe()
    }

    /// Stop the services.
    pub async fn stop(&self) -> Result<(), ServicesError> {
        let mut status = self.status.write().await;
        if *status == ServiceStatus::Stopped {
            return Err(ServicesError::NotRunning);
        }

        *status = ServiceStatus::Stopping;
        drop(status);

        // Signal shutdown
        let _ = self.shutdown_tx.send(());

        Ok(())
    }
}

/// Main board services coordinator.
///
/// Manages the lifecycle of the journal writer, the HTTP endpoint, and the
/// optional UDP intake.
#[derive(Debug)]
pub struct BoardServices {
    config: BoardConfig,
}

impl BoardServices {
    /// Create a new BoardServices instance.
    pub fn new(config: BoardConfig) -> Self {
        Self { config }
    }

    /// Start the board services.
    ///
    /// This starts the HTTP endpoint and, when enabled in the configuration,
    /// the UDP intake. Returns a handle that can be used to monitor and
    /// control the services.
    pub async fn start(self) -> Result<ServicesHandle, ServicesError> {
        self.config.validate()?;

        let status = Arc::new(RwLock::new(ServiceStatus::Starting));
        let (status_tx, _status_rx) = broadcast::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(16);

        let handle = ServicesHandle {
            status: Arc::clone(&status),
            status_tx: status_tx.clone(),
            shutdown_tx,
        };

        // Spawn the main services task
        let status_clone = Arc::clone(&status);
        let stopped_tx = status_tx.clone();
        let config = self.config;
        tokio::spawn(async move {
            if let Err(e) = run_services(config, shutdown_rx, status_tx, Arc::clone(&status_clone)).await
            {
                error!("Services error: {e}");
            }
            // Ensure we mark as stopped on any exit path
            let mut s = status_clone.write().await;
            *s = ServiceStatus::Stopped;
            drop(s);
            let _ = stopped_tx.send(ServiceStatus::Stopped);
        });

        // Wait for services to reach Running state
        let mut timeout = tokio::time::interval(std::time::Duration::from_millis(100));
        for _ in 0..50 {
            timeout.tick().await;
            if *status.read().await == ServiceStatus::Running {
                break;
            }
        }

        Ok(handle)
    }
}

async fn run_services(
    config: BoardConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
    status_tx: broadcast::Sender<ServiceStatus>,
    status: Arc<RwLock<ServiceStatus>>,
) -> Result<(), ServicesError> {
    debug!("Starting board services");

    // All appends from both ingress paths funnel through this one service.
    let (journal_service, journal_handle) = JournalService::new(&config.journal_path);
    let mut journal_task = tokio::spawn(journal_service.run());

    let server = BoardServer {
        port: config.http_port,
        asset_dir: config.asset_dir.clone(),
        journal: journal_handle.clone(),
    };
    let listener = server
        .bind()
        .await
        .map_err(|e| ServicesError::HttpStart(e.to_string()))?;
    info!("board-http: listening on port {}", config.http_port);
    let mut http_task = tokio::spawn(async move {
        if let Err(e) = server.serve(listener).await {
            error!("Error while serving the board HTTP endpoint: {e}");
        }
    });

    let udp_cancel = CancellationToken::new();
    let mut udp_task = if config.use_udp {
        let udp_config = UdpIntakeConfig {
            host: config.udp_host.clone(),
            port: config.udp_port,
        };
        let intake = UdpIntake::bind(&udp_config, journal_handle.clone(), udp_cancel.clone())
            .await
            .map_err(|e| ServicesError::UdpStart(e.to_string()))?;
        info!(
            "udp-intake: listening on {}:{}",
            config.udp_host, config.udp_port
        );
        Some(tokio::spawn(intake.spin()))
    } else {
        info!("udp intake disabled");
        None
    };

    {
        let mut s = status.write().await;
        *s = ServiceStatus::Running;
    }
    let _ = status_tx.send(ServiceStatus::Running);
    debug!("Board services running");

    tokio::select! {
        _ = shutdown_rx.recv() => {
            info!("Shutdown requested");
        }
        res = &mut http_task => {
            return Err(ServicesError::Runtime(format!(
                "HTTP endpoint task terminated unexpectedly: {res:?}"
            )));
        }
        res = &mut journal_task => {
            return Err(ServicesError::Runtime(format!(
                "Journal service terminated unexpectedly: {res:?}"
            )));
        }
        res = async {
            match udp_task.as_mut() {
                Some(task) => task.await,
                None => std::future::pending().await,
            }
        } => {
            return Err(ServicesError::Runtime(format!(
                "UDP intake task terminated unexpectedly: {res:?}"
            )));
        }
    }

    {
        let mut s = status.write().await;
        *s = ServiceStatus::Stopping;
    }
    let _ = status_tx.send(ServiceStatus::Stopping);

    // Drain in dependency order: stop the ingress tasks, then let the journal
    // service work through anything still queued before it exits.
    udp_cancel.cancel();
    if let Some(task) = udp_task.take() {
        let _ = task.await;
    }
    http_task.abort();
    let _ = journal_handle.shutdown();
    let _ = journal_task.await;

    Ok(())
}
