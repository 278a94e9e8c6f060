// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use hyper::service::service_fn;
use hyper::{http, Method, Request, Response, StatusCode};
use tracing::{debug, error};

use corkboard_intake::journal::JournalHandle;

use crate::http_utils::{log_and_create_error_response, Body};
use crate::{assets, submission};

const SUBMIT_ENDPOINT_PATH: &str = "/submit";

/// The board's HTTP endpoint: form submissions on `POST /submit`, static
/// pages for everything GET.
pub struct BoardServer {
    pub port: u16,
    pub asset_dir: PathBuf,
    pub journal: JournalHandle,
}

impl BoardServer {
    /// Binds the TCP listener on all interfaces.
    ///
    /// Split from [`serve`] so callers can surface bind failures before the
    /// accept loop is spawned.
    ///
    /// [`serve`]: BoardServer::serve
    pub async fn bind(&self) -> io::Result<tokio::net::TcpListener> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tokio::net::TcpListener::bind(&addr).await
    }

    /// Runs the accept/serve loop until the process terminates or the
    /// listener fails.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!("Board server started: listening on port {}", self.port);

        let journal = self.journal.clone();
        let asset_dir = Arc::new(self.asset_dir.clone());
        let service = service_fn(move |req| {
            // called for each http request
            let journal = journal.clone();
            let asset_dir = Arc::clone(&asset_dir);
            async move { Self::endpoint_handler(req, journal, asset_dir).await }
        });

        Self::serve_tcp(listener, service).await
    }

    async fn serve_tcp<S>(
        listener: tokio::net::TcpListener,
        service: S,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        S: hyper::service::Service<
                Request<hyper::body::Incoming>,
                Response = Response<Body>,
            > + Clone
            + Send
            + 'static,
        S::Future: Send,
        S::Error: std::error::Error + Send + Sync + 'static,
    {
        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();

        loop {
            let conn = tokio::select! {
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e.into());
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        // Don't kill server on panic - log and continue
                        error!("Connection handler panicked: {:?}", e);
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
            };
            let conn = hyper_util::rt::TokioIo::new(conn);
            let server = server.clone();
            let service = service.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }
    }

    async fn endpoint_handler<B>(
        req: Request<B>,
        journal: JournalHandle,
        asset_dir: Arc<PathBuf>,
    ) -> http::Result<Response<Body>>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        match (req.method(), req.uri().path()) {
            (&Method::POST, SUBMIT_ENDPOINT_PATH) => {
                submission::handle_form_submission(req, &journal).await
            }
            (&Method::POST, path) => log_and_create_error_response(
                &format!("No POST endpoint at {path}"),
                StatusCode::NOT_FOUND,
            ),
            (&Method::GET, path) => assets::serve_asset(&asset_dir, path).await,
            (method, _) => log_and_create_error_response(
                &format!("Unsupported method: {method}"),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
        }
    }
}
