// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! UDP intake for message submissions.
//!
//! This module implements the datagram-facing half of ingestion: it receives
//! UDP payloads, decodes them as JSON username/message submissions, and
//! forwards each one to the journal writer. UDP is fire-and-forget — there is
//! no reply channel, so malformed payloads are dropped and append failures are
//! only logged. A single bad datagram must never take the listener down.

use std::net::SocketAddr;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::journal::JournalHandle;
use crate::record::MessageRecord;

// Receive buffer per datagram; anything larger is truncated at the socket.
const BUFFER_SIZE: usize = 1024;

/// Configuration for the UDP intake listener
pub struct UdpIntakeConfig {
    /// Host to bind the UDP socket to (e.g., "127.0.0.1")
    pub host: String,
    /// Port to bind the UDP socket to (e.g., 5000)
    pub port: u16,
}

/// Wire shape of one datagram. Both fields are required; serde rejects a
/// payload missing either one, which is how the presence check happens here.
#[derive(Debug, Deserialize)]
struct SubmissionPayload {
    username: String,
    message: String,
}

// DatagramReader abstracts the transport so tests can replay a fixed buffer.
enum DatagramReader {
    UdpSocket(tokio::net::UdpSocket),

    /// Mirror reader for testing - replays a fixed buffer
    #[allow(dead_code)]
    MirrorTest(Vec<u8>, SocketAddr),
}

impl DatagramReader {
    async fn read(&self) -> std::io::Result<(Vec<u8>, SocketAddr)> {
        match self {
            DatagramReader::UdpSocket(socket) => {
                let mut buf = [0; BUFFER_SIZE];
                let (amt, src) = socket.recv_from(&mut buf).await?;
                Ok((buf[..amt].to_owned(), src))
            }
            DatagramReader::MirrorTest(data, src) => Ok((data.clone(), *src)),
        }
    }
}

/// UDP listener that receives, decodes, and journals submissions.
pub struct UdpIntake {
    cancel_token: CancellationToken,
    journal_handle: JournalHandle,
    reader: DatagramReader,
}

impl UdpIntake {
    /// Binds the UDP socket and returns the intake, ready to [`spin`].
    ///
    /// [`spin`]: UdpIntake::spin
    pub async fn bind(
        config: &UdpIntakeConfig,
        journal_handle: JournalHandle,
        cancel_token: CancellationToken,
    ) -> std::io::Result<UdpIntake> {
        let addr = format!("{}:{}", config.host, config.port);
        let socket = tokio::net::UdpSocket::bind(addr).await?;

        Ok(UdpIntake {
            cancel_token,
            journal_handle,
            reader: DatagramReader::UdpSocket(socket),
        })
    }

    /// Main event loop that continuously receives and journals datagrams.
    pub async fn spin(self) {
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = self.consume_datagram() => {}
            }
        }
    }

    /// Receive one datagram, decode it, and append the resulting record.
    async fn consume_datagram(&self) {
        let (buf, src) = match self.reader.read().await {
            Ok(read) => read,
            Err(e) => {
                error!("Error receiving datagram: {e}");
                return;
            }
        };

        let payload = match std::str::from_utf8(&buf) {
            Ok(payload) => payload,
            Err(_) => {
                debug!("Discarding non-UTF-8 datagram from {src}");
                return;
            }
        };
        trace!("Received datagram: {} from {}", payload, src);

        let submission: SubmissionPayload = match serde_json::from_str(payload) {
            Ok(submission) => submission,
            Err(e) => {
                debug!("Discarding malformed datagram from {src}: {e}");
                return;
            }
        };

        let record = MessageRecord::new(submission.username, submission.message);
        if let Err(e) = self.journal_handle.append(record).await {
            // no sender to notify; the failure is logged and swallowed
            error!("Failed to journal datagram record: {e}");
        }
    }
}
