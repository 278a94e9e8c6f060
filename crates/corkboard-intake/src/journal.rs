// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Append-only journal writer.
//!
//! All writes are funneled through a single-consumer service task: the HTTP
//! endpoint and the UDP intake each hold a [`JournalHandle`] and send append
//! commands over a channel. One task performing every write means concurrent
//! submitters can never interleave bytes within a record, while the on-disk
//! format stays a plain sequence of newline-separated pretty-printed JSON
//! objects appended via an open-write-close cycle per record.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::errors::JournalError;
use crate::record::MessageRecord;

/// Default location of the journal, relative to the process working directory.
pub const DEFAULT_JOURNAL_PATH: &str = "storage/data.json";

#[derive(Debug)]
pub enum JournalCommand {
    Append(MessageRecord, oneshot::Sender<Result<(), JournalError>>),
    Shutdown,
}

/// Cheaply cloneable handle used by ingestion paths to reach the journal.
#[derive(Clone)]
pub struct JournalHandle {
    tx: mpsc::UnboundedSender<JournalCommand>,
}

impl JournalHandle {
    /// Appends one record, round-tripping the I/O result back to the caller.
    pub async fn append(&self, record: MessageRecord) -> Result<(), JournalError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(JournalCommand::Append(record, response_tx))
            .map_err(|_| JournalError::ServiceStopped)?;

        response_rx.await.map_err(|_| JournalError::ServiceStopped)?
    }

    pub fn shutdown(&self) -> Result<(), JournalError> {
        self.tx
            .send(JournalCommand::Shutdown)
            .map_err(|_| JournalError::ServiceStopped)
    }
}

/// Single consumer that owns the journal file and performs every append.
pub struct JournalService {
    path: PathBuf,
    rx: mpsc::UnboundedReceiver<JournalCommand>,
}

impl JournalService {
    pub fn new(path: impl Into<PathBuf>) -> (JournalService, JournalHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = JournalService {
            path: path.into(),
            rx,
        };
        let handle = JournalHandle { tx };

        (service, handle)
    }

    pub async fn run(mut self) {
        debug!("Journal service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                JournalCommand::Append(record, response_tx) => {
                    let result = self.append_record(&record);
                    if let Err(e) = &result {
                        error!("Failed to append record to journal: {e}");
                    }
                    if response_tx.send(result).is_err() {
                        error!("Failed to send append response - receiver dropped");
                    }
                }

                JournalCommand::Shutdown => {
                    debug!("Journal service shutting down");
                    break;
                }
            }
        }

        debug!("Journal service stopped");
    }

    fn append_record(&self, record: &MessageRecord) -> Result<(), JournalError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let entry = record.to_journal_entry()?;

        // open-append-close per record; the handle closes at end of scope
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{entry}")?;

        Ok(())
    }
}
