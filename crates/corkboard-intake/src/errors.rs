// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur while appending a record to the journal
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("Journal I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Journal service is not running")]
    ServiceStopped,
}
