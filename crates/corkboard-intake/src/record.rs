// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use chrono::Local;
use serde::Serialize;

// Local-time key for each journal entry, microsecond precision. Lexicographic
// order of rendered timestamps matches chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One timestamped username/message entry bound for the journal.
///
/// Field values are carried verbatim from the inbound payload; no trimming or
/// escaping is applied anywhere on the ingestion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub timestamp: String,
    pub username: String,
    pub message: String,
}

impl MessageRecord {
    /// Builds a record with a freshly generated ingestion timestamp.
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> MessageRecord {
        MessageRecord {
            timestamp: ingestion_timestamp(),
            username: username.into(),
            message: message.into(),
        }
    }

    /// Renders the record as one journal entry: a pretty-printed JSON object
    /// mapping the timestamp to the username/message pair.
    pub fn to_journal_entry(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Fields<'a> {
            username: &'a str,
            message: &'a str,
        }

        let entry = BTreeMap::from([(
            self.timestamp.as_str(),
            Fields {
                username: &self.username,
                message: &self.message,
            },
        )]);
        serde_json::to_string_pretty(&entry)
    }
}

/// Current local time in the journal's timestamp format.
pub fn ingestion_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
