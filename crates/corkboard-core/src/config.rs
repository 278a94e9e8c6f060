// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::error::ServicesError;
use corkboard_intake::journal::DEFAULT_JOURNAL_PATH;

/// Configuration for the board services (HTTP endpoint and UDP intake).
///
/// The defaults are the board's fixed operating constants; the struct exists
/// so tests and embedders can override them programmatically.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// TCP port the HTTP endpoint listens on, all interfaces
    pub http_port: u16,
    /// Host the UDP intake binds to
    pub udp_host: String,
    /// UDP intake port
    pub udp_port: u16,
    /// Whether to run the UDP intake alongside the HTTP endpoint
    pub use_udp: bool,
    /// Path of the append-only journal file
    pub journal_path: PathBuf,
    /// Directory static pages and assets are served from
    pub asset_dir: PathBuf,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            http_port: 3000,
            udp_host: "127.0.0.1".to_string(),
            udp_port: 5000,
            use_udp: true,
            journal_path: PathBuf::from(DEFAULT_JOURNAL_PATH),
            asset_dir: PathBuf::from("."),
            log_level: "info".to_string(),
        }
    }
}

impl BoardConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ServicesError> {
        if self.http_port == 0 {
            return Err(ServicesError::InvalidConfig(
                "HTTP port must be greater than 0".to_string(),
            ));
        }

        if self.use_udp && self.udp_port == 0 {
            return Err(ServicesError::InvalidConfig(
                "UDP port must be greater than 0".to_string(),
            ));
        }

        if self.use_udp && self.udp_host.trim().is_empty() {
            return Err(ServicesError::InvalidConfig(
                "UDP host cannot be empty".to_string(),
            ));
        }

        if self.journal_path.file_name().is_none() {
            return Err(ServicesError::InvalidConfig(
                "Journal path must name a file".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ServicesError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
