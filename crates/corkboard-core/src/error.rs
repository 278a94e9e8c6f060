// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur when working with the board services
#[derive(Debug, thiserror::Error)]
pub enum ServicesError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start HTTP endpoint: {0}")]
    HttpStart(String),

    #[error("Failed to start UDP intake: {0}")]
    UdpStart(String),

    #[error("Services not running")]
    NotRunning,

    #[error("Runtime error: {0}")]
    Runtime(String),
}
