// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle and configuration for the corkboard message board.
//!
//! [`BoardServices`] collapses the board's two deployment shapes (HTTP only,
//! HTTP plus UDP intake) into one configurable core: the HTTP endpoint is
//! mandatory, the UDP intake is an optional concurrent task, and both feed
//! the shared journal writer.

pub mod config;
pub mod error;
pub mod services;

pub use config::BoardConfig;
pub use error::ServicesError;
pub use services::{BoardServices, ServiceStatus, ServicesHandle};
