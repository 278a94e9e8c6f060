// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod assets;
pub mod http_utils;
pub mod server;
pub mod submission;
