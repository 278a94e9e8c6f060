// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod errors;
pub mod journal;
pub mod record;
pub mod udp;
