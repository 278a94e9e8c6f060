// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Static page and asset responder.
//!
//! Delegation target for every GET request. Files are read per-request from
//! the asset base directory; nothing is cached.

use std::path::Path;

use http_body_util::Full;
use hyper::{body::Bytes, header, http, Response, StatusCode};

use crate::http_utils::{log_and_create_error_response, Body};

/// Maps a request path to the asset file and content type that serve it.
///
/// Unknown paths get the error page, and the status stays 200 — existing
/// frontends depend on that, so it is not corrected to 404 here.
pub(crate) fn asset_for_path(path: &str) -> (&'static str, &'static str) {
    match path {
        "/" => ("index.html", "text/html"),
        "/message" => ("message.html", "text/html"),
        "/style.css" => ("style.css", "text/css"),
        "/logo.png" => ("logo.png", "image/png"),
        _ => ("error.html", "text/html"),
    }
}

pub async fn serve_asset(asset_dir: &Path, path: &str) -> http::Result<Response<Body>> {
    let (filename, content_type) = asset_for_path(path);

    match tokio::fs::read(asset_dir.join(filename)).await {
        Ok(contents) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .body(Full::new(Bytes::from(contents))),
        Err(e) => log_and_create_error_response(
            &format!("Error reading asset {filename}: {e}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}
