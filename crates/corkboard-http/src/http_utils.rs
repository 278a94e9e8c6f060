// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use http_body_util::Full;
use hyper::{
    body::Bytes,
    header,
    http::{self, HeaderMap},
    Response, StatusCode,
};
use tracing::{debug, error};

/// Response body type used by every handler in this crate.
pub type Body = Full<Bytes>;

/// Does two things:
/// 1. Logs the given message. Server errors (5xx) are logged at error level,
///    everything else at debug.
/// 2. Returns a minimal HTML error page for the given status code, in the
///    `<h1>{code} - {reason}</h1>` shape the board's pages expect.
pub fn log_and_create_error_response(
    message: &str,
    status: StatusCode,
) -> http::Result<Response<Body>> {
    if status.is_server_error() {
        error!("{message}");
    } else {
        debug!("{message}");
    }
    error_page(status)
}

/// Minimal HTML error page for the given status code.
pub fn error_page(status: StatusCode) -> http::Result<Response<Body>> {
    let body = format!(
        "<h1>{} - {}</h1>",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html")
        .body(Full::new(Bytes::from(body)))
}

/// 302 redirect to the given location with an empty body.
pub fn redirect_response(location: &str) -> http::Result<Response<Body>> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Full::new(Bytes::new()))
}

/// Takes a request's header map, and verifies that the "content-length" and/or
/// "Transfer-Encoding" header is present, valid, and less than the given
/// max_content_length.
///
/// Returns None if no issues are found. Otherwise logs the problem (with the
/// given prefix) and returns an HTTP response with the appropriate error
/// status code.
pub fn verify_request_content_length(
    header_map: &HeaderMap,
    max_content_length: usize,
    error_message_prefix: &str,
) -> Option<http::Result<Response<Body>>> {
    let content_length_header = match header_map.get(header::CONTENT_LENGTH) {
        Some(res) => res,
        None => {
            if let Some(transfer_encoding_header) = header_map.get(header::TRANSFER_ENCODING) {
                debug!(
                    "Transfer-Encoding header is present: {:?}",
                    transfer_encoding_header
                );
                return None;
            }
            return Some(log_and_create_error_response(
                &format!(
                    "{error_message_prefix}: Missing Content-Length and Transfer-Encoding header"
                ),
                StatusCode::LENGTH_REQUIRED,
            ));
        }
    };

    let Ok(header_as_string) = content_length_header.to_str() else {
        return Some(log_and_create_error_response(
            &format!("{error_message_prefix}: Invalid Content-Length header"),
            StatusCode::BAD_REQUEST,
        ));
    };
    let Ok(content_length) = header_as_string.parse::<usize>() else {
        return Some(log_and_create_error_response(
            &format!("{error_message_prefix}: Invalid Content-Length header"),
            StatusCode::BAD_REQUEST,
        ));
    };

    if content_length > max_content_length {
        return Some(log_and_create_error_response(
            &format!("{error_message_prefix}: Payload too large"),
            StatusCode::PAYLOAD_TOO_LARGE,
        ));
    }
    None
}
