// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Form-submission handler: the HTTP half of ingestion.
//!
//! Decodes a form-urlencoded POST body into username/message fields, appends
//! one timestamped record through the journal handle, and answers with a
//! redirect to the confirmation page.

use std::collections::HashMap;

use http_body_util::BodyExt;
use hyper::{http, Request, Response, StatusCode};
use tracing::debug;
use url::form_urlencoded;

use corkboard_intake::journal::JournalHandle;
use corkboard_intake::record::MessageRecord;

use crate::http_utils::{
    log_and_create_error_response, redirect_response, verify_request_content_length, Body,
};

const USERNAME_FIELD: &str = "username";
const MESSAGE_FIELD: &str = "message";

/// Where a successful submission is redirected; the query parameter signals
/// success to the confirmation page.
pub const CONFIRMATION_REDIRECT: &str = "/message?success";

// A submission is two short text fields; anything bigger is rejected upfront.
const MAX_FORM_CONTENT_LENGTH: usize = 64 * 1024;

pub async fn handle_form_submission<B>(
    req: Request<B>,
    journal: &JournalHandle,
) -> http::Result<Response<Body>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    debug!("Received form submission");
    let (parts, body) = req.into_parts();

    if let Some(response) = verify_request_content_length(
        &parts.headers,
        MAX_FORM_CONTENT_LENGTH,
        "Error processing submission",
    ) {
        return response;
    }

    let body_bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return log_and_create_error_response(
                &format!("Error reading submission body: {e}"),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let fields = parse_form_body(&body_bytes);
    let (Some(username), Some(message)) = (
        first_value(&fields, USERNAME_FIELD),
        first_value(&fields, MESSAGE_FIELD),
    ) else {
        return log_and_create_error_response(
            "Rejecting submission with missing username or message field",
            StatusCode::BAD_REQUEST,
        );
    };

    let record = MessageRecord::new(username, message);
    match journal.append(record).await {
        Ok(()) => redirect_response(CONFIRMATION_REDIRECT),
        Err(e) => log_and_create_error_response(
            &format!("Error appending record to journal: {e}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

/// Decodes a form-urlencoded body into a field-name -> values map.
///
/// Repeated fields collect multiple values; blank values are treated as
/// absent and never reach the presence check.
pub(crate) fn parse_form_body(body: &[u8]) -> HashMap<String, Vec<String>> {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in form_urlencoded::parse(body) {
        if value.is_empty() {
            continue;
        }
        fields.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    fields
}

// only the first value per field is used downstream
fn first_value<'a>(fields: &'a HashMap<String, Vec<String>>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(|values| values.first()).map(String::as_str)
}
