//! Decoding of the `POST /api/fetcher` payload.
//!
//! Each failure maps to one client-facing message; the first failing check wins.

use crate::adding::NewFetch;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::error::Category;
use thiserror::Error;

const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Invalid or lack of Content-Type")]
    UnsupportedMediaType,
    #[error("Request body must not be larger than 1MB.")]
    TooLarge,
    #[error("Request body must not be empty.")]
    Empty,
    #[error("Request body contains badly-formed JSON (at line {line}, column {column}).")]
    BadlyFormed { line: usize, column: usize },
    #[error("Request body contains unknown field {0}.")]
    UnknownField(String),
    #[error("Request body contains an invalid value: {0}.")]
    InvalidValue(String),
    #[error("Request body must contain only a single JSON object.")]
    MultipleObjects,
    #[error("Missing url and interval fields in JSON payload.")]
    MissingUrlAndInterval,
    #[error("Missing url field in JSON payload.")]
    MissingUrl,
    #[error("Missing interval field in JSON payload.")]
    MissingInterval,
}

impl PayloadError {
    pub fn status(&self) -> StatusCode {
        match self {
            PayloadError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PayloadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFetch {
    url: Option<String>,
    interval: Option<i64>,
}

/// A missing header is accepted; a present one must name JSON, parameters aside.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), PayloadError> {
    match content_type {
        None => Ok(()),
        Some(value) => {
            let media_type = value.split(';').next().unwrap_or_default().trim();
            if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
                Ok(())
            } else {
                Err(PayloadError::UnsupportedMediaType)
            }
        }
    }
}

/// Decodes exactly one JSON object carrying both `url` and `interval`.
pub fn decode(body: &[u8]) -> Result<NewFetch, PayloadError> {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<RawFetch>();

    let raw = match stream.next() {
        None => return Err(PayloadError::Empty),
        Some(Err(e)) => return Err(classify(e)),
        Some(Ok(raw)) => raw,
    };

    if stream.next().is_some() {
        return Err(PayloadError::MultipleObjects);
    }

    match (raw.url, raw.interval) {
        (Some(url), Some(interval)) => Ok(NewFetch { url, interval }),
        (None, None) => Err(PayloadError::MissingUrlAndInterval),
        (None, Some(_)) => Err(PayloadError::MissingUrl),
        (Some(_), None) => Err(PayloadError::MissingInterval),
    }
}

fn classify(e: serde_json::Error) -> PayloadError {
    match e.classify() {
        Category::Data => {
            let message = e.to_string();
            match unknown_field_name(&message) {
                Some(name) => PayloadError::UnknownField(format!("\"{}\"", name)),
                None => PayloadError::InvalidValue(message),
            }
        }
        Category::Syntax | Category::Eof | Category::Io => PayloadError::BadlyFormed {
            line: e.line(),
            column: e.column(),
        },
    }
}

// serde reports "unknown field `name`, expected ..."
fn unknown_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("unknown field `")?;
    rest.split('`').next()
}
