use actix_web::http::header;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use scylla::errors::{ExecutionError, NewSessionError};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::constants::{ALLOWED_HEADERS, ALLOWED_METHODS, ALLOWED_ORIGIN};

#[derive(Debug)]
pub enum CounterError {
    /// A required environment value is absent or unusable.
    ConfigurationMissing(&'static str),
    /// The store could not be reached, authenticated against or queried.
    StoreUnreachable(String),
    /// A conditional write kept losing to concurrent writers.
    StoreConflict(&'static str),
    InternalServerError(String),
}

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterError::ConfigurationMissing(key) => {
                write!(f, "Configuration missing or invalid: {}", key)
            }
            CounterError::StoreUnreachable(e) => write!(f, "Store unreachable: {}", e),
            CounterError::StoreConflict(e) => write!(f, "Store conflict: {}", e),
            CounterError::InternalServerError(e) => write!(f, "Internal Server Error: {}", e),
        }
    }
}

impl Error for CounterError {}

impl ResponseError for CounterError {
    /// Every failure kind answers the same opaque 500. The detail is logged
    /// here and never reaches the response body.
    fn error_response(&self) -> HttpResponse {
        error!("request failed: {}", self);

        HttpResponse::InternalServerError()
            .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOWED_ORIGIN))
            .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
            .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
            .json(json!({
                "error": "Internal Server Error"
            }))
    }
}

impl From<ExecutionError> for CounterError {
    fn from(e: ExecutionError) -> Self {
        CounterError::StoreUnreachable(e.to_string())
    }
}

impl From<NewSessionError> for CounterError {
    fn from(e: NewSessionError) -> Self {
        CounterError::StoreUnreachable(e.to_string())
    }
}
