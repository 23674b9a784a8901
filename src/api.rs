//! HTTP front end for the duplicate scanner.
//!
//! - `POST /duplicates` with form fields `username` and `method` (`albums` or
//!   `tracks`) returns the duplicate groups as JSON
//! - `GET /health` answers `ok`

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::Deserialize;

use crate::clients::{DataKind, ScrobbleSource, errors::Error};
use crate::duplicates::DuplicateGroup;
use crate::scanner::Scanner;

/// Form body of `POST /duplicates`.
#[derive(Debug, Deserialize)]
pub struct DuplicatesRequest {
    pub username: Option<String>,
    pub method: Option<String>,
}

/// Error reply: a status code with a plain-text message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::UserNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidDataKind(_) => StatusCode::BAD_REQUEST,
            Error::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Build the router around a scanner.
pub fn router<S>(scanner: Scanner<S>) -> Router
where
    S: ScrobbleSource + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/duplicates", post(find_duplicates::<S>))
        .with_state(Arc::new(scanner))
}

async fn health() -> &'static str {
    "ok"
}

async fn find_duplicates<S>(
    State(scanner): State<Arc<Scanner<S>>>,
    Form(request): Form<DuplicatesRequest>,
) -> Result<Json<Vec<DuplicateGroup>>, ApiError>
where
    S: ScrobbleSource + Send + Sync + 'static,
{
    let (Some(username), Some(method)) = (
        request.username.filter(|u| !u.trim().is_empty()),
        request.method.filter(|m| !m.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request("Username and method are required"));
    };
    let kind: DataKind = method
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid method"))?;

    info!("Scanning {kind} for {username}");
    match scanner.scan(&username, kind).await {
        Ok(groups) => Ok(Json(groups)),
        Err(e) => {
            warn!("Scan of {kind} for {username} failed: {e}");
            Err(ApiError::from(e))
        }
    }
}
