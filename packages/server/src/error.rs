//! The single error type returned by every handler.
//!
//! Whatever goes wrong, the client sees `500 Internal Server Error` with a
//! fixed plain-text body. The detailed error is only written to the log.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use stpaul_crime_database::DbError;
use stpaul_crime_database_models::BoundsParseError;
use stpaul_crime_ingest::IngestError;

/// Body sent with every failed request.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Errors from request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A store query or statement failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The populate run failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The `bounds` query parameter could not be parsed.
    #[error("Invalid bounds: {0}")]
    InvalidBounds(#[from] BoundsParseError),

    /// The request body or query string could not be extracted.
    #[error("Invalid request: {0}")]
    Input(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("{self}");

        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(INTERNAL_ERROR_BODY)
    }
}

/// Routes JSON body extraction failures through [`ApiError`] instead of
/// Actix's default `400`.
#[allow(clippy::needless_pass_by_value)]
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    ApiError::Input(format!("{} {}: {err}", req.method(), req.path())).into()
}

/// Routes query string extraction failures through [`ApiError`].
#[allow(clippy::needless_pass_by_value)]
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    ApiError::Input(format!("{} {}: {err}", req.method(), req.path())).into()
}
