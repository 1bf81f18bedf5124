//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every handler returns the shared domain error; this wrapper decides the
//! status code. Store and timeout failures are logged here with their full
//! detail — the client only ever sees the generic message and a 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use shelf_core::Error;

/// An error returned by an API handler.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::ColleagueNotFound(_) | Error::BookNotFound(_) => {
        StatusCode::NOT_FOUND
      }

      Error::OwnerNotFound(_)
      | Error::BookAlreadyBorrowed
      | Error::AlreadyCheckedOut
      | Error::BorrowedByOther
      | Error::NotCheckedOut
      | Error::BookCurrentlyBorrowed
      | Error::ColleagueHasActiveLoans
      | Error::NoFieldsToUpdate
      | Error::MissingFields(_) => StatusCode::BAD_REQUEST,

      e @ (Error::Storage(_) | Error::Unavailable) => {
        tracing::error!(error = %e, "store failure while handling request");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    (status, Json(json!({ "error": self.0.to_string() }))).into_response()
  }
}
