//! Handlers for the loan transition endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/borrow` | Body: [`TransitionBody`]; both ids required |
//! | `POST` | `/return` | Body: [`TransitionBody`]; both ids required |
//!
//! Both endpoints return the fresh joined book view on success. The store
//! performs the ledger write and the status flip in one transaction, so a
//! client never observes the two out of step.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use shelf_core::{Error, store::LendingStore};
use uuid::Uuid;

use crate::{books::BookEnvelope, error::ApiError};

/// JSON body accepted by `POST /borrow` and `POST /return`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
  pub book_id:      Option<Uuid>,
  pub colleague_id: Option<Uuid>,
}

impl TransitionBody {
  fn ids(self) -> Result<(Uuid, Uuid), ApiError> {
    match (self.book_id, self.colleague_id) {
      (Some(book_id), Some(colleague_id)) => Ok((book_id, colleague_id)),
      _ => Err(Error::MissingFields("Missing bookId or colleagueId").into()),
    }
  }
}

/// `POST /borrow`
pub async fn borrow<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<BookEnvelope>, ApiError>
where
  S: LendingStore,
{
  let (book_id, colleague_id) = body.ids()?;
  let book = store.borrow(book_id, colleague_id).await?;
  Ok(Json(BookEnvelope { book }))
}

/// `POST /return`
pub async fn return_book<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<BookEnvelope>, ApiError>
where
  S: LendingStore,
{
  let (book_id, colleague_id) = body.ids()?;
  let book = store.return_book(book_id, colleague_id).await?;
  Ok(Json(BookEnvelope { book }))
}
