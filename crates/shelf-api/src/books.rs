//! Handlers for `/books` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/books` | Joined book views plus the full roster |
//! | `POST`   | `/books` | Body: [`CreateBookBody`]; title and author required |
//! | `PATCH`  | `/books/{id}` | Only keys present in the request are applied |
//! | `DELETE` | `/books/{id}` | Rejected while the book is borrowed |
//! | `GET`    | `/books/{id}/loans` | The book's full ledger, newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shelf_core::{
  Error,
  book::{BookDomain, BookPatch, NewBook},
  colleague::Colleague,
  loan::{BookView, Loan},
  store::LendingStore,
};
use uuid::Uuid;

use crate::{Ack, error::ApiError};

// ─── Response envelopes ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BooksIndex {
  pub books:      Vec<BookView>,
  pub colleagues: Vec<Colleague>,
}

#[derive(Debug, Serialize)]
pub struct BookEnvelope {
  pub book: BookView,
}

#[derive(Debug, Serialize)]
pub struct LoansEnvelope {
  pub loans: Vec<Loan>,
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /books`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<BooksIndex>, ApiError>
where
  S: LendingStore,
{
  let books = store.list_books_with_state().await?;
  let colleagues = store.list_colleagues().await?;
  Ok(Json(BooksIndex { books, colleagues }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookBody {
  pub title:          Option<String>,
  pub author:         Option<String>,
  pub cover_url:      Option<String>,
  pub synopsis:       Option<String>,
  pub year_published: Option<i32>,
  pub page_count:     Option<i32>,
  #[serde(default)]
  pub domains:        Vec<BookDomain>,
  pub owner_id:       Option<Uuid>,
}

/// `POST /books` — title and author are required; everything else defaults.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBookBody>,
) -> Result<Json<BookEnvelope>, ApiError>
where
  S: LendingStore,
{
  // Empty strings count as missing, same as absent keys.
  let title = body.title.filter(|t| !t.is_empty());
  let author = body.author.filter(|a| !a.is_empty());
  let (Some(title), Some(author)) = (title, author) else {
    return Err(
      Error::MissingFields("Missing required fields: title, author").into(),
    );
  };

  let book = store
    .add_book(NewBook {
      title,
      author,
      cover_url:      body.cover_url,
      synopsis:       body.synopsis,
      year_published: body.year_published,
      page_count:     body.page_count,
      domains:        body.domains,
      owner_id:       body.owner_id,
    })
    .await?;
  Ok(Json(BookEnvelope { book }))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /books/{id}`.
///
/// Absent keys leave a column unchanged; an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookBody {
  #[serde(default)]
  pub synopsis:       Option<Option<String>>,
  #[serde(default)]
  pub year_published: Option<Option<i32>>,
  #[serde(default)]
  pub page_count:     Option<Option<i32>>,
  #[serde(default)]
  pub domains:        Option<Vec<BookDomain>>,
  #[serde(default)]
  pub owner_id:       Option<Option<Uuid>>,
}

/// `PATCH /books/{id}` — a body with no recognised keys is rejected.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBookBody>,
) -> Result<Json<BookEnvelope>, ApiError>
where
  S: LendingStore,
{
  let patch = BookPatch {
    synopsis:       body.synopsis,
    year_published: body.year_published,
    page_count:     body.page_count,
    domains:        body.domains,
    owner_id:       body.owner_id,
  };
  let book = store.update_book(id, patch).await?;
  Ok(Json(BookEnvelope { book }))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /books/{id}`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError>
where
  S: LendingStore,
{
  store.delete_book(id).await?;
  Ok(Json(Ack { ok: true }))
}

// ─── Loan history ────────────────────────────────────────────────────────────

/// `GET /books/{id}/loans`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LoansEnvelope>, ApiError>
where
  S: LendingStore,
{
  let loans = store.loan_history(id).await?;
  Ok(Json(LoansEnvelope { loans }))
}
