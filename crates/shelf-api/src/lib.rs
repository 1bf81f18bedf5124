//! JSON REST API for the Shelf lending tracker.
//!
//! Exposes an axum [`Router`] backed by any
//! [`shelf_core::store::LendingStore`]. Auth, cache headers, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(shelf_api::api_router(store.clone()))
//! ```

pub mod books;
pub mod colleagues;
pub mod error;
pub mod loans;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use serde::Serialize;
use shelf_core::store::LendingStore;

pub use error::ApiError;

/// `{"ok": true}` — the body returned by both delete endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
  pub ok: bool,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: LendingStore + 'static,
{
  Router::new()
    // Catalog
    .route("/books", get(books::list::<S>).post(books::create::<S>))
    .route(
      "/books/{id}",
      patch(books::update::<S>).delete(books::remove::<S>),
    )
    .route("/books/{id}/loans", get(books::history::<S>))
    // Loan transitions
    .route("/borrow", post(loans::borrow::<S>))
    .route("/return", post(loans::return_book::<S>))
    // Roster
    .route(
      "/colleagues",
      get(colleagues::list::<S>).post(colleagues::create::<S>),
    )
    .route(
      "/colleagues/{id}",
      patch(colleagues::update::<S>).delete(colleagues::remove::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use shelf_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn send(
    store: &Arc<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    let resp = api_router(store.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Create a colleague and return its id.
  async fn colleague(store: &Arc<SqliteStore>, name: &str) -> String {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, body) = send(
      store,
      "POST",
      "/colleagues",
      Some(json!({ "name": name, "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["colleague"]["id"].as_str().unwrap().to_string()
  }

  /// Create a book and return its id.
  async fn book(store: &Arc<SqliteStore>, title: &str) -> String {
    let (status, body) = send(
      store,
      "POST",
      "/books",
      Some(json!({ "title": title, "author": "Anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["book"]["id"].as_str().unwrap().to_string()
  }

  // ── Listing ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn listing_empty_store_returns_empty_collections() {
    let s = store().await;
    let (status, body) = send(&s, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"], json!([]));
    assert_eq!(body["colleagues"], json!([]));
  }

  #[tokio::test]
  async fn listing_includes_books_and_roster() {
    let s = store().await;
    colleague(&s, "Alice").await;
    book(&s, "Thinking, Fast and Slow").await;

    let (status, body) = send(&s, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["colleagues"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["status"], "available");
    assert_eq!(body["books"][0]["borrowerName"], Value::Null);
  }

  // ── Catalog ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_book_requires_title_and_author() {
    let s = store().await;
    let (status, body) =
      send(&s, "POST", "/books", Some(json!({ "title": "No Author" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: title, author");

    // empty strings count as missing too
    let (status, _) = send(
      &s,
      "POST",
      "/books",
      Some(json!({ "title": "", "author": "Someone" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn create_book_rejects_unknown_owner() {
    let s = store().await;
    let (status, body) = send(
      &s,
      "POST",
      "/books",
      Some(json!({
        "title": "Orphan",
        "author": "Anonymous",
        "ownerId": uuid::Uuid::new_v4(),
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid owner ID"));
  }

  #[tokio::test]
  async fn create_book_with_full_metadata() {
    let s = store().await;
    let owner = colleague(&s, "Owner").await;
    let (status, body) = send(
      &s,
      "POST",
      "/books",
      Some(json!({
        "title": "An Elegant Puzzle",
        "author": "Will Larson",
        "yearPublished": 2019,
        "pageCount": 286,
        "domains": ["Engineering", "Leadership"],
        "ownerId": owner,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["ownerName"], "Owner");
    assert_eq!(body["book"]["domains"], json!(["Engineering", "Leadership"]));
    assert_eq!(body["book"]["yearPublished"], 2019);
  }

  #[tokio::test]
  async fn patch_book_requires_at_least_one_field() {
    let s = store().await;
    let id = book(&s, "Static").await;
    let (status, body) =
      send(&s, "PATCH", &format!("/books/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields to update.");
  }

  #[tokio::test]
  async fn patch_book_applies_partial_update() {
    let s = store().await;
    let id = book(&s, "Evolving").await;
    let (status, body) = send(
      &s,
      "PATCH",
      &format!("/books/{id}"),
      Some(json!({ "synopsis": "A study of change.", "pageCount": 212 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["synopsis"], "A study of change.");
    assert_eq!(body["book"]["pageCount"], 212);
    // untouched field
    assert_eq!(body["book"]["title"], "Evolving");
  }

  #[tokio::test]
  async fn patch_missing_book_is_404() {
    let s = store().await;
    let (status, _) = send(
      &s,
      "PATCH",
      &format!("/books/{}", uuid::Uuid::new_v4()),
      Some(json!({ "synopsis": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Borrow / return scenarios ───────────────────────────────────────────

  #[tokio::test]
  async fn borrow_on_fresh_book_succeeds() {
    // Scenario: first borrow marks the book borrowed under the caller's name.
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let b1 = book(&s, "Fresh Title").await;

    let (status, body) = send(
      &s,
      "POST",
      "/borrow",
      Some(json!({ "bookId": b1, "colleagueId": c1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["status"], "borrowed");
    assert_eq!(body["book"]["borrowerName"], "Casey");
    assert!(body["book"]["borrowedAt"].is_string());
  }

  #[tokio::test]
  async fn borrow_of_held_book_by_other_colleague_is_rejected() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let c2 = colleague(&s, "Drew").await;
    let b1 = book(&s, "Contested").await;

    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (status, body) = send(
      &s,
      "POST",
      "/borrow",
      Some(json!({ "bookId": b1, "colleagueId": c2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .contains("already borrowed by someone else")
    );
  }

  #[tokio::test]
  async fn borrow_twice_by_same_colleague_is_rejected() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let b1 = book(&s, "Favourite").await;

    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (status, body) = send(
      &s,
      "POST",
      "/borrow",
      Some(json!({ "bookId": b1, "colleagueId": c1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .contains("already have this book checked out")
    );
  }

  #[tokio::test]
  async fn return_by_wrong_colleague_is_rejected() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let c2 = colleague(&s, "Drew").await;
    let b1 = book(&s, "Held").await;

    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (status, body) = send(
      &s,
      "POST",
      "/return",
      Some(json!({ "bookId": b1, "colleagueId": c2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .contains("don't have this book checked out")
    );
  }

  #[tokio::test]
  async fn return_by_holder_restores_availability() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let b1 = book(&s, "Returned").await;

    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (status, body) = send(
      &s,
      "POST",
      "/return",
      Some(json!({ "bookId": b1, "colleagueId": c1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["status"], "available");
    assert_eq!(body["book"]["borrowerName"], Value::Null);
    assert_eq!(body["book"]["borrowedAt"], Value::Null);
  }

  #[tokio::test]
  async fn borrow_return_round_trip_restores_the_listed_view() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let b1 = book(&s, "Round Trip").await;

    let (_, before) = send(&s, "GET", "/books", None).await;
    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    send(&s, "POST", "/return", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (_, after) = send(&s, "GET", "/books", None).await;

    assert_eq!(before["books"], after["books"]);
  }

  #[tokio::test]
  async fn borrow_requires_both_ids() {
    let s = store().await;
    let (status, body) =
      send(&s, "POST", "/borrow", Some(json!({ "bookId": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing bookId or colleagueId");
  }

  #[tokio::test]
  async fn borrow_with_unknown_colleague_is_404() {
    let s = store().await;
    let b1 = book(&s, "Lonely").await;
    let (status, body) = send(
      &s,
      "POST",
      "/borrow",
      Some(json!({ "bookId": b1, "colleagueId": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Colleague not found.");
  }

  #[tokio::test]
  async fn borrow_of_unknown_book_is_404() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let (status, body) = send(
      &s,
      "POST",
      "/borrow",
      Some(json!({ "bookId": uuid::Uuid::new_v4(), "colleagueId": c1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found.");
  }

  // ── Delete rules ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_borrowed_book_is_rejected_until_returned() {
    let s = store().await;
    let c1 = colleague(&s, "Casey").await;
    let b1 = book(&s, "Wanted").await;

    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (status, body) =
      send(&s, "DELETE", &format!("/books/{b1}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("currently borrowed"));

    // still listed
    let (_, listing) = send(&s, "GET", "/books", None).await;
    assert_eq!(listing["books"].as_array().unwrap().len(), 1);

    send(&s, "POST", "/return", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    let (status, body) =
      send(&s, "DELETE", &format!("/books/{b1}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, listing) = send(&s, "GET", "/books", None).await;
    assert_eq!(listing["books"], json!([]));
  }

  #[tokio::test]
  async fn delete_missing_book_is_404() {
    let s = store().await;
    let (status, _) = send(
      &s,
      "DELETE",
      &format!("/books/{}", uuid::Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Roster ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_colleague_requires_name_and_email() {
    let s = store().await;
    let (status, body) =
      send(&s, "POST", "/colleagues", Some(json!({ "name": "Solo" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: name, email");
  }

  #[tokio::test]
  async fn colleague_crud_round_trip() {
    let s = store().await;
    let id = colleague(&s, "Erin").await;

    let (status, body) = send(
      &s,
      "PATCH",
      &format!("/colleagues/{id}"),
      Some(json!({ "email": "erin@shelf.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["colleague"]["email"], "erin@shelf.example");
    assert_eq!(body["colleague"]["name"], "Erin");

    let (status, body) =
      send(&s, "DELETE", &format!("/colleagues/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, listing) = send(&s, "GET", "/colleagues", None).await;
    assert_eq!(listing["colleagues"], json!([]));
  }

  #[tokio::test]
  async fn delete_colleague_with_active_loan_is_rejected() {
    let s = store().await;
    let c1 = colleague(&s, "Holder").await;
    let b1 = book(&s, "Out With Holder").await;
    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;

    let (status, body) =
      send(&s, "DELETE", &format!("/colleagues/{c1}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("active book loans"));
  }

  // ── Ledger reads ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn loan_history_lists_past_and_active_loans() {
    let s = store().await;
    let c1 = colleague(&s, "First").await;
    let c2 = colleague(&s, "Second").await;
    let b1 = book(&s, "Chronicle").await;

    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    send(&s, "POST", "/return", Some(json!({ "bookId": b1, "colleagueId": c1 })))
      .await;
    send(&s, "POST", "/borrow", Some(json!({ "bookId": b1, "colleagueId": c2 })))
      .await;

    let (status, body) =
      send(&s, "GET", &format!("/books/{b1}/loans"), None).await;
    assert_eq!(status, StatusCode::OK);
    let loans = body["loans"].as_array().unwrap();
    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0]["returnedAt"], Value::Null);
    assert!(loans[1]["returnedAt"].is_string());
  }

  #[tokio::test]
  async fn loan_history_of_unknown_book_is_404() {
    let s = store().await;
    let (status, _) = send(
      &s,
      "GET",
      &format!("/books/{}/loans", uuid::Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
