//! The `LendingStore` trait — the storage abstraction the API depends on.
//!
//! The trait is implemented by storage backends (e.g. `shelf-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Every method
//! returns the shared [`Result`]; backends surface their own failures as
//! [`Error::Storage`](crate::Error::Storage) or
//! [`Error::Unavailable`](crate::Error::Unavailable).

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  book::{BookPatch, NewBook},
  colleague::{Colleague, ColleaguePatch, NewColleague},
  loan::{BookView, Loan},
};

/// Abstraction over a lending-tracker storage backend.
///
/// Implementations must uphold two invariants regardless of concurrent
/// callers: at most one loan per book has no return timestamp, and a book's
/// denormalized status agrees with the ledger after every call. Both
/// transition operations perform their ledger write and status flip
/// atomically.
pub trait LendingStore: Send + Sync {
  // ── Catalog ───────────────────────────────────────────────────────────

  /// Create a book. The initial status is always `available`; a referenced
  /// owner must exist.
  fn add_book(
    &self,
    input: NewBook,
  ) -> impl Future<Output = Result<BookView>> + Send + '_;

  /// Apply a partial update. An empty patch is rejected with
  /// [`NoFieldsToUpdate`](crate::Error::NoFieldsToUpdate).
  fn update_book(
    &self,
    id: Uuid,
    patch: BookPatch,
  ) -> impl Future<Output = Result<BookView>> + Send + '_;

  /// Delete a book. Rejected while the book is borrowed; ledger rows for
  /// past loans are kept.
  fn delete_book(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// All books joined with borrower/owner names, newest first.
  fn list_books_with_state(
    &self,
  ) -> impl Future<Output = Result<Vec<BookView>>> + Send + '_;

  /// The joined view for one book. Returns `None` if the book does not
  /// exist.
  fn get_book_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<BookView>>> + Send + '_;

  // ── Roster ────────────────────────────────────────────────────────────

  fn add_colleague(
    &self,
    input: NewColleague,
  ) -> impl Future<Output = Result<Colleague>> + Send + '_;

  fn update_colleague(
    &self,
    id: Uuid,
    patch: ColleaguePatch,
  ) -> impl Future<Output = Result<Colleague>> + Send + '_;

  /// Delete a colleague. Rejected while they hold any active loan.
  fn delete_colleague(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// All colleagues, name ascending.
  fn list_colleagues(
    &self,
  ) -> impl Future<Output = Result<Vec<Colleague>>> + Send + '_;

  // ── Loan transitions ──────────────────────────────────────────────────

  /// Check a book out to a colleague and return the fresh view.
  ///
  /// The ledger insert and the status flip happen in one transaction; a
  /// concurrent borrow of the same book loses at the storage constraint.
  fn borrow(
    &self,
    book_id: Uuid,
    colleague_id: Uuid,
  ) -> impl Future<Output = Result<BookView>> + Send + '_;

  /// Check a book back in. The caller must be the colleague holding it.
  fn return_book(
    &self,
    book_id: Uuid,
    colleague_id: Uuid,
  ) -> impl Future<Output = Result<BookView>> + Send + '_;

  // ── Ledger reads ──────────────────────────────────────────────────────

  /// Every loan with no return timestamp, most recent first.
  fn active_loans(
    &self,
  ) -> impl Future<Output = Result<Vec<Loan>>> + Send + '_;

  /// The full ledger for one book (returned loans included), most recent
  /// first.
  fn loan_history(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Loan>>> + Send + '_;
}
