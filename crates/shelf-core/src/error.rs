//! The shared error taxonomy for the lending tracker.
//!
//! Every layer speaks this one enum: the store raises the domain variants
//! from inside its transactions, and the API layer maps each variant to an
//! HTTP status. Display strings are the user-facing messages, verbatim.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  // ── Lookups ───────────────────────────────────────────────────────────
  #[error("Colleague not found.")]
  ColleagueNotFound(Uuid),

  #[error("Book not found.")]
  BookNotFound(Uuid),

  #[error("Invalid owner ID: the colleague {0} does not exist.")]
  OwnerNotFound(Uuid),

  // ── Loan transitions ──────────────────────────────────────────────────
  /// The denormalized status says borrowed but no active ledger row backs
  /// it up. Only reachable if the projection has drifted.
  #[error(
    "This book is already marked as borrowed. Please refresh or choose \
     another book."
  )]
  BookAlreadyBorrowed,

  #[error(
    "You already have this book checked out. Please return it before \
     borrowing again."
  )]
  AlreadyCheckedOut,

  #[error("This book is already borrowed by someone else. Please choose another.")]
  BorrowedByOther,

  #[error("You don't have this book checked out, so it can't be returned.")]
  NotCheckedOut,

  // ── Catalog / roster rules ────────────────────────────────────────────
  #[error("This book is currently borrowed and can't be removed yet.")]
  BookCurrentlyBorrowed,

  #[error(
    "Cannot delete colleague with active book loans. Please return all \
     books first."
  )]
  ColleagueHasActiveLoans,

  #[error("No fields to update.")]
  NoFieldsToUpdate,

  /// Request-level validation; the payload is the full user-facing message.
  #[error("{0}")]
  MissingFields(&'static str),

  // ── Infrastructure ────────────────────────────────────────────────────
  /// Any backend failure. The message carries the store-provided detail for
  /// the log; clients only ever see the status code it maps to.
  #[error("storage error: {0}")]
  Storage(String),

  #[error("store unavailable: timed out waiting for the database")]
  Unavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
