//! The loan ledger and the joined book read model.
//!
//! Loans are append-mostly: a row is inserted on borrow and written exactly
//! once more on return. The ledger is the source of truth for "who has what,
//! since when"; the book's `status` column is a projection of it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::book::{BookDomain, BookStatus};

/// Days a book may be out before a read surfaces it as overdue.
pub const LOAN_PERIOD_DAYS: i64 = 30;

/// One borrow/return event in the ledger.
///
/// `returned_at == None` marks the loan active. A returned loan is never
/// reopened; a fresh borrow appends a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
  pub id:           Uuid,
  pub book_id:      Uuid,
  pub colleague_id: Uuid,
  pub borrowed_at:  DateTime<Utc>,
  pub returned_at:  Option<DateTime<Utc>>,
}

impl Loan {
  pub fn is_active(&self) -> bool {
    self.returned_at.is_none()
  }
}

/// The read model returned by every book endpoint: the book's columns joined
/// with the active borrower's name (if any) and the owner's name (if any).
/// Never stored, always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
  pub id:             Uuid,
  pub isbn:           Option<String>,
  pub title:          String,
  pub author:         String,
  pub cover_url:      Option<String>,
  pub synopsis:       Option<String>,
  pub year_published: Option<i32>,
  pub page_count:     Option<i32>,
  pub domains:        Vec<BookDomain>,
  pub status:         BookStatus,
  pub owner_name:     Option<String>,
  pub borrower_name:  Option<String>,
  pub borrowed_at:    Option<DateTime<Utc>>,
}

impl BookView {
  /// Overdue is display-only: recomputed against `now` on every read and
  /// never persisted or serialised.
  pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
    matches!(
      (self.status, self.borrowed_at),
      (BookStatus::Borrowed, Some(at)) if now - at > Duration::days(LOAN_PERIOD_DAYS)
    )
  }
}
