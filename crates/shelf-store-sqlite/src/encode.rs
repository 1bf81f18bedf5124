//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, and domain tag lists as compact JSON arrays. Decode
//! failures surface as [`Error::Storage`] like any other corrupt-row
//! condition.

use chrono::{DateTime, Utc};
use shelf_core::{
  Error, Result,
  book::{BookDomain, BookStatus},
  colleague::Colleague,
  loan::{BookView, Loan},
};
use uuid::Uuid;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Storage(format!("bad uuid {s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Storage(format!("bad timestamp {s:?}: {e}")))
}

// ─── BookStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: BookStatus) -> &'static str {
  match s {
    BookStatus::Available => "available",
    BookStatus::Borrowed => "borrowed",
  }
}

pub fn decode_status(s: &str) -> Result<BookStatus> {
  match s {
    "available" => Ok(BookStatus::Available),
    "borrowed" => Ok(BookStatus::Borrowed),
    other => Err(Error::Storage(format!("unknown book status: {other:?}"))),
  }
}

// ─── Domain tags ─────────────────────────────────────────────────────────────

pub fn encode_domains(domains: &[BookDomain]) -> Result<String> {
  serde_json::to_string(domains)
    .map_err(|e| Error::Storage(format!("cannot encode domains: {e}")))
}

pub fn decode_domains(s: &str) -> Result<Vec<BookDomain>> {
  serde_json::from_str(s)
    .map_err(|e| Error::Storage(format!("bad domains column {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a `books` row joined with the active loan and the
/// borrower/owner names.
pub struct RawBookView {
  pub book_id:        String,
  pub isbn:           Option<String>,
  pub title:          String,
  pub author:         String,
  pub cover_url:      Option<String>,
  pub synopsis:       Option<String>,
  pub year_published: Option<i32>,
  pub page_count:     Option<i32>,
  pub domains:        String,
  pub status:         String,
  pub owner_name:     Option<String>,
  pub borrower_name:  Option<String>,
  pub borrowed_at:    Option<String>,
}

impl RawBookView {
  pub fn into_view(self) -> Result<BookView> {
    Ok(BookView {
      id:             decode_uuid(&self.book_id)?,
      isbn:           self.isbn,
      title:          self.title,
      author:         self.author,
      cover_url:      self.cover_url,
      synopsis:       self.synopsis,
      year_published: self.year_published,
      page_count:     self.page_count,
      domains:        decode_domains(&self.domains)?,
      status:         decode_status(&self.status)?,
      owner_name:     self.owner_name,
      borrower_name:  self.borrower_name,
      borrowed_at:    self
        .borrowed_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}

/// Raw strings read from a `colleagues` row.
pub struct RawColleague {
  pub colleague_id: String,
  pub name:         String,
  pub email:        String,
  pub avatar_url:   Option<String>,
}

impl RawColleague {
  pub fn into_colleague(self) -> Result<Colleague> {
    Ok(Colleague {
      id:         decode_uuid(&self.colleague_id)?,
      name:       self.name,
      email:      self.email,
      avatar_url: self.avatar_url,
    })
  }
}

/// Raw strings read from a `loans` row.
pub struct RawLoan {
  pub loan_id:      String,
  pub book_id:      String,
  pub colleague_id: String,
  pub borrowed_at:  String,
  pub returned_at:  Option<String>,
}

impl RawLoan {
  pub fn into_loan(self) -> Result<Loan> {
    Ok(Loan {
      id:           decode_uuid(&self.loan_id)?,
      book_id:      decode_uuid(&self.book_id)?,
      colleague_id: decode_uuid(&self.colleague_id)?,
      borrowed_at:  decode_dt(&self.borrowed_at)?,
      returned_at:  self
        .returned_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}
