//! Catalog types — books and their enumerated domain tags.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a book sits in the office taxonomy. Serialised as the display
/// strings below; order within a book's tag list carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookDomain {
  Product,
  Engineering,
  Data,
  #[serde(rename = "Product Design")]
  ProductDesign,
  Marketing,
  People,
  Leadership,
  Strategy,
  #[serde(rename = "AI")]
  Ai,
  Other,
}

/// The denormalized lending state of a book.
///
/// `Borrowed` iff an active loan references the book. The store flips this
/// field in the same transaction as the ledger write, so the two cannot
/// disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
  Available,
  Borrowed,
}

/// Input to [`LendingStore::add_book`](crate::store::LendingStore::add_book).
///
/// The id, `created_at`, and the initial `available` status are assigned by
/// the store; they are not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewBook {
  pub title:          String,
  pub author:         String,
  pub cover_url:      Option<String>,
  pub synopsis:       Option<String>,
  pub year_published: Option<i32>,
  pub page_count:     Option<i32>,
  pub domains:        Vec<BookDomain>,
  pub owner_id:       Option<Uuid>,
}

/// Partial update for the editable book fields.
///
/// Double-`Option` semantics: outer `None` leaves the column unchanged,
/// `Some(None)` clears it, `Some(Some(v))` replaces it. Title, author, isbn
/// and cover are not editable after creation.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
  pub synopsis:       Option<Option<String>>,
  pub year_published: Option<Option<i32>>,
  pub page_count:     Option<Option<i32>>,
  pub domains:        Option<Vec<BookDomain>>,
  pub owner_id:       Option<Option<Uuid>>,
}

impl BookPatch {
  /// True when no field is present; such a patch is rejected rather than
  /// applied as a no-op write.
  pub fn is_empty(&self) -> bool {
    self.synopsis.is_none()
      && self.year_published.is_none()
      && self.page_count.is_none()
      && self.domains.is_none()
      && self.owner_id.is_none()
  }
}
