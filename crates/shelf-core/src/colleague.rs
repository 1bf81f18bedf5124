//! Roster types — the colleagues who borrow and own books.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A colleague on the office roster. Serialises to the wire shape used by
/// every roster endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colleague {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  pub avatar_url: Option<String>,
}

/// Input to [`LendingStore::add_colleague`](crate::store::LendingStore::add_colleague).
#[derive(Debug, Clone)]
pub struct NewColleague {
  pub name:  String,
  pub email: String,
}

/// Partial update for the editable colleague fields.
#[derive(Debug, Clone, Default)]
pub struct ColleaguePatch {
  pub name:  Option<String>,
  pub email: Option<String>,
}

impl ColleaguePatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.email.is_none()
  }
}
