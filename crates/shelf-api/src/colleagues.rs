//! Handlers for `/colleagues` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/colleagues` | Name ascending |
//! | `POST`   | `/colleagues` | Body: [`CreateColleagueBody`]; both fields required |
//! | `PATCH`  | `/colleagues/{id}` | At least one field required |
//! | `DELETE` | `/colleagues/{id}` | Rejected while any active loan is held |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shelf_core::{
  Error,
  colleague::{Colleague, ColleaguePatch, NewColleague},
  store::LendingStore,
};
use uuid::Uuid;

use crate::{Ack, error::ApiError};

// ─── Response envelopes ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ColleaguesEnvelope {
  pub colleagues: Vec<Colleague>,
}

#[derive(Debug, Serialize)]
pub struct ColleagueEnvelope {
  pub colleague: Colleague,
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /colleagues`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<ColleaguesEnvelope>, ApiError>
where
  S: LendingStore,
{
  let colleagues = store.list_colleagues().await?;
  Ok(Json(ColleaguesEnvelope { colleagues }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateColleagueBody {
  pub name:  Option<String>,
  pub email: Option<String>,
}

/// `POST /colleagues`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateColleagueBody>,
) -> Result<Json<ColleagueEnvelope>, ApiError>
where
  S: LendingStore,
{
  let name = body.name.filter(|n| !n.is_empty());
  let email = body.email.filter(|e| !e.is_empty());
  let (Some(name), Some(email)) = (name, email) else {
    return Err(
      Error::MissingFields("Missing required fields: name, email").into(),
    );
  };

  let colleague = store.add_colleague(NewColleague { name, email }).await?;
  Ok(Json(ColleagueEnvelope { colleague }))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateColleagueBody {
  pub name:  Option<String>,
  pub email: Option<String>,
}

/// `PATCH /colleagues/{id}` — a body with no recognised keys is rejected.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateColleagueBody>,
) -> Result<Json<ColleagueEnvelope>, ApiError>
where
  S: LendingStore,
{
  let patch = ColleaguePatch { name: body.name, email: body.email };
  let colleague = store.update_colleague(id, patch).await?;
  Ok(Json(ColleagueEnvelope { colleague }))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /colleagues/{id}`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError>
where
  S: LendingStore,
{
  store.delete_colleague(id).await?;
  Ok(Json(Ack { ok: true }))
}
