//! Server assembly for the Shelf lending tracker.
//!
//! The API router itself is transport-agnostic (`shelf-api`); this crate
//! owns everything around it: TOML/env configuration, the argon2 admin gate
//! for mutating catalog/roster calls, the no-cache response headers, and
//! request tracing.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, header},
  middleware,
};
use serde::Deserialize;
use shelf_core::store::LendingStore;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `SHELF_`-prefixed environment variables. Missing or invalid settings are
/// a startup error, not a per-request one.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_username:      String,
  /// PHC string produced by argon2 (see `server --hash-password`).
  pub admin_password_hash: String,
}

// ─── Router ──────────────────────────────────────────────────────────────────

// Kiosk browsers otherwise show stale lending state after a transition.
const NO_CACHE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// Assemble the full application: API routes behind the admin gate, with
/// every response marked uncacheable and traced.
pub fn app<S>(store: Arc<S>, auth: Arc<AuthConfig>) -> Router
where
  S: LendingStore + 'static,
{
  shelf_api::api_router(store)
    .layer(middleware::from_fn_with_state(auth, auth::admin_gate))
    .layer(SetResponseHeaderLayer::overriding(
      header::CACHE_CONTROL,
      HeaderValue::from_static(NO_CACHE),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::PRAGMA,
      HeaderValue::from_static("no-cache"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::EXPIRES,
      HeaderValue::from_static("0"),
    ))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
