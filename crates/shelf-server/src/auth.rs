//! HTTP Basic-auth admin gate.
//!
//! Reads and loan transitions are open to anyone on the office network;
//! anything that mutates the catalog or roster must present the admin
//! credentials. The gate sits at the router boundary, so the lending core
//! never sees a notion of role.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, Method, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde_json::json;

/// Credentials accepted as the admin role for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// True for requests that manage inventory or the roster.
fn requires_admin(method: &Method, path: &str) -> bool {
  if *method == Method::POST {
    return !matches!(path, "/borrow" | "/return");
  }
  *method == Method::PATCH || *method == Method::DELETE
}

/// Middleware: reject non-admin mutations of the catalog or roster.
pub async fn admin_gate(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  if requires_admin(req.method(), req.uri().path())
    && !verify_admin(req.headers(), &auth)
  {
    return unauthorized();
  }
  next.run(req).await
}

/// Verify Basic credentials against the configured admin user.
pub fn verify_admin(headers: &HeaderMap, config: &AuthConfig) -> bool {
  let Some(header_val) = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
  else {
    return false;
  };
  let Some(encoded) = header_val.strip_prefix("Basic ") else {
    return false;
  };
  let Ok(decoded) = B64.decode(encoded) else {
    return false;
  };
  let Ok(creds) = std::str::from_utf8(&decoded) else {
    return false;
  };
  let Some((username, password)) = creds.split_once(':') else {
    return false;
  };

  if username != config.username {
    return false;
  }
  let Ok(parsed_hash) = PasswordHash::new(&config.password_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .is_ok()
}

fn unauthorized() -> Response {
  let mut res = (
    StatusCode::UNAUTHORIZED,
    Json(json!({ "error": "Admin credentials required." })),
  )
    .into_response();
  res.headers_mut().insert(
    header::WWW_AUTHENTICATE,
    HeaderValue::from_static("Basic realm=\"shelf\""),
  );
  res
}

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  use super::*;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "admin".into(), password_hash: hash }
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let encoded = B64.encode(format!("{user}:{pass}"));
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
    );
    headers
  }

  #[test]
  fn reads_and_transitions_are_open() {
    assert!(!requires_admin(&Method::GET, "/books"));
    assert!(!requires_admin(&Method::GET, "/colleagues"));
    assert!(!requires_admin(&Method::POST, "/borrow"));
    assert!(!requires_admin(&Method::POST, "/return"));
  }

  #[test]
  fn catalog_and_roster_mutations_need_admin() {
    assert!(requires_admin(&Method::POST, "/books"));
    assert!(requires_admin(&Method::POST, "/colleagues"));
    assert!(requires_admin(&Method::PATCH, "/books/abc"));
    assert!(requires_admin(&Method::DELETE, "/colleagues/abc"));
  }

  #[test]
  fn correct_credentials_verify() {
    let cfg = config("secret");
    assert!(verify_admin(&basic("admin", "secret"), &cfg));
  }

  #[test]
  fn wrong_password_fails() {
    let cfg = config("secret");
    assert!(!verify_admin(&basic("admin", "wrong"), &cfg));
  }

  #[test]
  fn wrong_username_fails() {
    let cfg = config("secret");
    assert!(!verify_admin(&basic("root", "secret"), &cfg));
  }

  #[test]
  fn missing_header_fails() {
    let cfg = config("secret");
    assert!(!verify_admin(&HeaderMap::new(), &cfg));
  }

  #[test]
  fn malformed_base64_fails() {
    let cfg = config("secret");
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_static("Basic !!!not-base64!!!"),
    );
    assert!(!verify_admin(&headers, &cfg));
  }
}
