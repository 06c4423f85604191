//! Bearer-token check applied to every API route.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use rand_core::OsRng;

/// Token accepted as valid for this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`. `None`
  /// disables authentication.
  pub token_hash: Option<String>,
}

/// Rejection returned when the bearer token is missing or wrong.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
  fn into_response(self) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    res
      .headers_mut()
      .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
  }
}

/// Produce the PHC string to put in `api_token_hash`.
pub fn hash_token(token: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(token.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Verify the `Authorization: Bearer <token>` header against `config`.
pub fn verify_token(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Unauthorized> {
  let Some(hash) = config.token_hash.as_deref() else {
    return Ok(());
  };

  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .ok_or(Unauthorized)?;

  let parsed_hash = PasswordHash::new(hash).map_err(|_| Unauthorized)?;

  Argon2::default()
    .verify_password(token.as_bytes(), &parsed_hash)
    .map_err(|_| Unauthorized)
}

/// axum middleware wrapping [`verify_token`].
pub async fn require_token(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  match verify_token(req.headers(), &config) {
    Ok(()) => next.run(req).await,
    Err(e) => {
      tracing::warn!(path = %req.uri().path(), "rejected unauthenticated request");
      e.into_response()
    }
  }
}
