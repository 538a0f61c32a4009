//! Error type for `lexdata-session`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with an `{"error": {...}}` body.
  #[error("api error {code}: {info}")]
  Api { code: String, info: String },

  #[error("login failed: {0}")]
  Login(String),

  /// The server stayed lagged through every retry.
  #[error("server still lagged after {0} retries")]
  MaxlagExhausted(u32),

  /// A well-formed response that lacks an expected field.
  #[error("unexpected response: {0}")]
  Protocol(String),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
