//! Connection settings for a [`Session`](crate::Session).

use serde::Deserialize;

pub const WIKIDATA_API: &str = "https://www.wikidata.org/w/api.php";

/// Every field has a default, so an empty config source is valid and yields
/// an anonymous Wikidata session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Full URL of the `api.php` endpoint.
  pub api_url:      String,
  pub user_agent:   String,
  /// Bot-password user name, e.g. `Example@lexdata`. Empty means anonymous.
  pub username:     String,
  pub password:     String,
  /// Seconds of replication lag the client tolerates before backing off.
  pub maxlag:       u32,
  pub max_retries:  u32,
  pub timeout_secs: u64,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      api_url:      WIKIDATA_API.to_string(),
      user_agent:   concat!("lexdata/", env!("CARGO_PKG_VERSION")).to_string(),
      username:     String::new(),
      password:     String::new(),
      maxlag:       5,
      max_retries:  5,
      timeout_secs: 30,
    }
  }
}

impl SessionConfig {
  pub fn has_credentials(&self) -> bool { !self.username.is_empty() }
}
