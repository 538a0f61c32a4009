//! Blocking MediaWiki API session implementing [`Transport`].

use std::{sync::RwLock, thread, time::Duration};

use lexdata_core::{AUTO_TOKEN, Params, Transport};
use reqwest::{
  blocking::Client,
  header::{HeaderMap, RETRY_AFTER},
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
  config::SessionConfig,
  error::{Result, SessionError},
};

/// CSRF token MediaWiki accepts from anonymous users.
pub const ANONYMOUS_TOKEN: &str = "+\\";

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
  Get,
  Post,
}

/// An HTTP session against one `api.php` endpoint.
///
/// Cookies from the login persist in the client's cookie store. Write
/// requests carrying the `__AUTO__` placeholder get the session's CSRF token.
pub struct Session {
  client: Client,
  config: SessionConfig,
  csrf:   RwLock<String>,
}

impl Session {
  /// A session that edits without logging in.
  pub fn anonymous(config: SessionConfig) -> Result<Self> {
    let client = Client::builder()
      .cookie_store(true)
      .user_agent(config.user_agent.clone())
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      config,
      csrf: RwLock::new(ANONYMOUS_TOKEN.to_owned()),
    })
  }

  /// Log in with a bot password and fetch a CSRF token.
  pub fn login(config: SessionConfig) -> Result<Self> {
    let session = Self::anonymous(config)?;

    let login_token = session.fetch_token("login")?;
    let params = Params::action("login")
      .set("lgname", session.config.username.clone())
      .set("lgpassword", session.config.password.clone())
      .set("lgtoken", login_token);
    let body = session.request(Method::Post, &params)?;
    check_login(&body)?;
    info!(user = %session.config.username, "logged in");

    session.refresh_csrf()?;
    Ok(session)
  }

  /// [`Session::login`] when credentials are configured, else anonymous.
  pub fn connect(config: SessionConfig) -> Result<Self> {
    if config.has_credentials() {
      Self::login(config)
    } else {
      Self::anonymous(config)
    }
  }

  pub fn config(&self) -> &SessionConfig { &self.config }

  fn csrf(&self) -> String {
    self
      .csrf
      .read()
      .map(|t| t.clone())
      .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
  }

  fn refresh_csrf(&self) -> Result<()> {
    let token = self.fetch_token("csrf")?;
    match self.csrf.write() {
      Ok(mut slot) => *slot = token,
      Err(poisoned) => *poisoned.into_inner() = token,
    }
    Ok(())
  }

  fn fetch_token(&self, kind: &str) -> Result<String> {
    let params = Params::action("query").set("meta", "tokens").set("type", kind);
    let body = self.request(Method::Get, &params)?;
    token_from(&body, kind)
  }

  // ── Requests ──────────────────────────────────────────────────────────────

  /// Send `params`, retrying while the server reports replication lag.
  fn request(&self, method: Method, params: &Params) -> Result<Value> {
    let mut retries = 0;
    loop {
      let form = prepare(params, &self.csrf(), self.config.maxlag);
      debug!(action = params.get("action"), ?method, "api request");

      let builder = match method {
        Method::Get => self.client.get(&self.config.api_url).query(&form),
        Method::Post => self.client.post(&self.config.api_url).form(&form),
      };
      let response = builder.send()?.error_for_status()?;
      let wait = retry_after(response.headers());
      let body: Value = response.json()?;

      match api_error(&body) {
        None => return Ok(body),
        Some((code, _)) if code == "maxlag" => {
          if retries >= self.config.max_retries {
            return Err(SessionError::MaxlagExhausted(retries));
          }
          retries += 1;
          warn!(retries, wait_secs = wait.as_secs(), "server lagged, backing off");
          thread::sleep(wait);
        }
        Some((code, info)) => return Err(SessionError::Api { code, info }),
      }
    }
  }
}

impl Transport for Session {
  type Error = SessionError;

  fn get(&self, params: &Params) -> Result<Value> { self.request(Method::Get, params) }

  fn post(&self, params: &Params) -> Result<Value> { self.request(Method::Post, params) }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Wire parameters: placeholder tokens swapped for `csrf`, `maxlag` added.
fn prepare(params: &Params, csrf: &str, maxlag: u32) -> Vec<(String, String)> {
  let mut form: Vec<(String, String)> = params
    .iter()
    .map(|(k, v)| {
      let v = if v == AUTO_TOKEN { csrf } else { v };
      (k.to_owned(), v.to_owned())
    })
    .collect();
  if params.get("maxlag").is_none() {
    form.push(("maxlag".to_owned(), maxlag.to_string()));
  }
  form
}

/// `(code, info)` of an API error body.
fn api_error(body: &Value) -> Option<(String, String)> {
  let error = body.get("error")?;
  let field = |key: &str| {
    error
      .get(key)
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_owned()
  };
  Some((field("code"), field("info")))
}

fn retry_after(headers: &HeaderMap) -> Duration {
  headers
    .get(RETRY_AFTER)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.trim().parse().ok())
    .map(Duration::from_secs)
    .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// The `<kind>token` from a `meta=tokens` answer.
fn token_from(body: &Value, kind: &str) -> Result<String> {
  body
    .get("query")
    .and_then(|q| q.get("tokens"))
    .and_then(|t| t.get(format!("{kind}token")))
    .and_then(Value::as_str)
    .map(str::to_owned)
    .ok_or_else(|| SessionError::Protocol(format!("no {kind} token in {body}")))
}

fn check_login(body: &Value) -> Result<()> {
  let login = body.get("login");
  match login.and_then(|l| l.get("result")).and_then(Value::as_str) {
    Some("Success") => Ok(()),
    result => {
      let reason = login
        .and_then(|l| l.get("reason"))
        .and_then(Value::as_str)
        .or(result)
        .unwrap_or("no result");
      Err(SessionError::Login(reason.to_owned()))
    }
  }
}
