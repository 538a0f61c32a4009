//! The [`Transport`] trait and the [`Client`] that drives it.
//!
//! A transport performs authenticated GET/POST requests against the Wikibase
//! `api.php` endpoint and returns the parsed JSON body. Login, cookies, tokens
//! and retries are entirely its business; this crate only sees "send params,
//! get JSON or an error".

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::{
  Error, Result,
  claim::Claim,
  datatype::{Datatype, DatatypeResolver},
  value::{ClaimValue, Snak},
};

/// Token placeholder; the transport swaps it for a real CSRF token.
pub const AUTO_TOKEN: &str = "__AUTO__";

// ─── Params ──────────────────────────────────────────────────────────────────

/// API action parameters, sent as a query string (GET) or form body (POST).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
  /// Parameters for `action`, always requesting a JSON response.
  pub fn action(action: &str) -> Self {
    Self::default().set("action", action).set("format", "json")
  }

  pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.0.insert(key.into(), value.into());
    self
  }

  /// Mark the request as a write that needs a CSRF token.
  pub fn with_token(self) -> Self { self.set("token", AUTO_TOKEN) }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the authenticated HTTP session.
///
/// Implementations block until the response is parsed. Failures of any kind
/// (network, login, API `error` bodies) are reported through `Self::Error` and
/// propagated unchanged by this crate.
pub trait Transport {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get(&self, params: &Params) -> Result<Value, Self::Error>;

  fn post(&self, params: &Params) -> Result<Value, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
  type Error = T::Error;

  fn get(&self, params: &Params) -> Result<Value, Self::Error> {
    (**self).get(params)
  }

  fn post(&self, params: &Params) -> Result<Value, Self::Error> {
    (**self).post(params)
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// A transport paired with the datatype resolver used to build new claims.
///
/// Entities are plain data; every operation that talks to the service takes a
/// `&Client`.
pub struct Client<T> {
  transport: T,
  datatypes: DatatypeResolver,
}

impl<T: Transport> Client<T> {
  /// A client with a fresh, private datatype cache.
  pub fn new(transport: T) -> Self {
    Self::with_resolver(transport, DatatypeResolver::default())
  }

  pub fn with_resolver(transport: T, datatypes: DatatypeResolver) -> Self {
    Self {
      transport,
      datatypes,
    }
  }

  pub fn transport(&self) -> &T { &self.transport }

  pub fn resolver(&self) -> &DatatypeResolver { &self.datatypes }

  pub(crate) fn get(&self, params: &Params) -> Result<Value> {
    debug!(action = params.get("action"), "GET");
    self
      .transport
      .get(params)
      .map_err(|e| Error::Transport(Box::new(e)))
  }

  pub(crate) fn post(&self, params: &Params) -> Result<Value> {
    debug!(action = params.get("action"), "POST");
    self
      .transport
      .post(params)
      .map_err(|e| Error::Transport(Box::new(e)))
  }

  /// The declared datatype of `property_id`, queried once and then cached.
  pub fn datatype(&self, property_id: &str) -> Result<Datatype> {
    self.datatypes.resolve(&self.transport, property_id)
  }

  /// A complete `value` snak for `property_id`, ready for submission.
  pub fn build_snak(
    &self,
    property_id: &str,
    value: impl Into<ClaimValue>,
  ) -> Result<Snak> {
    let datatype = self.datatype(property_id)?;
    Snak::build(property_id, &datatype, value.into())
  }

  /// A new, not yet submitted claim. Fails right away if `value` does not
  /// fit the property's datatype.
  pub fn claim(
    &self,
    property_id: &str,
    value: impl Into<ClaimValue>,
  ) -> Result<Claim> {
    Ok(Claim::new(self.build_snak(property_id, value)?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn action_params_request_json() {
    let p = Params::action("wbgetentities").set("ids", "L2");
    assert_eq!(p.get("action"), Some("wbgetentities"));
    assert_eq!(p.get("format"), Some("json"));
    assert_eq!(p.get("ids"), Some("L2"));
    assert_eq!(p.get("token"), None);
  }

  #[test]
  fn with_token_uses_placeholder() {
    let p = Params::action("wbcreateclaim").with_token();
    assert_eq!(p.get("token"), Some(AUTO_TOKEN));
  }
}
