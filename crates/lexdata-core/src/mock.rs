//! Recording [`Transport`] for tests: answers canned JSON per action.

use std::{
  cell::RefCell,
  collections::{HashMap, VecDeque},
};

use serde_json::{Value, json};
use thiserror::Error;

use crate::transport::{Params, Transport};

#[derive(Debug, Error)]
#[error("mock transport: {0}")]
pub struct MockError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
}

#[derive(Debug, Clone)]
pub struct Call {
  pub method: Method,
  pub params: Params,
}

/// Responses are queued per action. The last queued response for an action
/// keeps answering once the earlier ones are used up.
#[derive(Default)]
pub struct MockTransport {
  responses: RefCell<HashMap<String, VecDeque<Value>>>,
  calls:     RefCell<Vec<Call>>,
}

impl MockTransport {
  pub fn new() -> Self { Self::default() }

  pub fn respond(&self, action: &str, body: Value) {
    self
      .responses
      .borrow_mut()
      .entry(action.to_owned())
      .or_default()
      .push_back(body);
  }

  pub fn calls(&self) -> Vec<Call> { self.calls.borrow().clone() }

  /// Calls made for `action`, in order.
  pub fn calls_for(&self, action: &str) -> Vec<Call> {
    self
      .calls
      .borrow()
      .iter()
      .filter(|c| c.params.get("action") == Some(action))
      .cloned()
      .collect()
  }

  pub fn count(&self, action: &str) -> usize { self.calls_for(action).len() }

  fn answer(&self, method: Method, params: &Params) -> Result<Value, MockError> {
    self.calls.borrow_mut().push(Call {
      method,
      params: params.clone(),
    });
    let action = params.get("action").unwrap_or_default();
    let mut responses = self.responses.borrow_mut();
    let queue = responses
      .get_mut(action)
      .ok_or_else(|| MockError(format!("no response for {action}")))?;
    let body = if queue.len() > 1 {
      queue.pop_front()
    } else {
      queue.front().cloned()
    };
    body.ok_or_else(|| MockError(format!("no response for {action}")))
  }
}

impl Transport for MockTransport {
  type Error = MockError;

  fn get(&self, params: &Params) -> Result<Value, MockError> {
    self.answer(Method::Get, params)
  }

  fn post(&self, params: &Params) -> Result<Value, MockError> {
    self.answer(Method::Post, params)
  }
}

// ─── Canned bodies ───────────────────────────────────────────────────────────

/// A `prop=revisions` answer for a property page declaring `datatype`.
pub fn property_page(property_id: &str, datatype: &str) -> Value {
  let content = json!({"id": property_id, "type": "property", "datatype": datatype});
  json!({"query": {"pages": {"1234": {
    "title": format!("Property:{property_id}"),
    "revisions": [{"*": content.to_string()}],
  }}}})
}

/// A server-side claim object with an entity-reference main snak.
pub fn item_claim(property_id: &str, item_id: &str, rank: &str) -> Value {
  let numeric: u64 = item_id[1..].parse().unwrap_or_default();
  json!({
    "id": format!("L123${property_id}-{item_id}"),
    "type": "statement",
    "rank": rank,
    "mainsnak": {
      "snaktype": "value",
      "property": property_id,
      "datatype": "wikibase-item",
      "datavalue": {
        "type": "wikibase-entityid",
        "value": {"entity-type": "item", "numeric-id": numeric, "id": item_id},
      },
    },
  })
}

/// The `wbgetentities` answer for the English lexeme "first".
pub fn lexeme_l2() -> Value {
  json!({"entities": {"L2": {
    "id": "L2",
    "type": "lexeme",
    "lastrevid": 1000,
    "lemmas": {"en": {"language": "en", "value": "first"}},
    "lexicalCategory": "Q1084",
    "language": "Q1860",
    "claims": {
      "P5831": [{
        "id": "L2$a",
        "type": "statement",
        "rank": "normal",
        "mainsnak": {
          "snaktype": "value",
          "property": "P5831",
          "datatype": "monolingualtext",
          "datavalue": {
            "type": "monolingualtext",
            "value": {"text": "He was first in line.", "language": "en"},
          },
        },
      }],
    },
    "forms": [{
      "id": "L2-F1",
      "representations": {"en": {"language": "en", "value": "first"}},
      "grammaticalFeatures": [],
      "claims": [],
    }],
    "senses": [{
      "id": "L2-S1",
      "glosses": {
        "en": {"language": "en", "value": "element before all others"},
        "de": {"language": "de", "value": "das Element vor allen anderen"},
      },
      "claims": [],
    }],
  }}})
}
