//! [`Form`]: an inflected or written representation of a lexeme.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Result,
  entity::{Entity, Term, object_or_empty, terms},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
  #[serde(default)]
  pub id:                  String,
  #[serde(default, deserialize_with = "object_or_empty")]
  pub representations:     Map<String, Value>,
  #[serde(default, rename = "grammaticalFeatures")]
  pub grammatical_features: Vec<String>,
  #[serde(default, deserialize_with = "object_or_empty")]
  pub claims:              Map<String, Value>,
  /// Fields not modelled above, kept for round-tripping.
  #[serde(flatten)]
  pub extra:               Map<String, Value>,
}

impl Form {
  pub fn from_json(value: Value) -> Result<Self> { Ok(serde_json::from_value(value)?) }

  pub fn representations(&self) -> Result<Vec<Term>> { terms(&self.representations) }

  /// The representation in `language`, if there is one.
  pub fn representation(&self, language: &str) -> Option<&str> {
    self
      .representations
      .get(language)?
      .get("value")?
      .as_str()
  }

  /// The text of the first representation.
  pub fn form(&self) -> Option<&str> {
    self.representations.values().next()?.get("value")?.as_str()
  }

  pub fn grammatical_features(&self) -> &[String] { &self.grammatical_features }
}

impl Entity for Form {
  fn id(&self) -> &str { &self.id }

  fn raw_claims(&self) -> &Map<String, Value> { &self.claims }

  fn raw_claims_mut(&mut self) -> &mut Map<String, Value> { &mut self.claims }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn parses_service_form() {
    let form = Form::from_json(json!({
      "id": "L2-F1",
      "representations": {
        "en": {"language": "en", "value": "first"},
        "en-gb": {"language": "en-gb", "value": "first"},
      },
      "grammaticalFeatures": ["Q110786"],
      "claims": [],
    }))
    .unwrap();

    assert_eq!(form.id(), "L2-F1");
    assert_eq!(form.form(), Some("first"));
    assert_eq!(form.representation("en-gb"), Some("first"));
    assert_eq!(form.representation("de"), None);
    assert_eq!(form.grammatical_features(), ["Q110786".to_owned()]);
    assert_eq!(form.representations().unwrap().len(), 2);
    assert!(form.claims().unwrap().is_empty());
  }

  #[test]
  fn keeps_unknown_fields() {
    let form = Form::from_json(json!({"id": "L2-F1", "lastrevid": 7})).unwrap();
    let back = serde_json::to_value(&form).unwrap();
    assert_eq!(back["lastrevid"], 7);
  }
}
