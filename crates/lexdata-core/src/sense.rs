//! [`Sense`]: one meaning of a lexeme.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Result,
  entity::{Entity, Term, object_or_empty, terms},
};

/// Language tried when a requested gloss is missing.
const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sense {
  #[serde(default)]
  pub id:     String,
  #[serde(default, deserialize_with = "object_or_empty")]
  pub glosses: Map<String, Value>,
  #[serde(default, deserialize_with = "object_or_empty")]
  pub claims: Map<String, Value>,
  #[serde(flatten)]
  pub extra:  Map<String, Value>,
}

impl Sense {
  pub fn from_json(value: Value) -> Result<Self> { Ok(serde_json::from_value(value)?) }

  pub fn glosses(&self) -> Result<Vec<Term>> { terms(&self.glosses) }

  /// The gloss in `language`, else the English gloss, else the first one.
  pub fn gloss(&self, language: Option<&str>) -> Option<&str> {
    let text = |lang: &str| self.glosses.get(lang)?.get("value")?.as_str();
    language
      .and_then(text)
      .or_else(|| text(FALLBACK_LANGUAGE))
      .or_else(|| self.glosses.values().next()?.get("value")?.as_str())
  }
}

impl Entity for Sense {
  fn id(&self) -> &str { &self.id }

  fn raw_claims(&self) -> &Map<String, Value> { &self.claims }

  fn raw_claims_mut(&mut self) -> &mut Map<String, Value> { &mut self.claims }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn sense() -> Sense {
    Sense::from_json(json!({
      "id": "L2-S1",
      "glosses": {
        "de": {"language": "de", "value": "erste"},
        "en": {"language": "en", "value": "first"},
      },
      "claims": {},
    }))
    .unwrap()
  }

  #[test]
  fn gloss_by_language() {
    let s = sense();
    assert_eq!(s.gloss(Some("de")), Some("erste"));
    assert_eq!(s.gloss(Some("en")), s.gloss(None));
  }

  #[test]
  fn gloss_falls_back_to_english_then_first() {
    let mut s = sense();
    assert_eq!(s.gloss(Some("xx")), Some("first"));
    s.glosses.remove("en");
    assert_eq!(s.gloss(Some("xx")), Some("erste"));
    s.glosses.clear();
    assert_eq!(s.gloss(None), None);
  }
}
