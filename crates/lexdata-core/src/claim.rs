//! Claims: one property/value statement with a rank and qualifiers.
//!
//! A [`Claim`] is either parsed from a claim object returned by the service
//! (it then carries the server-assigned id) or built locally through
//! [`Client::claim`](crate::Client::claim) and not yet submitted.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  datatype::Datatype,
  value::Snak,
};

// ─── Rank ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
  Preferred,
  #[default]
  Normal,
  Deprecated,
}

impl Rank {
  /// Ordinal used for sorting: preferred 1, normal 0, deprecated -1.
  pub fn numeric(self) -> i8 {
    match self {
      Self::Preferred => 1,
      Self::Normal => 0,
      Self::Deprecated => -1,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Preferred => "preferred",
      Self::Normal => "normal",
      Self::Deprecated => "deprecated",
    }
  }
}

impl FromStr for Rank {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "preferred" => Ok(Self::Preferred),
      "normal" => Ok(Self::Normal),
      "deprecated" => Ok(Self::Deprecated),
      other => Err(Error::UnknownRank(other.to_owned())),
    }
  }
}

impl fmt::Display for Rank {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── PureValue ───────────────────────────────────────────────────────────────

/// The simplified scalar behind a claim's value.
#[derive(Debug, Clone, PartialEq)]
pub enum PureValue {
  /// The referenced entity id, e.g. `Q1` or `L2-F1`.
  EntityId(String),
  Text(String),
  Quantity(f64),
  /// The formatted time string, e.g. `+2024-05-01T00:00:00Z`.
  Time(String),
  Coordinate(Map<String, Value>),
}

impl fmt::Display for PureValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EntityId(s) | Self::Text(s) | Self::Time(s) => f.write_str(s),
      Self::Quantity(n) => write!(f, "{n}"),
      Self::Coordinate(m) => write!(f, "{}", Value::Object(m.clone())),
    }
  }
}

// ─── Claim ───────────────────────────────────────────────────────────────────

/// Shape of a claim object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawClaim {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  id:         Option<String>,
  mainsnak:   Snak,
  #[serde(default)]
  rank:       Option<String>,
  #[serde(default, skip_serializing_if = "Map::is_empty")]
  qualifiers: Map<String, Value>,
  #[serde(flatten)]
  extra:      Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
  id:         Option<String>,
  snak:       Snak,
  rank:       Rank,
  qualifiers: Map<String, Value>,
  /// Unmodelled fields of the server object: statement type, references,
  /// qualifier order.
  extra:      Map<String, Value>,
}

impl Claim {
  /// A local, unsubmitted claim around a fully built snak.
  pub fn new(snak: Snak) -> Self {
    Self {
      id: None,
      snak,
      rank: Rank::Normal,
      qualifiers: Map::new(),
      extra: Map::new(),
    }
  }

  /// Parse a claim object returned by the service.
  pub fn from_json(value: &Value) -> Result<Self> {
    let raw: RawClaim = serde_json::from_value(value.clone())?;
    let rank = match raw.rank.as_deref() {
      Some(r) => r.parse()?,
      None => Rank::Normal,
    };
    Ok(Self {
      id: raw.id,
      snak: raw.mainsnak,
      rank,
      qualifiers: raw.qualifiers,
      extra: raw.extra,
    })
  }

  /// Serialise back into the service's claim object shape.
  pub fn to_json(&self) -> Result<Value> {
    let raw = RawClaim {
      id:         self.id.clone(),
      mainsnak:   self.snak.clone(),
      rank:       Some(self.rank.as_str().to_owned()),
      qualifiers: self.qualifiers.clone(),
      extra:      self.extra.clone(),
    };
    Ok(serde_json::to_value(raw)?)
  }

  /// The server-assigned claim id; `None` until the claim is submitted.
  pub fn id(&self) -> Option<&str> { self.id.as_deref() }

  pub fn property(&self) -> &str { &self.snak.property }

  pub fn rank(&self) -> Rank { self.rank }

  pub fn numeric_rank(&self) -> i8 { self.rank.numeric() }

  pub fn snak(&self) -> &Snak { &self.snak }

  pub fn qualifiers(&self) -> &Map<String, Value> { &self.qualifiers }

  /// The data value's type tag, e.g. `"monolingualtext"`.
  pub fn kind(&self) -> Option<&str> {
    self.snak.datavalue.as_ref().map(|dv| dv.kind.as_str())
  }

  /// The property's datatype as recorded in the snak.
  pub fn datatype(&self) -> Option<Datatype> {
    self.snak.datatype.as_deref().map(Datatype::parse)
  }

  /// The raw data value payload; `None` for `novalue`/`somevalue` snaks.
  pub fn value(&self) -> Option<&Value> {
    self.snak.datavalue.as_ref().map(|dv| &dv.value)
  }

  /// The value reduced to its most useful scalar.
  pub fn pure_value(&self) -> Option<PureValue> {
    let value = self.value()?;
    let datatype = self.datatype().filter(Datatype::is_supported);

    let by_datatype = datatype.as_ref().map(|dt| {
      if dt.entity_type().is_some() {
        "wikibase-entityid"
      } else if dt.is_string_like() {
        "string"
      } else {
        match dt {
          Datatype::MonolingualText => "monolingualtext",
          Datatype::GlobeCoordinate => "globecoordinate",
          Datatype::Quantity => "quantity",
          _ => "time",
        }
      }
    });

    match by_datatype.or(self.kind())? {
      "wikibase-entityid" | "wikibase-entity" => entity_id(value).map(PureValue::EntityId),
      "string" => value
        .as_str()
        .or_else(|| value.get("value").and_then(Value::as_str))
        .map(|s| PureValue::Text(s.to_owned())),
      "monolingualtext" => text_field(value, "text").map(PureValue::Text),
      "quantity" => value
        .get("amount")
        .and_then(Value::as_str)
        .and_then(|a| a.trim_start_matches('+').parse().ok())
        .map(PureValue::Quantity),
      "time" => text_field(value, "time").map(PureValue::Time),
      "globecoordinate" => value.as_object().cloned().map(PureValue::Coordinate),
      _ => None,
    }
  }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
  value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// The id of an entity reference, reconstructing `Q<n>` from a bare
/// `numeric-id` when needed.
fn entity_id(value: &Value) -> Option<String> {
  if let Some(id) = value.get("id").and_then(Value::as_str) {
    return Some(id.to_owned());
  }
  let numeric = value.get("numeric-id")?.as_u64()?;
  let prefix = match value.get("entity-type").and_then(Value::as_str) {
    Some("property") => 'P',
    Some("lexeme") => 'L',
    _ => 'Q',
  };
  Some(format!("{prefix}{numeric}"))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{mock::item_claim, value::ClaimValue};

  #[test]
  fn ranks_map_to_ordinals() {
    for (rank, n) in [("preferred", 1), ("normal", 0), ("deprecated", -1)] {
      let claim = Claim::from_json(&item_claim("P31", "Q5", rank)).unwrap();
      assert_eq!(claim.rank().as_str(), rank);
      assert_eq!(claim.numeric_rank(), n);
    }
  }

  #[test]
  fn unknown_rank_fails() {
    let err = Claim::from_json(&item_claim("P31", "Q5", "best")).unwrap_err();
    assert!(matches!(err, Error::UnknownRank(ref r) if r == "best"));
  }

  #[test]
  fn missing_rank_is_normal() {
    let mut raw = item_claim("P31", "Q5", "normal");
    raw.as_object_mut().unwrap().remove("rank");
    assert_eq!(Claim::from_json(&raw).unwrap().rank(), Rank::Normal);
  }

  #[test]
  fn read_path_exposes_fields() {
    let claim = Claim::from_json(&item_claim("P5137", "Q19269277", "normal")).unwrap();
    assert_eq!(claim.id(), Some("L123$P5137-Q19269277"));
    assert_eq!(claim.property(), "P5137");
    assert_eq!(claim.kind(), Some("wikibase-entityid"));
    assert_eq!(claim.datatype(), Some(Datatype::WikibaseItem));
    assert_eq!(
      claim.pure_value(),
      Some(PureValue::EntityId("Q19269277".into()))
    );
  }

  #[test]
  fn monolingual_pure_value_is_text() {
    let claim = Claim::from_json(&json!({
      "mainsnak": {
        "snaktype": "value",
        "property": "P5831",
        "datatype": "monolingualtext",
        "datavalue": {
          "type": "monolingualtext",
          "value": {"text": "He was first in line.", "language": "en"},
        },
      },
      "rank": "normal",
    }))
    .unwrap();
    assert_eq!(claim.kind(), Some("monolingualtext"));
    assert_eq!(
      claim.pure_value(),
      Some(PureValue::Text("He was first in line.".into()))
    );
    assert_eq!(claim.value().unwrap()["language"], "en");
  }

  #[test]
  fn numeric_id_only_reference() {
    let claim = Claim::from_json(&json!({
      "mainsnak": {
        "snaktype": "value",
        "property": "P7",
        "datavalue": {
          "type": "wikibase-entityid",
          "value": {"entity-type": "item", "numeric-id": 100},
        },
      },
    }))
    .unwrap();
    assert_eq!(claim.pure_value(), Some(PureValue::EntityId("Q100".into())));
  }

  #[test]
  fn external_id_falls_back_to_type_tag() {
    let claim = Claim::from_json(&json!({
      "mainsnak": {
        "snaktype": "value",
        "property": "P1",
        "datatype": "external-id",
        "datavalue": {"type": "string", "value": "abc"},
      },
    }))
    .unwrap();
    assert_eq!(claim.pure_value(), Some(PureValue::Text("abc".into())));
  }

  #[test]
  fn novalue_snak_has_no_value() {
    let claim = Claim::from_json(&json!({
      "mainsnak": {"snaktype": "novalue", "property": "P31"},
      "rank": "deprecated",
    }))
    .unwrap();
    assert_eq!(claim.value(), None);
    assert_eq!(claim.pure_value(), None);
    assert_eq!(claim.kind(), None);
  }

  #[test]
  fn built_quantity_reads_back_as_number() {
    let snak = Snak::build("P2021", &Datatype::Quantity, ClaimValue::Number(6.0)).unwrap();
    let claim = Claim::new(snak);
    assert_eq!(claim.id(), None);
    assert_eq!(claim.kind(), Some("time"));
    assert_eq!(claim.pure_value(), Some(PureValue::Quantity(6.0)));
  }

  #[test]
  fn built_time_reads_back_as_string() {
    let day = chrono::NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
    let snak = Snak::build("P580", &Datatype::Time, day.into()).unwrap();
    assert_eq!(
      Claim::new(snak).pure_value(),
      Some(PureValue::Time("+2020-02-29T00:00:00Z".into()))
    );
  }

  #[test]
  fn built_string_reads_back_as_text() {
    let snak = Snak::build("P856", &Datatype::Url, "http://example.com/".into()).unwrap();
    assert_eq!(
      Claim::new(snak).pure_value(),
      Some(PureValue::Text("http://example.com/".into()))
    );
  }

  #[test]
  fn json_keeps_references() {
    let mut raw = item_claim("P31", "Q5", "preferred");
    raw["references"] = json!([{"hash": "abc"}]);
    let claim = Claim::from_json(&raw).unwrap();
    let back = claim.to_json().unwrap();
    assert_eq!(back["references"], raw["references"]);
    assert_eq!(back["type"], "statement");
    assert_eq!(back["rank"], "preferred");
    assert_eq!(back["mainsnak"], raw["mainsnak"]);
  }
}
