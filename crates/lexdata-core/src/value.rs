//! Value codec: user-supplied values to wire-level data values and snaks.
//!
//! Conversion is checked eagerly against the property's datatype, so a
//! mismatched value fails before any edit reaches the network.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{Error, Result, datatype::Datatype};

/// Calendar model of the proleptic Gregorian calendar.
pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

/// Time precision of a single day.
pub const PRECISION_DAY: u8 = 11;

// ─── Input ───────────────────────────────────────────────────────────────────

/// A raw value handed in by the caller, before datatype conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
  /// A pre-built wire payload, passed through as-is.
  Map(Map<String, Value>),
  Text(String),
  Number(f64),
  DateTime(NaiveDateTime),
}

impl ClaimValue {
  /// Name of the input kind, for error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Map(_) => "map",
      Self::Text(_) => "text",
      Self::Number(_) => "number",
      Self::DateTime(_) => "datetime",
    }
  }
}

impl From<&str> for ClaimValue {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for ClaimValue {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<f64> for ClaimValue {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<i32> for ClaimValue {
  fn from(n: i32) -> Self { Self::Number(n.into()) }
}

impl From<i64> for ClaimValue {
  fn from(n: i64) -> Self { Self::Number(n as f64) }
}

impl From<u32> for ClaimValue {
  fn from(n: u32) -> Self { Self::Number(n.into()) }
}

impl From<Map<String, Value>> for ClaimValue {
  fn from(m: Map<String, Value>) -> Self { Self::Map(m) }
}

impl From<NaiveDateTime> for ClaimValue {
  fn from(dt: NaiveDateTime) -> Self { Self::DateTime(dt) }
}

impl From<NaiveDate> for ClaimValue {
  fn from(d: NaiveDate) -> Self { Self::DateTime(d.and_time(NaiveTime::MIN)) }
}

impl From<DateTime<Utc>> for ClaimValue {
  fn from(dt: DateTime<Utc>) -> Self { Self::DateTime(dt.naive_utc()) }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

/// A typed data value as embedded in a snak: `{"value": ..., "type": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValue {
  pub value: Value,
  #[serde(rename = "type")]
  pub kind:  String,
}

impl DataValue {
  fn new(value: Value, kind: &str) -> Self {
    Self {
      value,
      kind: kind.to_owned(),
    }
  }
}

/// The atomic property/value unit of a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snak {
  pub snaktype:  String,
  pub property:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datavalue: Option<DataValue>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datatype:  Option<String>,
  /// Fields not modelled above, such as the server's `hash`.
  #[serde(flatten)]
  pub extra:     Map<String, Value>,
}

impl Snak {
  /// A `value` snak for `property_id` holding `value` converted per `datatype`.
  pub fn build(
    property_id: &str,
    datatype: &Datatype,
    value: ClaimValue,
  ) -> Result<Self> {
    Ok(Self {
      snaktype:  "value".to_owned(),
      property:  property_id.to_owned(),
      datavalue: Some(build_data_value(datatype, value)?),
      datatype:  Some(datatype.as_str().to_owned()),
      extra:     Map::new(),
    })
  }
}

// ─── Codec ───────────────────────────────────────────────────────────────────

/// Convert `value` into the data value expected for `datatype`.
pub fn build_data_value(datatype: &Datatype, value: ClaimValue) -> Result<DataValue> {
  let mismatch = |value: &ClaimValue| Error::TypeMismatch {
    datatype: datatype.as_str().to_owned(),
    found:    value.kind(),
  };

  if let Some(entity_type) = datatype.entity_type() {
    return match value {
      ClaimValue::Map(m) => Ok(DataValue::new(Value::Object(m), "wikibase-entityid")),
      ClaimValue::Text(id) => Ok(DataValue::new(
        json!({"entity-type": entity_type, "id": id}),
        "wikibase-entityid",
      )),
      other => Err(mismatch(&other)),
    };
  }

  if datatype.is_string_like() {
    return match value {
      ClaimValue::Map(m) => Ok(DataValue::new(Value::Object(m), "string")),
      ClaimValue::Text(s) => Ok(DataValue::new(json!({"value": s}), "string")),
      other => Err(mismatch(&other)),
    };
  }

  match datatype {
    Datatype::MonolingualText => match value {
      ClaimValue::Map(m) => Ok(DataValue::new(Value::Object(m), "monolingualtext")),
      other => Err(mismatch(&other)),
    },
    Datatype::GlobeCoordinate => match value {
      ClaimValue::Map(m) => Ok(DataValue::new(Value::Object(m), "globecoordinate")),
      other => Err(mismatch(&other)),
    },
    Datatype::Quantity => match value {
      ClaimValue::Map(m) => Ok(DataValue::new(Value::Object(m), "quantity")),
      // Tagged "time" rather than "quantity"; kept as the service has always
      // received it from this codec.
      ClaimValue::Number(n) => Ok(DataValue::new(
        json!({"amount": format_amount(n), "unit": "1"}),
        "time",
      )),
      other => Err(mismatch(&other)),
    },
    Datatype::Time => match value {
      ClaimValue::Map(m) => Ok(DataValue::new(Value::Object(m), "time")),
      ClaimValue::DateTime(dt) => Ok(DataValue::new(
        json!({
          "time": format_day(dt),
          "timezone": 0,
          "before": 0,
          "after": 0,
          "precision": PRECISION_DAY,
          "calendarmodel": GREGORIAN_CALENDAR,
        }),
        "time",
      )),
      other => Err(mismatch(&other)),
    },
    other => Err(Error::UnsupportedDatatype(other.as_str().to_owned())),
  }
}

/// Signed decimal with six fractional digits, e.g. `+6.000000`.
pub fn format_amount(n: f64) -> String { format!("{n:+.6}") }

/// `dt` truncated to its day, e.g. `+2024-05-01T00:00:00Z`. The year always
/// carries a sign and at least four digits: `-0044`, `+12000`.
pub fn format_day(dt: NaiveDateTime) -> String {
  let day = dt.date();
  format!(
    "{:+05}-{:02}-{:02}T00:00:00Z",
    day.year(),
    day.month(),
    day.day()
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn object(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => panic!("not an object"),
    }
  }

  #[test]
  fn entity_id_string_expands_to_reference() {
    let dv = build_data_value(&Datatype::WikibaseItem, "Q1".into()).unwrap();
    assert_eq!(dv.kind, "wikibase-entityid");
    assert_eq!(dv.value, json!({"entity-type": "item", "id": "Q1"}));

    let dv = build_data_value(&Datatype::WikibaseSense, "L2-S1".into()).unwrap();
    assert_eq!(dv.value, json!({"entity-type": "sense", "id": "L2-S1"}));
  }

  #[test]
  fn entity_map_passes_through() {
    let m = object(json!({"entity-type": "lexeme", "numeric-id": 2}));
    let dv = build_data_value(&Datatype::WikibaseLexeme, m.clone().into()).unwrap();
    assert_eq!(dv.value, Value::Object(m));
  }

  #[test]
  fn entity_rejects_number() {
    let err = build_data_value(&Datatype::WikibaseItem, 1.into()).unwrap_err();
    assert!(matches!(
      err,
      Error::TypeMismatch { ref datatype, found: "number" } if datatype == "wikibase-item"
    ));
  }

  #[test]
  fn string_like_wraps_text() {
    for dt in [
      Datatype::String,
      Datatype::Url,
      Datatype::Math,
      Datatype::CommonsMedia,
      Datatype::TabularData,
      Datatype::GeoShape,
      Datatype::MusicalNotation,
    ] {
      let dv = build_data_value(&dt, "http://example.com/".into()).unwrap();
      assert_eq!(dv.kind, "string", "{dt}");
      assert_eq!(dv.value, json!({"value": "http://example.com/"}));
    }
  }

  #[test]
  fn url_rejects_number() {
    assert!(matches!(
      build_data_value(&Datatype::Url, 1.into()),
      Err(Error::TypeMismatch { .. })
    ));
  }

  #[test]
  fn monolingual_requires_map() {
    let m = object(json!({"text": "He was first in line.", "language": "en"}));
    let dv = build_data_value(&Datatype::MonolingualText, m.into()).unwrap();
    assert_eq!(dv.kind, "monolingualtext");

    assert!(matches!(
      build_data_value(&Datatype::MonolingualText, "text".into()),
      Err(Error::TypeMismatch { found: "text", .. })
    ));
  }

  #[test]
  fn coordinate_requires_map() {
    let m = object(json!({"latitude": 52.5, "longitude": 13.4, "precision": 0.1}));
    let dv = build_data_value(&Datatype::GlobeCoordinate, m.into()).unwrap();
    assert_eq!(dv.kind, "globecoordinate");

    assert!(build_data_value(&Datatype::GlobeCoordinate, 1.5.into()).is_err());
  }

  #[test]
  fn quantity_number_keeps_time_tag() {
    let dv = build_data_value(&Datatype::Quantity, 6.into()).unwrap();
    assert_eq!(dv.kind, "time");
    assert_eq!(dv.value, json!({"amount": "+6.000000", "unit": "1"}));
  }

  #[test]
  fn quantity_map_is_tagged_quantity() {
    let m = object(json!({"amount": "+1", "unit": "1"}));
    let dv = build_data_value(&Datatype::Quantity, m.into()).unwrap();
    assert_eq!(dv.kind, "quantity");
  }

  #[test]
  fn quantity_rejects_text() {
    assert!(matches!(
      build_data_value(&Datatype::Quantity, "foo".into()),
      Err(Error::TypeMismatch { found: "text", .. })
    ));
  }

  #[test]
  fn amount_formatting() {
    assert_eq!(format_amount(6.0), "+6.000000");
    assert_eq!(format_amount(-2.5), "-2.500000");
    assert_eq!(format_amount(0.1234567), "+0.123457");
  }

  #[test]
  fn time_truncates_to_day() {
    let dt = NaiveDate::from_ymd_opt(2024, 5, 1)
      .unwrap()
      .and_hms_micro_opt(13, 45, 12, 999)
      .unwrap();
    let dv = build_data_value(&Datatype::Time, dt.into()).unwrap();
    assert_eq!(dv.kind, "time");
    assert_eq!(dv.value["time"], "+2024-05-01T00:00:00Z");
    assert_eq!(dv.value["precision"], 11);
    assert_eq!(dv.value["timezone"], 0);
    assert_eq!(dv.value["before"], 0);
    assert_eq!(dv.value["after"], 0);
    assert_eq!(dv.value["calendarmodel"], GREGORIAN_CALENDAR);
  }

  #[test]
  fn time_years_outside_four_digits() {
    let bce = NaiveDate::from_ymd_opt(-44, 3, 15).unwrap();
    let dv = build_data_value(&Datatype::Time, bce.into()).unwrap();
    assert_eq!(dv.value["time"], "-0044-03-15T00:00:00Z");

    let far = NaiveDate::from_ymd_opt(12000, 1, 1).unwrap();
    let dv = build_data_value(&Datatype::Time, far.into()).unwrap();
    assert_eq!(dv.value["time"], "+12000-01-01T00:00:00Z");

    let early = NaiveDate::from_ymd_opt(476, 9, 4).unwrap();
    assert_eq!(
      format_day(early.and_time(NaiveTime::MIN)),
      "+0476-09-04T00:00:00Z"
    );
  }

  #[test]
  fn time_rejects_number_and_text() {
    assert!(build_data_value(&Datatype::Time, 1.into()).is_err());
    assert!(build_data_value(&Datatype::Time, "foo".into()).is_err());
  }

  #[test]
  fn unsupported_datatype() {
    let err =
      build_data_value(&Datatype::parse("external-id"), "foo".into()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDatatype(ref d) if d == "external-id"));
  }

  #[test]
  fn snak_carries_datatype_name() {
    let snak = Snak::build("P5137", &Datatype::WikibaseItem, "Q1".into()).unwrap();
    let json = serde_json::to_value(&snak).unwrap();
    assert_eq!(json["snaktype"], "value");
    assert_eq!(json["property"], "P5137");
    assert_eq!(json["datatype"], "wikibase-item");
    assert_eq!(json["datavalue"]["type"], "wikibase-entityid");
    assert!(json.get("hash").is_none());
  }

  #[test]
  fn snak_keeps_server_hash() {
    let raw = json!({
      "snaktype": "value",
      "property": "P856",
      "hash": "5c1a3d",
      "datatype": "url",
      "datavalue": {"type": "string", "value": "http://example.com/"},
    });
    let snak: Snak = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(snak.extra["hash"], "5c1a3d");
    assert_eq!(serde_json::to_value(&snak).unwrap(), raw);
  }
}
