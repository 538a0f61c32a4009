//! The [`Entity`] trait shared by lexemes, forms and senses, and the
//! claim-addition protocol.
//!
//! Entities keep the service's JSON for their claims as-is. Typed views
//! ([`Entity::claims`], `Lexeme::forms`, ...) are recomputed from that raw data
//! on every call and never cached, so edits to the raw fields always show up.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::{
  Error, Result,
  claim::Claim,
  transport::{Client, Params, Transport},
};

// ─── Terms ───────────────────────────────────────────────────────────────────

/// A language-tagged text: a lemma, representation or gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
  pub language: String,
  pub value:    String,
}

/// Parse a `{lang: {language, value}}` map, keeping the service's order.
pub(crate) fn terms(raw: &Map<String, Value>) -> Result<Vec<Term>> {
  raw
    .values()
    .map(|v| serde_json::from_value(v.clone()).map_err(Error::from))
    .collect()
}

/// Build a `{lang: {language, value}}` map.
pub(crate) fn term_map<L, V>(entries: impl IntoIterator<Item = (L, V)>) -> Value
where
  L: Into<String>,
  V: Into<String>,
{
  let map: Map<String, Value> = entries
    .into_iter()
    .map(|(lang, value)| {
      let lang: String = lang.into();
      let value: String = value.into();
      let term = json!({"value": value, "language": lang});
      (lang, term)
    })
    .collect();
  Value::Object(map)
}

/// Wikibase serialises empty objects as `[]`; accept both shapes.
pub(crate) fn object_or_empty<'de, D>(de: D) -> Result<Map<String, Value>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(de)? {
    Value::Object(m) => Ok(m),
    Value::Array(a) if a.is_empty() => Ok(Map::new()),
    Value::Null => Ok(Map::new()),
    other => Err(serde::de::Error::custom(format!(
      "expected an object, found {other}"
    ))),
  }
}

// ─── Claims input ────────────────────────────────────────────────────────────

/// Claims to add to an entity.
#[derive(Debug, Clone)]
pub enum ClaimsInput {
  /// Prebuilt claims of any supported datatype.
  Claims(Vec<Claim>),
  /// Property id to referenced item ids, e.g. `{"P31": ["Q1", "Q2"]}`.
  /// Only entity-reference claims can be expressed this way.
  EntityIds(BTreeMap<String, Vec<String>>),
}

impl ClaimsInput {
  /// Build the mapping form from `(property, [ids])` pairs.
  pub fn entity_ids<P, I, S>(entries: impl IntoIterator<Item = (P, I)>) -> Self
  where
    P: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::EntityIds(
      entries
        .into_iter()
        .map(|(p, ids)| (p.into(), ids.into_iter().map(Into::into).collect()))
        .collect(),
    )
  }

  pub fn is_empty(&self) -> bool {
    match self {
      Self::Claims(c) => c.is_empty(),
      Self::EntityIds(m) => m.values().all(Vec::is_empty),
    }
  }
}

impl From<Vec<Claim>> for ClaimsInput {
  fn from(claims: Vec<Claim>) -> Self { Self::Claims(claims) }
}

impl From<BTreeMap<String, Vec<String>>> for ClaimsInput {
  fn from(map: BTreeMap<String, Vec<String>>) -> Self { Self::EntityIds(map) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Capabilities shared by every entity kind: an id and a set of claims.
pub trait Entity {
  /// The server-assigned id. Empty only for an entity that was never fetched
  /// or created.
  fn id(&self) -> &str;

  /// Claims as returned by the service: property id to array of claim objects.
  fn raw_claims(&self) -> &Map<String, Value>;

  fn raw_claims_mut(&mut self) -> &mut Map<String, Value>;

  /// All claims, parsed afresh from the raw data on every call.
  fn claims(&self) -> Result<BTreeMap<String, Vec<Claim>>> {
    self
      .raw_claims()
      .iter()
      .map(|(pid, list)| {
        let parsed = list
          .as_array()
          .map(|items| items.iter().map(Claim::from_json).collect::<Result<Vec<_>>>())
          .transpose()?
          .unwrap_or_default();
        Ok::<_, Error>((pid.clone(), parsed))
      })
      .collect()
  }

  /// Submit `claims` one write at a time, recording each created claim
  /// locally as soon as the service confirms it.
  fn add_claims<T: Transport>(
    &mut self,
    client: &Client<T>,
    claims: impl Into<ClaimsInput>,
  ) -> Result<()>
  where
    Self: Sized,
  {
    match claims.into() {
      ClaimsInput::Claims(claims) => {
        for claim in &claims {
          let value = submitted_value(claim)?;
          let property = claim.property().to_owned();
          create_claim(self, client, &property, &value)?;
        }
      }
      ClaimsInput::EntityIds(map) => {
        for (property, ids) in &map {
          for id in ids {
            let value = item_reference(id)?;
            create_claim(self, client, property, &value)?;
          }
        }
      }
    }
    Ok(())
  }
}

/// The `value` parameter of `wbcreateclaim` for `claim`. String data values
/// are built as `{"value": s}` but submitted as the bare string `s`.
fn submitted_value(claim: &Claim) -> Result<Value> {
  let value = claim.value().ok_or_else(|| Error::TypeMismatch {
    datatype: claim.snak().datatype.clone().unwrap_or_default(),
    found:    "snak without value",
  })?;
  let inner = value.get("value").filter(|v| v.is_string());
  match (claim.kind(), inner) {
    (Some("string"), Some(text)) => Ok(text.clone()),
    _ => Ok(value.clone()),
  }
}

/// `{"entity-type": "item", "numeric-id": n}` for an id like `Q100`.
fn item_reference(id: &str) -> Result<Value> {
  let numeric: u64 = id
    .get(1..)
    .and_then(|n| n.parse().ok())
    .ok_or_else(|| Error::InvalidEntityId(id.to_owned()))?;
  Ok(json!({"entity-type": "item", "numeric-id": numeric}))
}

/// One `wbcreateclaim` write, merged into the local claims on success.
fn create_claim<E, T>(
  entity: &mut E,
  client: &Client<T>,
  property: &str,
  value: &Value,
) -> Result<()>
where
  E: Entity + ?Sized,
  T: Transport,
{
  if entity.id().is_empty() {
    return Err(Error::MissingId);
  }

  let params = Params::action("wbcreateclaim")
    .set("entity", entity.id())
    .set("snaktype", "value")
    .set("bot", "1")
    .set("property", property)
    .set("value", value.to_string())
    .with_token();
  let data = client.post(&params)?;

  let added = data
    .get("claim")
    .cloned()
    .ok_or_else(|| Error::Protocol(format!("wbcreateclaim response has no claim: {data}")))?;
  info!(entity = entity.id(), property, "claim added");

  append_claim(entity.raw_claims_mut(), property, added);
  Ok(())
}

/// Append `claim` under `property`, creating the slot if needed.
pub(crate) fn append_claim(raw: &mut Map<String, Value>, property: &str, claim: Value) {
  let slot = raw
    .entry(property.to_owned())
    .or_insert_with(|| Value::Array(Vec::new()));
  match slot {
    Value::Array(items) => items.push(claim),
    other => *other = Value::Array(vec![claim]),
  }
}
