//! [`Lexeme`]: the top-level lexicographical entity, and the write protocol
//! for its forms and senses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::{
  Error, Result,
  entity::{ClaimsInput, Entity, Term, object_or_empty, term_map, terms},
  form::Form,
  language::Language,
  sense::Sense,
  transport::{Client, Params, Transport},
};

/// Local mirror of a lexeme entity.
///
/// `forms` and `senses` hold the service's JSON; [`Lexeme::forms`] and
/// [`Lexeme::senses`] wrap them into fresh view objects on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexeme {
  #[serde(default)]
  pub id:               String,
  #[serde(default, deserialize_with = "object_or_empty")]
  pub lemmas:           Map<String, Value>,
  /// Item id of the lexeme's language, e.g. `Q1860`.
  #[serde(default, rename = "language", skip_serializing_if = "Option::is_none")]
  pub language_item:    Option<String>,
  #[serde(default, rename = "lexicalCategory", skip_serializing_if = "Option::is_none")]
  pub lexical_category: Option<String>,
  #[serde(default)]
  pub forms:            Vec<Value>,
  #[serde(default)]
  pub senses:           Vec<Value>,
  #[serde(default, deserialize_with = "object_or_empty")]
  pub claims:           Map<String, Value>,
  /// Fields not modelled above (`lastrevid`, `modified`, ...).
  #[serde(flatten)]
  pub extra:            Map<String, Value>,
}

impl Lexeme {
  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Fetch the lexeme `id` from the service.
  pub fn fetch<T: Transport>(client: &Client<T>, id: &str) -> Result<Self> {
    let params = Params::action("wbgetentities").set("ids", id);
    let data = client.get(&params)?;

    let entity = data
      .get("entities")
      .and_then(|entities| entities.get(id))
      .ok_or_else(|| Error::Protocol(format!("wbgetentities response has no entity {id}")))?;
    if entity.get("missing").is_some() {
      return Err(Error::EntityNotFound(id.to_owned()));
    }

    let lexeme = Self::from_json(entity.clone())?;
    if lexeme.lemmas.is_empty() {
      return Err(Error::Protocol(format!("lexeme {id} has no lemma")));
    }
    Ok(lexeme)
  }

  /// Parse a lexeme from its entity JSON.
  pub fn from_json(value: Value) -> Result<Self> { Ok(serde_json::from_value(value)?) }

  /// Discard local state and fetch the lexeme again.
  pub fn reload<T: Transport>(&mut self, client: &Client<T>) -> Result<()> {
    if self.id.is_empty() {
      return Err(Error::MissingId);
    }
    *self = Self::fetch(client, &self.id)?;
    Ok(())
  }

  fn first_lemma(&self) -> Option<&Value> { self.lemmas.values().next() }

  /// Text of the first lemma, in the order the service returned them.
  pub fn lemma(&self) -> Option<&str> { self.first_lemma()?.get("value")?.as_str() }

  /// Language code of the first lemma.
  pub fn language(&self) -> Option<&str> {
    self.first_lemma()?.get("language")?.as_str()
  }

  pub fn lemmas(&self) -> Result<Vec<Term>> { terms(&self.lemmas) }

  pub fn language_item(&self) -> Option<&str> { self.language_item.as_deref() }

  pub fn lexical_category(&self) -> Option<&str> { self.lexical_category.as_deref() }

  pub fn forms(&self) -> Result<Vec<Form>> {
    self.forms.iter().cloned().map(Form::from_json).collect()
  }

  pub fn senses(&self) -> Result<Vec<Sense>> {
    self.senses.iter().cloned().map(Sense::from_json).collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Add a form with a single representation and return its new id.
  ///
  /// The representation's language defaults to the lexeme's own language.
  /// When one of `claims` fails, the form is still recorded locally with the
  /// claims that did succeed, and the claim error is returned.
  pub fn create_form<T, I, S>(
    &mut self,
    client: &Client<T>,
    text: &str,
    grammatical_features: I,
    language: Option<&Language>,
    claims: Option<ClaimsInput>,
  ) -> Result<String>
  where
    T: Transport,
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let id = self.require_id()?.to_owned();
    let language = match language {
      Some(l) => l.code.to_string(),
      None => self
        .language()
        .ok_or_else(|| Error::Protocol(format!("lexeme {id} has no lemma language")))?
        .to_owned(),
    };
    let features: Vec<String> = grammatical_features.into_iter().map(Into::into).collect();

    let data = json!({
      "representations": term_map([(language, text)]),
      "grammaticalFeatures": features,
    });
    let params = Params::action("wbladdform")
      .set("lexemeId", &id)
      .set("bot", "1")
      .set("data", data.to_string())
      .with_token();
    let response = client.post(&params)?;

    let mut form = Form::from_json(created(&response, "form")?)?;
    info!(lexeme = %id, form = %form.id, "created form");

    let added = match claims.filter(|c| !c.is_empty()) {
      Some(claims) => form.add_claims(client, claims),
      None => Ok(()),
    };

    let form_id = form.id.clone();
    self.forms.push(serde_json::to_value(&form)?);
    added.map(|()| form_id)
  }

  /// Add a sense with one gloss per language and return its new id.
  ///
  /// A failing claim leaves the created sense recorded locally, as in
  /// [`Lexeme::create_form`].
  pub fn create_sense<T, L, V>(
    &mut self,
    client: &Client<T>,
    glosses: impl IntoIterator<Item = (L, V)>,
    claims: Option<ClaimsInput>,
  ) -> Result<String>
  where
    T: Transport,
    L: Into<String>,
    V: Into<String>,
  {
    let id = self.require_id()?.to_owned();
    let data = json!({"glosses": term_map(glosses)});
    let params = Params::action("wbladdsense")
      .set("lexemeId", &id)
      .set("bot", "1")
      .set("data", data.to_string())
      .with_token();
    let response = client.post(&params)?;

    let mut sense = Sense::from_json(created(&response, "sense")?)?;
    info!(lexeme = %id, sense = %sense.id, "created sense");

    let added = match claims.filter(|c| !c.is_empty()) {
      Some(claims) => sense.add_claims(client, claims),
      None => Ok(()),
    };

    let sense_id = sense.id.clone();
    self.senses.push(serde_json::to_value(&sense)?);
    added.map(|()| sense_id)
  }

  /// Add entity-reference claims to the lexeme.
  #[deprecated(note = "use `Entity::add_claims` instead")]
  pub fn create_claims<T: Transport>(
    &mut self,
    client: &Client<T>,
    claims: std::collections::BTreeMap<String, Vec<String>>,
  ) -> Result<()> {
    warn!("create_claims() is deprecated and might be removed; use add_claims() instead");
    self.add_claims(client, ClaimsInput::EntityIds(claims))
  }

  /// Submit a raw `wbeditentity` payload, then re-read the whole lexeme.
  ///
  /// With `overwrite` the service replaces the entity instead of merging.
  /// The edit response cannot be used to update local state, so the lexeme
  /// is always fetched again afterwards.
  pub fn update_from_json<T: Transport>(
    &mut self,
    client: &Client<T>,
    data: &Value,
    overwrite: bool,
  ) -> Result<()> {
    let id = self.require_id()?.to_owned();
    let mut params = Params::action("wbeditentity")
      .set("bot", "1")
      .set("id", &id)
      .set("data", data.to_string())
      .with_token();
    if overwrite {
      params.insert("clear", "true");
    }

    let response = client.post(&params)?;
    if !reports_success(&response) {
      return Err(Error::EditRejected(response));
    }
    info!(lexeme = %id, overwrite, "updated from json data");

    self.reload(client)
  }

  fn require_id(&self) -> Result<&str> {
    if self.id.is_empty() {
      Err(Error::MissingId)
    } else {
      Ok(&self.id)
    }
  }
}

impl Entity for Lexeme {
  fn id(&self) -> &str { &self.id }

  fn raw_claims(&self) -> &Map<String, Value> { &self.claims }

  fn raw_claims_mut(&mut self) -> &mut Map<String, Value> { &mut self.claims }
}

/// The created sub-entity under `key`, which must carry an id.
fn created(response: &Value, key: &str) -> Result<Value> {
  let entity = response
    .get(key)
    .filter(|e| e.get("id").and_then(Value::as_str).is_some())
    .ok_or_else(|| Error::Protocol(format!("response has no {key} with an id: {response}")))?;
  Ok(entity.clone())
}

/// Whether an edit response reports success. The service sends `1`; `200`
/// is accepted as well.
pub(crate) fn reports_success(response: &Value) -> bool {
  matches!(response.get("success").and_then(Value::as_i64), Some(1 | 200))
}
