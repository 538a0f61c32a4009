//! Property datatypes and the memoizing resolver that looks them up.
//!
//! A property's datatype never changes on the server, so every lookup is
//! cached for as long as the cache lives. The cache is owned by the resolver
//! and injectable: share one across clients by wrapping it in an [`Arc`].

use std::{
  collections::HashMap,
  fmt,
  sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use serde_json::Value;
use tracing::debug;

use crate::{
  Error, Result,
  transport::{Params, Transport},
};

// ─── Datatype ────────────────────────────────────────────────────────────────

/// The server-declared value kind of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
  WikibaseLexeme,
  WikibaseForm,
  WikibaseSense,
  WikibaseItem,
  WikibaseProperty,
  String,
  TabularData,
  GeoShape,
  Url,
  MusicalNotation,
  Math,
  CommonsMedia,
  MonolingualText,
  GlobeCoordinate,
  Quantity,
  Time,
  /// Any datatype the value codec has no conversion for.
  Other(String),
}

impl Datatype {
  pub fn parse(s: &str) -> Self {
    match s {
      "wikibase-lexeme" => Self::WikibaseLexeme,
      "wikibase-form" => Self::WikibaseForm,
      "wikibase-sense" => Self::WikibaseSense,
      "wikibase-item" => Self::WikibaseItem,
      "wikibase-property" => Self::WikibaseProperty,
      "string" => Self::String,
      "tabular-data" => Self::TabularData,
      "geo-shape" => Self::GeoShape,
      "url" => Self::Url,
      "musical-notation" => Self::MusicalNotation,
      "math" => Self::Math,
      "commonsMedia" => Self::CommonsMedia,
      "monolingualtext" => Self::MonolingualText,
      "globe-coordinate" => Self::GlobeCoordinate,
      "quantity" => Self::Quantity,
      "time" => Self::Time,
      other => Self::Other(other.to_owned()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::WikibaseLexeme => "wikibase-lexeme",
      Self::WikibaseForm => "wikibase-form",
      Self::WikibaseSense => "wikibase-sense",
      Self::WikibaseItem => "wikibase-item",
      Self::WikibaseProperty => "wikibase-property",
      Self::String => "string",
      Self::TabularData => "tabular-data",
      Self::GeoShape => "geo-shape",
      Self::Url => "url",
      Self::MusicalNotation => "musical-notation",
      Self::Math => "math",
      Self::CommonsMedia => "commonsMedia",
      Self::MonolingualText => "monolingualtext",
      Self::GlobeCoordinate => "globe-coordinate",
      Self::Quantity => "quantity",
      Self::Time => "time",
      Self::Other(s) => s,
    }
  }

  /// For entity-reference datatypes, the `entity-type` used in their values
  /// (`"item"` for `wikibase-item`, ...).
  pub fn entity_type(&self) -> Option<&'static str> {
    match self {
      Self::WikibaseLexeme => Some("lexeme"),
      Self::WikibaseForm => Some("form"),
      Self::WikibaseSense => Some("sense"),
      Self::WikibaseItem => Some("item"),
      Self::WikibaseProperty => Some("property"),
      _ => None,
    }
  }

  /// Datatypes whose values are carried as a plain string.
  pub fn is_string_like(&self) -> bool {
    matches!(
      self,
      Self::String
        | Self::TabularData
        | Self::GeoShape
        | Self::Url
        | Self::MusicalNotation
        | Self::Math
        | Self::CommonsMedia
    )
  }

  pub fn is_supported(&self) -> bool { !matches!(self, Self::Other(_)) }
}

impl fmt::Display for Datatype {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Backing store for resolved datatypes. Entries are written once and never
/// invalidated.
pub trait DatatypeCache: Send + Sync {
  fn get(&self, property_id: &str) -> Option<Datatype>;

  fn insert(&self, property_id: &str, datatype: Datatype);
}

/// Unbounded in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
  entries: RwLock<HashMap<String, Datatype>>,
}

impl MemoryCache {
  // Entries are write-once, so a poisoned map is still consistent.
  fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Datatype>> {
    self.entries.read().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn len(&self) -> usize { self.read().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl DatatypeCache for MemoryCache {
  fn get(&self, property_id: &str) -> Option<Datatype> {
    self.read().get(property_id).cloned()
  }

  fn insert(&self, property_id: &str, datatype: Datatype) {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.entry(property_id.to_owned()).or_insert(datatype);
  }
}

impl<C: DatatypeCache + ?Sized> DatatypeCache for Arc<C> {
  fn get(&self, property_id: &str) -> Option<Datatype> {
    (**self).get(property_id)
  }

  fn insert(&self, property_id: &str, datatype: Datatype) {
    (**self).insert(property_id, datatype)
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Maps property ids to their declared datatype, one query per property.
///
/// Two threads resolving the same uncached property may both query the
/// service; both arrive at the same value.
pub struct DatatypeResolver {
  cache: Box<dyn DatatypeCache>,
}

impl Default for DatatypeResolver {
  fn default() -> Self { Self::new(MemoryCache::default()) }
}

impl DatatypeResolver {
  pub fn new(cache: impl DatatypeCache + 'static) -> Self {
    Self {
      cache: Box::new(cache),
    }
  }

  pub fn resolve<T: Transport + ?Sized>(
    &self,
    transport: &T,
    property_id: &str,
  ) -> Result<Datatype> {
    if let Some(datatype) = self.cache.get(property_id) {
      debug!(property_id, %datatype, "datatype cache hit");
      return Ok(datatype);
    }

    let params = Params::action("query")
      .set("prop", "revisions")
      .set("titles", format!("Property:{property_id}"))
      .set("rvprop", "content")
      .set("rvslots", "main");
    let data = transport
      .get(&params)
      .map_err(|e| Error::Transport(Box::new(e)))?;

    let datatype = datatype_from_page(property_id, &data)?;
    debug!(property_id, %datatype, "datatype resolved");
    self.cache.insert(property_id, datatype.clone());
    Ok(datatype)
  }
}

/// Read the `datatype` field out of a property page's JSON content.
fn datatype_from_page(property_id: &str, data: &Value) -> Result<Datatype> {
  let lookup_err = |reason: &str| Error::PropertyLookup {
    property: property_id.to_owned(),
    reason:   reason.to_owned(),
  };

  let page = data
    .pointer("/query/pages")
    .and_then(Value::as_object)
    .and_then(|pages| pages.values().next())
    .ok_or_else(|| lookup_err("no page in response"))?;

  if page.get("missing").is_some() || page.get("invalid").is_some() {
    return Err(lookup_err("property page does not exist"));
  }

  let revision = page
    .pointer("/revisions/0")
    .ok_or_else(|| lookup_err("page has no revision"))?;
  let content = revision
    .get("*")
    .or_else(|| revision.pointer("/slots/main/*"))
    .and_then(Value::as_str)
    .ok_or_else(|| lookup_err("revision has no content"))?;

  let content: Value = serde_json::from_str(content)
    .map_err(|e| lookup_err(&format!("page content is not JSON: {e}")))?;
  content
    .get("datatype")
    .and_then(Value::as_str)
    .map(Datatype::parse)
    .ok_or_else(|| lookup_err("page content has no datatype"))
}
