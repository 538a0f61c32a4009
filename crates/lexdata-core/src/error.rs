//! Error types for `lexdata-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A value's runtime shape does not fit what its datatype expects.
  #[error("cannot convert {found} to datatype {datatype}")]
  TypeMismatch {
    datatype: String,
    found:    &'static str,
  },

  #[error("datatype {0} is not implemented")]
  UnsupportedDatatype(String),

  #[error("invalid entity id: {0:?}")]
  InvalidEntityId(String),

  #[error("unknown rank: {0:?}")]
  UnknownRank(String),

  #[error("cannot determine datatype of property {property}: {reason}")]
  PropertyLookup { property: String, reason: String },

  #[error("entity not found: {0}")]
  EntityNotFound(String),

  #[error("entity has no id yet")]
  MissingId,

  /// The service answered without a field the protocol requires.
  #[error("protocol violation: {0}")]
  Protocol(String),

  /// The service reported a non-success for an edit; the full response is
  /// kept for diagnosis.
  #[error("edit rejected: {0}")]
  EditRejected(serde_json::Value),

  #[error("transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
