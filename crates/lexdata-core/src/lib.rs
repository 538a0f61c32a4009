//! Core data model and synchronization protocol for editing Lexemes on a
//! Wikibase instance.
//!
//! This crate is deliberately free of HTTP dependencies. Requests go through
//! the [`Transport`] trait; `lexdata-session` provides the real implementation.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use lexdata_core::{Client, Entity, Lexeme};
//!
//! let client = Client::new(session);
//! let mut lexeme = Lexeme::fetch(&client, "L2")?;
//! println!("{} ({})", lexeme.lemma().unwrap_or_default(), lexeme.id);
//! lexeme.create_form(&client, "firsts", ["Q146786"], None, None)?;
//! ```

pub mod claim;
pub mod datatype;
pub mod entity;
pub mod error;
pub mod form;
pub mod language;
pub mod lexeme;
pub mod search;
pub mod sense;
pub mod transport;
pub mod value;

pub use claim::{Claim, PureValue, Rank};
pub use datatype::{Datatype, DatatypeCache, DatatypeResolver, MemoryCache};
pub use entity::{ClaimsInput, Entity, Term};
pub use error::{Error, Result};
pub use form::Form;
pub use language::Language;
pub use lexeme::Lexeme;
pub use search::{create_lexeme, get_or_create_lexeme, search_lexemes};
pub use sense::Sense;
pub use transport::{AUTO_TOKEN, Client, Params, Transport};
pub use value::{ClaimValue, DataValue, Snak, build_data_value};

#[cfg(test)]
mod mock;
