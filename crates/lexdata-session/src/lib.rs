//! HTTP transport for `lexdata-core`: a blocking `reqwest` session against a
//! MediaWiki/Wikibase `api.php` endpoint, with bot-password login, CSRF
//! tokens and `maxlag` back-off.

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::{ANONYMOUS_TOKEN, Session};
