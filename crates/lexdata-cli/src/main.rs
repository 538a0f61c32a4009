//! `lexdata`: inspect and edit Wikidata lexemes from the command line.
//!
//! # Usage
//!
//! ```
//! lexdata show L2
//! lexdata --config lexdata.toml ensure first en Q1084
//! LEXDATA_USERNAME=Example@bot LEXDATA_PASSWORD=... lexdata add-form L2 firsts --feature Q146786
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexdata_core::Client;
use lexdata_session::{Session, SessionConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lexdata", version, about = "Edit lexemes on a Wikibase instance")]
struct Args {
  /// Path to a TOML config file (api_url, username, password, ...).
  #[arg(short, long, value_name = "FILE", default_value = "lexdata.toml")]
  config: PathBuf,

  /// Override the `api.php` endpoint.
  #[arg(long, env = "LEXDATA_API_URL")]
  api_url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print a lexeme with its forms, senses and claims.
  Show { lexeme: String },

  /// Print the datatype of a property.
  Datatype { property: String },

  /// List lexemes with an exact lemma, language and lexical category.
  Search {
    lemma:    String,
    language: String,
    category: String,
    /// Item id of the language, when it is not a built-in one.
    #[arg(long)]
    language_item: Option<String>,
  },

  /// Find a lexeme, creating it when none matches.
  Ensure {
    lemma:    String,
    language: String,
    category: String,
    #[arg(long)]
    language_item: Option<String>,
  },

  /// Add a form to a lexeme.
  AddForm {
    lexeme: String,
    text:   String,
    /// Grammatical feature item ids; may be repeated.
    #[arg(long = "feature")]
    features: Vec<String>,
    /// Representation language; defaults to the lexeme's.
    #[arg(long)]
    language: Option<String>,
  },

  /// Add a sense to a lexeme.
  AddSense {
    lexeme: String,
    /// Glosses as `lang=text`; may be repeated.
    #[arg(long = "gloss", required = true, value_parser = commands::parse_gloss)]
    glosses: Vec<(String, String)>,
  },

  /// Add a claim to a lexeme, form or sense.
  AddClaim {
    /// `L2`, `L2-F1` or `L2-S1`.
    entity:   String,
    property: String,
    /// Converted by the property's datatype: a number for quantities,
    /// `YYYY-MM-DD` for times, a JSON object as-is, text otherwise.
    value:    String,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(args.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("LEXDATA"))
    .set_override_option("api_url", args.api_url.clone())
    .context("invalid --api-url")?
    .build()
    .context("failed to read config file")?;
  let session_cfg: SessionConfig = settings
    .try_deserialize()
    .context("failed to deserialise SessionConfig")?;

  let api_url = session_cfg.api_url.clone();
  let session = Session::connect(session_cfg)
    .with_context(|| format!("failed to open session with {api_url}"))?;
  let client = Client::new(session);

  match args.command {
    Command::Show { lexeme } => commands::show(&client, &lexeme),
    Command::Datatype { property } => commands::datatype(&client, &property),
    Command::Search {
      lemma,
      language,
      category,
      language_item,
    } => {
      let language = commands::language(&language, language_item.as_deref())?;
      commands::search(&client, &lemma, &language, &category)
    }
    Command::Ensure {
      lemma,
      language,
      category,
      language_item,
    } => {
      let language = commands::language(&language, language_item.as_deref())?;
      commands::ensure(&client, &lemma, &language, &category)
    }
    Command::AddForm {
      lexeme,
      text,
      features,
      language,
    } => commands::add_form(&client, &lexeme, &text, features, language.as_deref()),
    Command::AddSense { lexeme, glosses } => commands::add_sense(&client, &lexeme, glosses),
    Command::AddClaim {
      entity,
      property,
      value,
    } => commands::add_claim(&client, &entity, &property, &value),
  }
}
