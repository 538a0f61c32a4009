//! Command implementations. Each prints its result to stdout.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use lexdata_core::{
  Claim, ClaimValue, Client, Datatype, Entity, Language, Lexeme, Transport,
  get_or_create_lexeme, search_lexemes,
};
use serde_json::Value;

/// `code` as a [`Language`], using `item` or the built-in table for its item id.
pub fn language(code: &str, item: Option<&str>) -> Result<Language> {
  match item {
    Some(item) => Ok(Language::new(code, item)),
    None => Language::known(code)
      .ok_or_else(|| anyhow!("unknown language {code:?}; pass --language-item")),
  }
}

/// Parse `lang=text`.
pub fn parse_gloss(raw: &str) -> Result<(String, String), String> {
  match raw.split_once('=') {
    Some((lang, text)) if !lang.is_empty() && !text.is_empty() => {
      Ok((lang.to_owned(), text.to_owned()))
    }
    _ => Err(format!("expected lang=text, got {raw:?}")),
  }
}

/// Convert command-line text into a claim value for `datatype`.
pub fn parse_value(datatype: &Datatype, raw: &str) -> Result<ClaimValue> {
  if raw.trim_start().starts_with('{') {
    let value: Value = serde_json::from_str(raw).context("value is not valid JSON")?;
    return match value {
      Value::Object(map) => Ok(map.into()),
      _ => bail!("expected a JSON object"),
    };
  }
  match datatype {
    Datatype::Quantity => {
      let n: f64 = raw
        .parse()
        .with_context(|| format!("{raw:?} is not a number"))?;
      Ok(n.into())
    }
    Datatype::Time => {
      let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("{raw:?} is not a YYYY-MM-DD date"))?;
      Ok(day.into())
    }
    _ => Ok(raw.into()),
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn show<T: Transport>(client: &Client<T>, id: &str) -> Result<()> {
  let lexeme = Lexeme::fetch(client, id).with_context(|| format!("fetching {id}"))?;

  println!(
    "{}  {} ({})  category {}",
    lexeme.id,
    lexeme.lemma().unwrap_or_default(),
    lexeme.language().unwrap_or_default(),
    lexeme.lexical_category().unwrap_or("?"),
  );
  print_claims(&lexeme, "  ")?;

  for form in lexeme.forms()? {
    println!(
      "  {}  {}  [{}]",
      form.id,
      form.form().unwrap_or_default(),
      form.grammatical_features().join(", "),
    );
    print_claims(&form, "    ")?;
  }
  for sense in lexeme.senses()? {
    println!("  {}  {}", sense.id, sense.gloss(None).unwrap_or_default());
    print_claims(&sense, "    ")?;
  }
  Ok(())
}

fn print_claims(entity: &impl Entity, indent: &str) -> Result<()> {
  for (property, claims) in entity.claims()? {
    let values: Vec<String> = claims.iter().map(describe).collect();
    println!("{indent}{property}: {}", values.join("; "));
  }
  Ok(())
}

fn describe(claim: &Claim) -> String {
  match claim.pure_value() {
    Some(v) => format!("{v} ({})", claim.rank()),
    None => format!("<{}>", claim.snak().snaktype),
  }
}

pub fn datatype<T: Transport>(client: &Client<T>, property: &str) -> Result<()> {
  let datatype = client.datatype(property)?;
  println!("{property}: {datatype}");
  Ok(())
}

pub fn search<T: Transport>(
  client: &Client<T>,
  lemma: &str,
  language: &Language,
  category: &str,
) -> Result<()> {
  let hits = search_lexemes(client, lemma, language, category)?;
  if hits.is_empty() {
    println!("no lexeme matches {lemma:?}");
  }
  for hit in hits {
    let field = |key: &str| hit.get(key).and_then(Value::as_str).unwrap_or_default().to_owned();
    println!("{}  {}  {}", field("id"), field("label"), field("description"));
  }
  Ok(())
}

// ─── Writes ──────────────────────────────────────────────────────────────────

pub fn ensure<T: Transport>(
  client: &Client<T>,
  lemma: &str,
  language: &Language,
  category: &str,
) -> Result<()> {
  let lexeme = get_or_create_lexeme(client, lemma, language, category)?;
  println!("{}", lexeme.id);
  Ok(())
}

pub fn add_form<T: Transport>(
  client: &Client<T>,
  id: &str,
  text: &str,
  features: Vec<String>,
  language: Option<&str>,
) -> Result<()> {
  let mut lexeme = Lexeme::fetch(client, id).with_context(|| format!("fetching {id}"))?;
  let language =
    language.map(|code| Language::known(code).unwrap_or_else(|| Language::new(code, "")));
  let form_id = lexeme.create_form(client, text, features, language.as_ref(), None)?;
  println!("{form_id}");
  Ok(())
}

pub fn add_sense<T: Transport>(
  client: &Client<T>,
  id: &str,
  glosses: Vec<(String, String)>,
) -> Result<()> {
  let mut lexeme = Lexeme::fetch(client, id).with_context(|| format!("fetching {id}"))?;
  let sense_id = lexeme.create_sense(client, glosses, None)?;
  println!("{sense_id}");
  Ok(())
}

pub fn add_claim<T: Transport>(
  client: &Client<T>,
  entity: &str,
  property: &str,
  raw: &str,
) -> Result<()> {
  let datatype = client.datatype(property)?;
  let claim = client.claim(property, parse_value(&datatype, raw)?)?;

  let lexeme_id = entity.split_once('-').map_or(entity, |(l, _)| l);
  let mut lexeme =
    Lexeme::fetch(client, lexeme_id).with_context(|| format!("fetching {lexeme_id}"))?;

  if entity == lexeme_id {
    lexeme.add_claims(client, vec![claim])?;
  } else if let Some(mut form) = lexeme.forms()?.into_iter().find(|f| f.id == entity) {
    form.add_claims(client, vec![claim])?;
  } else if let Some(mut sense) = lexeme.senses()?.into_iter().find(|s| s.id == entity) {
    sense.add_claims(client, vec![claim])?;
  } else {
    bail!("{entity} not found on {lexeme_id}");
  }
  println!("added {property} to {entity}");
  Ok(())
}
