//! Finding lexemes by lemma, language and lexical category, and creating
//! them when none exists.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
  Error, Result,
  entity::term_map,
  language::Language,
  lexeme::{Lexeme, reports_success},
  transport::{Client, Params, Transport},
};

/// Upper bound on search hits and on ids per `wbgetentities` call.
const SEARCH_LIMIT: usize = 50;

/// Lexemes whose lemma is exactly `lemma` in `language` and whose lexical
/// category is `lexical_category`.
///
/// Returns the raw search hits in the order the search endpoint ranked them.
pub fn search_lexemes<T: Transport>(
  client: &Client<T>,
  lemma: &str,
  language: &Language,
  lexical_category: &str,
) -> Result<Vec<Value>> {
  let params = Params::action("wbsearchentities")
    .set("type", "lexeme")
    .set("search", lemma)
    .set("language", language.code.to_string())
    .set("uselang", language.code.to_string())
    .set("strictlanguage", "1")
    .set("limit", SEARCH_LIMIT.to_string());
  let data = client.get(&params)?;

  let hits: Vec<Value> = data
    .get("search")
    .and_then(Value::as_array)
    .ok_or_else(|| Error::Protocol(format!("wbsearchentities response has no search: {data}")))?
    .iter()
    .filter(|hit| hit.get("label").and_then(Value::as_str) == Some(lemma))
    .cloned()
    .collect();
  debug!(lemma, hits = hits.len(), "lexeme search");

  if hits.is_empty() {
    return Ok(hits);
  }

  let categories = lexical_categories(client, &hits)?;
  Ok(
    hits
      .into_iter()
      .filter(|hit| {
        hit_id(hit)
          .and_then(|id| categories.get(id))
          .is_some_and(|c| c == lexical_category)
      })
      .collect(),
  )
}

/// The first matching lexeme, or a newly created one when nothing matches.
///
/// Several matches are not disambiguated: the best-ranked search hit wins.
pub fn get_or_create_lexeme<T: Transport>(
  client: &Client<T>,
  lemma: &str,
  language: &Language,
  lexical_category: &str,
) -> Result<Lexeme> {
  let hits = search_lexemes(client, lemma, language, lexical_category)?;
  match hits.first().and_then(hit_id) {
    Some(id) => Lexeme::fetch(client, id),
    None => create_lexeme(client, lemma, language, lexical_category),
  }
}

/// Create a new lexeme with a single lemma.
pub fn create_lexeme<T: Transport>(
  client: &Client<T>,
  lemma: &str,
  language: &Language,
  lexical_category: &str,
) -> Result<Lexeme> {
  let data = json!({
    "lemmas": term_map([(language.code.to_string(), lemma)]),
    "language": language.item,
    "lexicalCategory": lexical_category,
  });
  let params = Params::action("wbeditentity")
    .set("new", "lexeme")
    .set("bot", "1")
    .set("data", data.to_string())
    .with_token();
  let response = client.post(&params)?;
  if !reports_success(&response) {
    return Err(Error::EditRejected(response));
  }

  let entity = response
    .get("entity")
    .cloned()
    .ok_or_else(|| Error::Protocol(format!("wbeditentity response has no entity: {response}")))?;
  let lexeme = Lexeme::from_json(entity)?;
  info!(lexeme = %lexeme.id, lemma, "created lexeme");
  Ok(lexeme)
}

fn hit_id(hit: &Value) -> Option<&str> { hit.get("id")?.as_str() }

/// Lexical category per lexeme id, one `wbgetentities` call per batch.
fn lexical_categories<T: Transport>(
  client: &Client<T>,
  hits: &[Value],
) -> Result<HashMap<String, String>> {
  let ids: Vec<&str> = hits.iter().filter_map(hit_id).collect();
  let mut categories = HashMap::new();

  for batch in ids.chunks(SEARCH_LIMIT) {
    let params = Params::action("wbgetentities").set("ids", batch.join("|"));
    let data = client.get(&params)?;
    let Some(entities) = data.get("entities").and_then(Value::as_object) else {
      return Err(Error::Protocol(format!(
        "wbgetentities response has no entities: {data}"
      )));
    };
    categories.extend(entities.iter().filter_map(|(id, entity)| {
      let category = entity.get("lexicalCategory")?.as_str()?;
      Some((id.clone(), category.to_owned()))
    }));
  }

  Ok(categories)
}
