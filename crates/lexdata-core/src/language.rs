//! Languages as Wikibase knows them: a code for terms plus the item that
//! represents the language on lexemes.

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
  /// Term language code, e.g. `en`.
  pub code: Cow<'static, str>,
  /// Item id of the language, e.g. `Q1860`.
  pub item: Cow<'static, str>,
}

impl Language {
  pub const ENGLISH: Language = Language::fixed("en", "Q1860");
  pub const GERMAN: Language = Language::fixed("de", "Q188");
  pub const FRENCH: Language = Language::fixed("fr", "Q150");
  pub const SPANISH: Language = Language::fixed("es", "Q1321");
  pub const ITALIAN: Language = Language::fixed("it", "Q652");
  pub const SWEDISH: Language = Language::fixed("sv", "Q9027");
  pub const NORWEGIAN_BOKMAL: Language = Language::fixed("nb", "Q25167");
  pub const DANISH: Language = Language::fixed("da", "Q9035");
  pub const DUTCH: Language = Language::fixed("nl", "Q7411");
  pub const POLISH: Language = Language::fixed("pl", "Q809");
  pub const RUSSIAN: Language = Language::fixed("ru", "Q7737");

  const KNOWN: [Language; 11] = [
    Self::ENGLISH,
    Self::GERMAN,
    Self::FRENCH,
    Self::SPANISH,
    Self::ITALIAN,
    Self::SWEDISH,
    Self::NORWEGIAN_BOKMAL,
    Self::DANISH,
    Self::DUTCH,
    Self::POLISH,
    Self::RUSSIAN,
  ];

  const fn fixed(code: &'static str, item: &'static str) -> Self {
    Self {
      code: Cow::Borrowed(code),
      item: Cow::Borrowed(item),
    }
  }

  pub fn new(code: impl Into<String>, item: impl Into<String>) -> Self {
    Self {
      code: Cow::Owned(code.into()),
      item: Cow::Owned(item.into()),
    }
  }

  /// One of the predefined languages, looked up by code.
  pub fn known(code: &str) -> Option<Self> {
    Self::KNOWN.into_iter().find(|l| l.code == code)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_by_code() {
    assert_eq!(Language::known("en"), Some(Language::ENGLISH));
    assert_eq!(Language::known("de").unwrap().item, "Q188");
    assert_eq!(Language::known("xx"), None);
  }

  #[test]
  fn owned_and_fixed_compare_equal() {
    assert_eq!(Language::new("en", "Q1860"), Language::ENGLISH);
  }
}
