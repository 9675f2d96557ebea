use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseEnumError;

/// Display language for titles and board messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Nl,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Nl => "nl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "nl" => Ok(Self::Nl),
            _ => Err(ParseEnumError::new("language", s)),
        }
    }
}

/// Pick the title in `language`, falling back to the other language.
/// Empty or whitespace-only strings count as missing; `None` means neither
/// language has a title and the caller supplies its own fallback.
pub fn localized_title(
    title_nl: Option<&str>,
    title_en: Option<&str>,
    language: Language,
) -> Option<String> {
    fn non_empty(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }
    let (preferred, other) = match language {
        Language::Nl => (title_nl, title_en),
        Language::En => (title_en, title_nl),
    };
    non_empty(preferred).or_else(|| non_empty(other)).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_title_prefers_requested_language() {
        assert_eq!(
            localized_title(Some("Gezondheid"), Some("Health"), Language::Nl).as_deref(),
            Some("Gezondheid")
        );
        assert_eq!(
            localized_title(Some("Gezondheid"), Some("Health"), Language::En).as_deref(),
            Some("Health")
        );
    }

    #[test]
    fn test_localized_title_falls_back_to_other_language() {
        assert_eq!(
            localized_title(Some(""), Some("Health"), Language::Nl).as_deref(),
            Some("Health")
        );
        assert_eq!(
            localized_title(Some("Gezondheid"), None, Language::En).as_deref(),
            Some("Gezondheid")
        );
        assert_eq!(localized_title(Some("  "), None, Language::En), None);
        assert_eq!(
            localized_title(None, Some("  Health "), Language::Nl).as_deref(),
            Some("Health")
        );
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("NL".parse::<Language>().unwrap(), Language::Nl);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::En);
    }
}
