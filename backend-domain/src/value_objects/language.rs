// Language value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
    De,
    Es,
    Pt,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Fr,
        Language::De,
        Language::Es,
        Language::Pt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Es => "es",
            Language::Pt => "pt",
        }
    }

    /// Portuguese has no almanax bonus edition upstream.
    pub fn has_bonus_translations(&self) -> bool {
        !matches!(self, Language::Pt)
    }

    pub fn bonus_languages() -> impl Iterator<Item = Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| lang.has_bonus_translations())
    }

    pub fn bonus_index_uid(&self) -> String {
        format!("alm-bonuses-{}", self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}'")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "de" => Ok(Language::De),
            "es" => Ok(Language::Es),
            "pt" => Ok(Language::Pt),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("FR".parse::<Language>().expect("lang"), Language::Fr);
        assert_eq!(" de ".parse::<Language>().expect("lang"), Language::De);
        assert!("it".parse::<Language>().is_err());
    }

    #[test]
    fn bonus_languages_skip_portuguese() {
        let langs = Language::bonus_languages().collect::<Vec<_>>();
        assert_eq!(
            langs,
            vec![Language::En, Language::Fr, Language::De, Language::Es]
        );
        assert_eq!(Language::Es.bonus_index_uid(), "alm-bonuses-es");
    }
}
