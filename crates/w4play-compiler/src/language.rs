//! Language tags and the editable source record.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownLanguage;

/// One of the two languages the playground can compile.
///
/// The tag string doubles as the storage key and the share-link parameter
/// name, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "ts")]
    AssemblyScript,
    #[serde(rename = "rol")]
    Roland,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::AssemblyScript, Language::Roland];

    /// The short tag used for storage keys and address parameters.
    pub fn as_tag(self) -> &'static str {
        match self {
            Language::AssemblyScript => "ts",
            Language::Roland => "rol",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.as_tag() == tag)
    }

    /// Infer the language from a source file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_tag(path.extension()?.to_str()?)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::AssemblyScript => "AssemblyScript",
            Language::Roland => "Roland",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Source text tagged with its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    pub lang: Language,
}

impl Source {
    pub fn new(text: impl Into<String>, lang: Language) -> Self {
        Self {
            text: text.into(),
            lang,
        }
    }
}
