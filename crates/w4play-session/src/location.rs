//! Reading share-link parameters out of a playground address.

use url::Url;
use w4play_compiler::Language;

use crate::codec;

/// Placeholder origin so that bare `?ts=...` or `#ts=...` strings parse.
const RELATIVE_BASE: &str = "http://localhost/";

/// The parameters of a playground address.
///
/// Fragment addressing (`#ts=...`) and query addressing (`?ts=...`) are
/// equivalent: every `#` is read as `?` before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    params: Vec<(String, String)>,
}

impl Location {
    /// An address with no parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse(address: &str) -> crate::Result<Self> {
        let normalized = address.replace('#', "?");
        let url = Url::parse(RELATIVE_BASE)?.join(&normalized)?;
        Ok(Self {
            params: url.query_pairs().into_owned().collect(),
        })
    }

    /// The first value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the address carries a non-empty parameter for `lang`.
    pub fn mentions(&self, lang: Language) -> bool {
        self.get(lang.as_tag()).is_some_and(|v| !v.is_empty())
    }

    /// The source text shared for `lang`, if present and decodable.
    pub fn shared_text(&self, lang: Language) -> Option<String> {
        codec::decompress_from_uri_component(self.get(lang.as_tag())?)
    }
}
