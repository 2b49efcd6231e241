//! Choosing the source the editor starts with, and remembering edits.

use w4play_compiler::{Language, Source};

use crate::codec;
use crate::location::Location;
use crate::storage::Storage;

const ASSEMBLYSCRIPT_SAMPLE: &str = include_str!("../templates/main.ts");
const ROLAND_SAMPLE: &str = include_str!("../templates/hello.rol");

/// Where a resolved source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    ShareLink,
    Storage,
    Sample,
}

/// The built-in sample program for `lang`.
pub fn default_text(lang: Language) -> &'static str {
    match lang {
        Language::AssemblyScript => ASSEMBLYSCRIPT_SAMPLE,
        Language::Roland => ROLAND_SAMPLE,
    }
}

/// Pick a language from the address when the caller has not chosen one:
/// a Roland share link selects Roland, anything else AssemblyScript.
pub fn infer_language(location: &Location) -> Language {
    if location.mentions(Language::Roland) {
        Language::Roland
    } else {
        Language::AssemblyScript
    }
}

/// The last edited text for `lang`, if one was stored and still decodes.
pub fn stored_text(storage: &dyn Storage, lang: Language) -> Option<String> {
    let record = storage.get(lang.as_tag())?;
    let text = codec::decompress_from_base64(&record);
    if text.is_none() {
        tracing::warn!(%lang, "ignoring undecodable storage record");
    }
    text
}

/// Resolve the starting source: share link, then storage, then sample.
/// Empty candidates count as absent.
pub fn resolve(location: &Location, storage: &dyn Storage, lang: Option<Language>) -> (Source, Origin) {
    let lang = lang.unwrap_or_else(|| infer_language(location));

    let (text, origin) = if let Some(text) = non_empty(location.shared_text(lang)) {
        (text, Origin::ShareLink)
    } else if let Some(text) = non_empty(stored_text(storage, lang)) {
        (text, Origin::Storage)
    } else {
        (default_text(lang).to_string(), Origin::Sample)
    };

    tracing::debug!(%lang, ?origin, "resolved source");
    (Source::new(text, lang), origin)
}

pub fn resolve_source(location: &Location, storage: &dyn Storage, lang: Option<Language>) -> Source {
    resolve(location, storage, lang).0
}

/// Source for a language switch mid-session. Edits already made in this
/// session outrank the share link that opened it.
pub fn reload_source(location: &Location, storage: &dyn Storage, lang: Language) -> Source {
    match non_empty(stored_text(storage, lang)) {
        Some(text) => Source::new(text, lang),
        None => resolve_source(location, storage, Some(lang)),
    }
}

/// Store `source` under its language tag.
pub fn persist(storage: &dyn Storage, source: &Source) {
    storage.set(source.lang.as_tag(), &codec::compress_to_base64(&source.text));
}

/// A link that opens the playground on `source`. Any query or fragment
/// already on `base` is dropped: the reader treats `#` as the start of the
/// query, so leftover parameters would swallow the encoded source.
pub fn share_url(base: &str, source: &Source) -> String {
    let base = base.split(['?', '#']).next().unwrap_or(base);
    format!(
        "{}#{}={}",
        base,
        source.lang.as_tag(),
        codec::compress_to_uri_component(&source.text)
    )
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}
