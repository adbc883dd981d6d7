//! Oxford Dictionaries API v2 payloads (the subset we read).

use serde::Deserialize;

use crate::providers::normalize::null_as_default;

/// `GET /search/{lang}?q=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OxSearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<OxSearchResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OxSearchResult {
    pub id: Option<String>,
    pub word: Option<String>,
}

/// `GET /entries/{lang}/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OxEntryResponse {
    pub id: Option<String>,
    pub word: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<OxHeadwordEntry>,
}

impl OxEntryResponse {
    pub fn headword(&self) -> Option<&str> {
        self.word
            .as_deref()
            .or_else(|| self.results.iter().find_map(|r| r.word.as_deref()))
            .or(self.id.as_deref())
    }

    pub fn lexical_entries(&self) -> impl Iterator<Item = &OxLexicalEntry> {
        self.results.iter().flat_map(|r| r.lexical_entries.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OxHeadwordEntry {
    pub id: Option<String>,
    pub word: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub lexical_entries: Vec<OxLexicalEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OxLexicalEntry {
    pub lexical_category: Option<OxText>,
    #[serde(deserialize_with = "null_as_default")]
    pub entries: Vec<OxEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub pronunciations: Vec<OxPronunciation>,
    #[serde(deserialize_with = "null_as_default")]
    pub derivatives: Vec<OxText>,
    #[serde(deserialize_with = "null_as_default")]
    pub phrases: Vec<OxText>,
    #[serde(deserialize_with = "null_as_default")]
    pub phrasal_verbs: Vec<OxText>,
}

impl OxLexicalEntry {
    pub fn category(&self) -> Option<String> {
        self.lexical_category
            .as_ref()
            .and_then(|c| c.text.as_deref().or(c.id.as_deref()))
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OxEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub pronunciations: Vec<OxPronunciation>,
    #[serde(deserialize_with = "null_as_default")]
    pub inflections: Vec<OxInflection>,
    #[serde(deserialize_with = "null_as_default")]
    pub senses: Vec<OxSense>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OxSense {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub definitions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub short_definitions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub examples: Vec<OxText>,
    #[serde(deserialize_with = "null_as_default")]
    pub synonyms: Vec<OxText>,
    #[serde(deserialize_with = "null_as_default")]
    pub antonyms: Vec<OxText>,
    #[serde(deserialize_with = "null_as_default")]
    pub subsenses: Vec<OxSense>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OxPronunciation {
    pub phonetic_spelling: Option<String>,
    pub audio_file: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dialects: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OxInflection {
    pub inflected_form: Option<String>,
}

/// Oxford's ubiquitous `{id, text}` pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OxText {
    pub id: Option<String>,
    pub text: Option<String>,
}

pub fn texts(items: &[OxText]) -> impl Iterator<Item = &str> {
    items.iter().filter_map(|t| t.text.as_deref())
}
