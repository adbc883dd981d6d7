//! AzVocab API payloads.
//!
//! Every field is optional on the wire; absent arrays decode as empty.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::providers::normalize::null_as_default;

/// `GET /search?q=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AzSearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<AzSearchHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzSearchHit {
    pub headword: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub entry_ids: Vec<String>,
}

/// `GET /entries/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzEntry {
    pub id: Option<String>,
    pub headword: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pronunciations: Vec<AzPronunciation>,
    #[serde(deserialize_with = "null_as_default")]
    pub senses: Vec<AzSense>,
    pub word_family: Option<BTreeMap<String, Vec<String>>>,
    pub inflections: Option<Vec<String>>,
    pub rank: Option<i32>,
    pub frequency: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AzPronunciation {
    pub ipa: Option<String>,
    pub audio: Option<String>,
    /// "uk" / "us" when the provider knows it
    pub accent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzSense {
    pub id: Option<String>,
    pub index: Option<i32>,
    pub pos: Option<String>,
    pub definition: Option<String>,
    pub short_definition: Option<String>,
    pub definition_vi: Option<String>,
    pub cefr: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub examples: Vec<AzExample>,
    #[serde(deserialize_with = "null_as_default")]
    pub synonyms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub antonyms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub idioms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub phrases: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub phrasal_verbs: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub collocations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AzExample {
    pub id: Option<String>,
    pub text: Option<String>,
    pub translation: Option<String>,
}
