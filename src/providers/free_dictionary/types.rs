//! dictionaryapi.dev payloads. A detail response is a JSON array of entries.

use serde::Deserialize;

use crate::providers::normalize::null_as_default;

pub type FdResponse = Vec<FdEntry>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FdEntry {
    pub word: Option<String>,
    pub phonetic: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub phonetics: Vec<FdPhonetic>,
    #[serde(deserialize_with = "null_as_default")]
    pub meanings: Vec<FdMeaning>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FdPhonetic {
    pub text: Option<String>,
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FdMeaning {
    pub part_of_speech: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub definitions: Vec<FdDefinition>,
    #[serde(deserialize_with = "null_as_default")]
    pub synonyms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FdDefinition {
    pub definition: Option<String>,
    pub example: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub synonyms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub antonyms: Vec<String>,
}

/// First headword across all entries of a response.
pub fn headword(entries: &[FdEntry]) -> Option<&str> {
    entries
        .iter()
        .filter_map(|e| e.word.as_deref())
        .find(|w| !w.trim().is_empty())
}
