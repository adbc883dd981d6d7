//! FreeDictionary response → `Word`.
//!
//! The response is an array of homograph entries, each grouping definitions
//! by part of speech. All entries fold into one `Word`. Definitions have no
//! provider ids, so senses get a positional one: `{word}#{meaning}.{definition}`
//! with the meaning counter running across entries.

use tracing::warn;

use lexicon_core::{
    ExampleData, ProviderSource, PronunciationData, SenseData, SenseRelations, Word, WordData,
};

use super::types::{headword, FdEntry, FdResponse};
use crate::providers::normalize::{clean, clean_list, infer_region, parse_payload, short_definition};
use crate::providers::WordAdapter;

#[derive(Debug, Clone, Copy, Default)]
pub struct FreeDictionaryAdapter;

impl WordAdapter for FreeDictionaryAdapter {
    fn to_word_aggregate(&self, raw: &str, language: &str) -> Option<Word> {
        let entries: FdResponse = parse_payload(ProviderSource::FreeDictionary, raw)?;
        build_word(&entries, language)
    }
}

fn build_word(entries: &[FdEntry], language: &str) -> Option<Word> {
    let text = clean(headword(entries))?;
    let source = ProviderSource::FreeDictionary.as_str();
    let key = text.to_lowercase();
    let mut word = Word::new(WordData::new(text, language, source));

    for entry in entries {
        add_pronunciations(&mut word, entry);
    }

    let mut meaning_no = 0usize;
    for entry in entries {
        for meaning in &entry.meanings {
            meaning_no += 1;
            let pos = clean(meaning.part_of_speech.as_deref()).unwrap_or_else(|| "unknown".into());

            for (def_no, def) in meaning.definitions.iter().enumerate() {
                let Some(definition) = clean(def.definition.as_deref()) else {
                    continue;
                };
                let data = SenseData {
                    part_of_speech: pos.clone(),
                    short_definition: short_definition(&definition),
                    definition,
                    localized_definition: None,
                    sense_index: None,
                    source: source.to_string(),
                    cefr_level: None,
                    relations: SenseRelations {
                        synonyms: clean_list(def.synonyms.iter().chain(&meaning.synonyms)),
                        antonyms: clean_list(def.antonyms.iter().chain(&meaning.antonyms)),
                        ..Default::default()
                    },
                    external_id: Some(format!("{key}#{meaning_no}.{}", def_no + 1)),
                };

                let sense_id = match word.add_sense(data) {
                    Ok(added) => added.id(),
                    Err(e) => {
                        warn!(provider = %source, error = %e, "Skipping FreeDictionary sense");
                        continue;
                    }
                };
                if let Some(example) = clean(def.example.as_deref()) {
                    if let Err(e) = word.add_example(sense_id, ExampleData::new(example)) {
                        warn!(provider = %source, error = %e, "Skipping FreeDictionary example");
                    }
                }
            }
        }
    }

    Some(word)
}

fn add_pronunciations(word: &mut Word, entry: &FdEntry) {
    let mut added = false;
    for phonetic in &entry.phonetics {
        let ipa = clean(phonetic.text.as_deref());
        let audio_url = clean(phonetic.audio.as_deref());
        if ipa.is_none() && audio_url.is_none() {
            continue;
        }
        // Audio-only phonetics borrow the entry-level spelling.
        let ipa = ipa.or_else(|| clean(entry.phonetic.as_deref()));
        let region = infer_region(None, audio_url.as_deref());
        word.add_pronunciation(PronunciationData {
            ipa,
            audio_url,
            region,
        });
        added = true;
    }
    if !added {
        if let Some(ipa) = clean(entry.phonetic.as_deref()) {
            word.add_pronunciation(PronunciationData {
                ipa: Some(ipa),
                ..Default::default()
            });
        }
    }
}
