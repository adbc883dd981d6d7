//! AzVocab entry → `Word`.
//!
//! AzVocab is already flat: one entry, a list of senses, each with its own
//! examples. Senses carry an optional explicit `index` that decides order.

use tracing::warn;

use lexicon_core::{
    ExampleData, ProviderSource, PronunciationData, SenseData, SenseRelations, Word, WordData,
};

use super::types::{AzEntry, AzSense};
use crate::providers::normalize::{clean, clean_list, infer_region, parse_payload, short_definition};
use crate::providers::WordAdapter;

#[derive(Debug, Clone, Copy, Default)]
pub struct AzVocabAdapter;

impl WordAdapter for AzVocabAdapter {
    fn to_word_aggregate(&self, raw: &str, language: &str) -> Option<Word> {
        let entry: AzEntry = parse_payload(ProviderSource::AzVocab, raw)?;
        build_word(entry, language)
    }
}

fn build_word(entry: AzEntry, language: &str) -> Option<Word> {
    let headword = clean(entry.headword.as_deref())?;
    let source = ProviderSource::AzVocab.as_str();

    let mut data = WordData::new(headword, language, source);
    data.frequency_rank = entry.rank;
    data.frequency_count = entry.frequency;
    data.inflections = entry.inflections.map(clean_list).filter(|v| !v.is_empty());
    data.word_family = entry.word_family;
    let mut word = Word::new(data);

    for p in &entry.pronunciations {
        let ipa = clean(p.ipa.as_deref());
        let audio_url = clean(p.audio.as_deref());
        if ipa.is_none() && audio_url.is_none() {
            continue;
        }
        let region = infer_region(p.accent.as_deref(), audio_url.as_deref());
        word.add_pronunciation(PronunciationData {
            ipa,
            audio_url,
            region,
        });
    }

    // Explicit index orders; array position breaks ties and fills gaps.
    let mut senses: Vec<(usize, &AzSense)> = entry.senses.iter().enumerate().collect();
    senses.sort_by_key(|(position, s)| (s.index.unwrap_or(*position as i32), *position));

    for (_, sense) in senses {
        let Some(definition) = clean(sense.definition.as_deref()) else {
            continue;
        };
        let data = SenseData {
            part_of_speech: clean(sense.pos.as_deref()).unwrap_or_else(|| "unknown".into()),
            short_definition: clean(sense.short_definition.as_deref())
                .or_else(|| short_definition(&definition)),
            definition,
            localized_definition: clean(sense.definition_vi.as_deref()),
            sense_index: None,
            source: source.to_string(),
            cefr_level: clean(sense.cefr.as_deref()).map(|c| c.to_ascii_uppercase()),
            relations: SenseRelations {
                synonyms: clean_list(&sense.synonyms),
                antonyms: clean_list(&sense.antonyms),
                idioms: clean_list(&sense.idioms),
                phrases: clean_list(&sense.phrases),
                phrasal_verbs: clean_list(&sense.phrasal_verbs),
                collocations: clean_list(&sense.collocations),
                related_words: clean_list(&sense.related),
            },
            external_id: clean(sense.id.as_deref()),
        };

        let sense_id = match word.add_sense(data) {
            Ok(added) => added.id(),
            Err(e) => {
                warn!(provider = %source, error = %e, "Skipping AzVocab sense");
                continue;
            }
        };

        for example in &sense.examples {
            let Some(text) = clean(example.text.as_deref()) else {
                continue;
            };
            let mut data = ExampleData::new(text);
            data.translation = clean(example.translation.as_deref());
            data.external_id = clean(example.id.as_deref());
            if let Err(e) = word.add_example(sense_id, data) {
                warn!(provider = %source, error = %e, "Skipping AzVocab example");
            }
        }
    }

    Some(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: &str = r#"{
        "id": "d1",
        "headword": "Run",
        "pronunciations": [
            {"ipa": "/rʌn/", "audio": "https://cdn.azvocab.ai/audio/run-uk.mp3"},
            {"ipa": "/rʌn/", "audio": "https://cdn.azvocab.ai/audio/run-us.mp3", "accent": "us"},
            {"ipa": "/rʌn/", "audio": "https://cdn.azvocab.ai/audio/run-uk-2.mp3", "accent": "uk"}
        ],
        "senses": [
            {"id": "s2", "index": 1, "pos": "noun", "definition": "an act of running", "cefr": "a2"},
            {"id": "s1", "index": 0, "pos": "verb", "definition": "move fast on foot",
             "definitionVi": "chạy", "synonyms": ["sprint", " dash ", "sprint"],
             "examples": [{"id": "e1", "text": "She runs every morning.", "translation": "Cô ấy chạy mỗi sáng."},
                          {"text": "  "}]},
            {"id": "s3", "pos": "verb"}
        ],
        "wordFamily": {"noun": ["runner"]},
        "inflections": ["runs", "ran", "running"],
        "rank": 512,
        "frequency": 90210
    }"#;

    #[test]
    fn test_maps_entry() {
        let word = AzVocabAdapter.to_word_aggregate(RUN, "en").unwrap();
        assert_eq!(word.text(), "Run");
        assert_eq!(word.normalized_text(), "run");
        assert_eq!(word.source(), "azvocab");
        assert_eq!(word.frequency_rank(), Some(512));
        assert_eq!(word.frequency_count(), Some(90210));
        assert_eq!(word.inflections().map(|i| i.len()), Some(3));
        assert!(word.word_family().is_some());

        // explicit index wins over array order; blank definition dropped
        let senses = word.senses_in_display_order();
        assert_eq!(senses.len(), 2);
        assert_eq!(senses[0].external_id(), Some("s1"));
        assert_eq!(senses[0].localized_definition(), Some("chạy"));
        assert_eq!(senses[0].relations().synonyms, vec!["sprint", "dash"]);
        assert_eq!(senses[0].examples().len(), 1);
        assert_eq!(senses[0].examples()[0].external_id(), Some("e1"));
        assert_eq!(senses[1].cefr_level(), Some("A2"));
        assert_eq!(senses[1].short_definition(), Some("an act of running"));
    }

    #[test]
    fn test_pronunciation_regions_and_dedup() {
        let word = AzVocabAdapter.to_word_aggregate(RUN, "en").unwrap();
        // third entry duplicates (ipa, UK) of the first
        assert_eq!(word.pronunciations().len(), 2);
        assert_eq!(word.pronunciations()[0].region(), Some("UK"));
        assert_eq!(word.pronunciations()[1].region(), Some("US"));
    }

    #[test]
    fn test_missing_headword_is_none() {
        assert!(AzVocabAdapter
            .to_word_aggregate(r#"{"senses": [{"definition": "x"}]}"#, "en")
            .is_none());
        assert!(AzVocabAdapter
            .to_word_aggregate(r#"{"headword": "  "}"#, "en")
            .is_none());
    }

    #[test]
    fn test_malformed_payload_is_none() {
        assert!(AzVocabAdapter.to_word_aggregate("<html>", "en").is_none());
        assert!(AzVocabAdapter
            .to_word_aggregate(r#"{"headword": "run", "senses": "many"}"#, "en")
            .is_none());
    }

    #[test]
    fn test_bare_headword_is_a_word() {
        let word = AzVocabAdapter
            .to_word_aggregate(r#"{"headword": "run"}"#, "en")
            .unwrap();
        assert!(word.senses().is_empty());
        assert!(word.pronunciations().is_empty());
    }

    #[test]
    fn test_null_arrays_are_empty() {
        let word = AzVocabAdapter
            .to_word_aggregate(r#"{"headword": "run", "senses": null, "pronunciations": null}"#, "en")
            .unwrap();
        assert!(word.senses().is_empty());

        let raw = r#"{
            "headword": "run",
            "senses": [{"id": "s1", "pos": "verb", "definition": "move fast",
                        "synonyms": null, "examples": null, "idioms": null}]
        }"#;
        let word = AzVocabAdapter.to_word_aggregate(raw, "en").unwrap();
        assert_eq!(word.senses().len(), 1);
        assert!(word.senses()[0].relations().synonyms.is_empty());
        assert!(word.senses()[0].examples().is_empty());
    }
}
