//! Oxford entry → `Word`.
//!
//! Oxford nests meaning three deep: lexical entry (part of speech) → entry →
//! sense → subsenses. Senses are flattened depth-first, each subsense
//! becoming a sense of its own right after its parent.

use std::collections::BTreeMap;
use tracing::warn;

use lexicon_core::{
    ExampleData, ProviderSource, PronunciationData, SenseData, SenseRelations, Word, WordData,
    WordFamily,
};

use super::types::{texts, OxEntryResponse, OxLexicalEntry, OxPronunciation, OxSense};
use crate::providers::normalize::{clean, clean_list, infer_region, parse_payload, short_definition};
use crate::providers::WordAdapter;

#[derive(Debug, Clone, Copy, Default)]
pub struct OxfordAdapter;

impl WordAdapter for OxfordAdapter {
    fn to_word_aggregate(&self, raw: &str, language: &str) -> Option<Word> {
        let response: OxEntryResponse = parse_payload(ProviderSource::Oxford, raw)?;
        build_word(&response, language)
    }
}

/// Derived forms grouped by the lexical category they were listed under.
pub(crate) fn word_family(response: &OxEntryResponse) -> Option<WordFamily> {
    let mut family: WordFamily = BTreeMap::new();
    for lexical in response.lexical_entries() {
        let forms = clean_list(texts(&lexical.derivatives));
        if forms.is_empty() {
            continue;
        }
        let pos = lexical.category().unwrap_or_else(|| "other".into());
        let slot = family.entry(pos).or_default();
        for form in forms {
            if !slot.contains(&form) {
                slot.push(form);
            }
        }
    }
    (!family.is_empty()).then_some(family)
}

pub(crate) fn inflections(response: &OxEntryResponse) -> Option<Vec<String>> {
    let forms = clean_list(
        response
            .lexical_entries()
            .flat_map(|l| l.entries.iter())
            .flat_map(|e| e.inflections.iter())
            .filter_map(|i| i.inflected_form.as_deref()),
    );
    (!forms.is_empty()).then_some(forms)
}

fn build_word(response: &OxEntryResponse, language: &str) -> Option<Word> {
    let headword = clean(response.headword())?;
    let mut data = WordData::new(headword, language, ProviderSource::Oxford.as_str());
    data.word_family = word_family(response);
    data.inflections = inflections(response);
    let mut word = Word::new(data);

    for lexical in response.lexical_entries() {
        let pronunciations = lexical
            .pronunciations
            .iter()
            .chain(lexical.entries.iter().flat_map(|e| e.pronunciations.iter()));
        for p in pronunciations {
            add_pronunciation(&mut word, p);
        }
        add_lexical_entry(&mut word, lexical);
    }

    Some(word)
}

fn add_pronunciation(word: &mut Word, p: &OxPronunciation) {
    let ipa = clean(p.phonetic_spelling.as_deref());
    let audio_url = clean(p.audio_file.as_deref());
    if ipa.is_none() && audio_url.is_none() {
        return;
    }
    let region = infer_region(
        p.dialects.first().map(String::as_str),
        audio_url.as_deref(),
    );
    word.add_pronunciation(PronunciationData {
        ipa,
        audio_url,
        region,
    });
}

fn add_lexical_entry(word: &mut Word, lexical: &OxLexicalEntry) {
    let pos = lexical.category().unwrap_or_else(|| "unknown".into());

    let mut flat: Vec<&OxSense> = Vec::new();
    for entry in &lexical.entries {
        for sense in &entry.senses {
            flatten(sense, &mut flat);
        }
    }

    // Phrases are listed per lexical entry; they ride on its first sense.
    let mut phrases = clean_list(texts(&lexical.phrases));
    let mut phrasal_verbs = clean_list(texts(&lexical.phrasal_verbs));

    for sense in flat {
        let Some(definition) = sense.definitions.first().and_then(|d| clean(Some(d.as_str()))) else {
            continue;
        };
        let data = SenseData {
            part_of_speech: pos.clone(),
            short_definition: sense
                .short_definitions
                .first()
                .and_then(|d| clean(Some(d.as_str())))
                .or_else(|| short_definition(&definition)),
            definition,
            localized_definition: None,
            sense_index: None,
            source: ProviderSource::Oxford.as_str().to_string(),
            cefr_level: None,
            relations: SenseRelations {
                synonyms: clean_list(texts(&sense.synonyms)),
                antonyms: clean_list(texts(&sense.antonyms)),
                phrases: std::mem::take(&mut phrases),
                phrasal_verbs: std::mem::take(&mut phrasal_verbs),
                ..Default::default()
            },
            external_id: clean(sense.id.as_deref()),
        };

        let sense_id = match word.add_sense(data) {
            Ok(added) => added.id(),
            Err(e) => {
                warn!(provider = "oxford", error = %e, "Skipping Oxford sense");
                continue;
            }
        };
        for text in clean_list(texts(&sense.examples)) {
            if let Err(e) = word.add_example(sense_id, ExampleData::new(text)) {
                warn!(provider = "oxford", error = %e, "Skipping Oxford example");
            }
        }
    }
}

fn flatten<'a>(sense: &'a OxSense, out: &mut Vec<&'a OxSense>) {
    out.push(sense);
    for sub in &sense.subsenses {
        flatten(sub, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: &str = r#"{
        "id": "run",
        "word": "run",
        "results": [{
            "id": "run",
            "word": "run",
            "lexicalEntries": [
                {
                    "lexicalCategory": {"id": "verb", "text": "Verb"},
                    "phrasalVerbs": [{"id": "run_away", "text": "run away"}],
                    "derivatives": [{"id": "runnable", "text": "runnable"}],
                    "entries": [{
                        "inflections": [{"inflectedForm": "runs"}, {"inflectedForm": "ran"}],
                        "pronunciations": [
                            {"phoneticSpelling": "rʌn", "audioFile": "https://audio.oxforddictionaries.com/en/mp3/run_gb_1.mp3", "dialects": ["British English"]}
                        ],
                        "senses": [{
                            "id": "m_en_gbus0882560.005",
                            "definitions": ["move at a speed faster than a walk"],
                            "shortDefinitions": ["move at speed faster than walk"],
                            "examples": [{"text": "the dog ran across the road"}],
                            "synonyms": [{"text": "sprint"}, {"text": "race"}],
                            "subsenses": [{
                                "id": "m_en_gbus0882560.012",
                                "definitions": ["run as a sport or for exercise"]
                            }]
                        }, {
                            "id": "m_en_gbus0882560.030",
                            "definitions": []
                        }]
                    }]
                },
                {
                    "lexicalCategory": {"id": "noun", "text": "Noun"},
                    "derivatives": [{"text": "runner"}],
                    "pronunciations": [{"phoneticSpelling": "rʌn", "dialects": ["British English"]}],
                    "entries": [{
                        "senses": [{"id": "m_en_gbus0882560.040", "definitions": ["an act or spell of running"]}]
                    }]
                }
            ]
        }]
    }"#;

    #[test]
    fn test_flattens_lexical_entries_and_subsenses() {
        let word = OxfordAdapter.to_word_aggregate(RUN, "en").unwrap();
        assert_eq!(word.text(), "run");
        assert_eq!(word.source(), "oxford");

        let senses = word.senses_in_display_order();
        assert_eq!(senses.len(), 3);
        assert_eq!(senses[0].part_of_speech(), "verb");
        assert_eq!(senses[0].short_definition(), Some("move at speed faster than walk"));
        assert_eq!(senses[0].relations().phrasal_verbs, vec!["run away"]);
        assert_eq!(senses[0].relations().synonyms, vec!["sprint", "race"]);
        assert_eq!(senses[0].examples().len(), 1);
        assert_eq!(senses[1].external_id(), Some("m_en_gbus0882560.012"));
        assert!(senses[1].relations().phrasal_verbs.is_empty());
        assert_eq!(senses[2].part_of_speech(), "noun");
        assert_eq!(
            senses.iter().map(|s| s.sense_index()).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_pronunciations_dedup_across_levels() {
        let word = OxfordAdapter.to_word_aggregate(RUN, "en").unwrap();
        assert_eq!(word.pronunciations().len(), 1);
        assert_eq!(word.pronunciations()[0].region(), Some("UK"));
    }

    #[test]
    fn test_derived_fields() {
        let word = OxfordAdapter.to_word_aggregate(RUN, "en").unwrap();
        let family = word.word_family().unwrap();
        assert_eq!(family["verb"], vec!["runnable"]);
        assert_eq!(family["noun"], vec!["runner"]);
        assert_eq!(word.inflections().unwrap(), ["runs", "ran"]);
        assert_eq!(word.frequency_rank(), None);
    }

    #[test]
    fn test_missing_headword_is_none() {
        assert!(OxfordAdapter
            .to_word_aggregate(r#"{"results": [{"lexicalEntries": []}]}"#, "en")
            .is_none());
        assert!(OxfordAdapter.to_word_aggregate("[]", "en").is_none());
    }

    #[test]
    fn test_null_arrays_are_empty() {
        let raw = r#"{
            "word": "run",
            "results": [{"lexicalEntries": [{
                "lexicalCategory": {"id": "verb", "text": "Verb"},
                "derivatives": null,
                "phrases": null,
                "entries": [{"pronunciations": null, "inflections": null,
                             "senses": [{"id": "m1", "definitions": ["move fast"],
                                         "examples": null, "subsenses": null}]}]
            }]}]
        }"#;
        let word = OxfordAdapter.to_word_aggregate(raw, "en").unwrap();
        assert_eq!(word.senses().len(), 1);
        assert!(word.word_family().is_none());
    }
}
