//! `WordSense`: one meaning of a word, owned by the `Word` aggregate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::example::{Example, ExampleData, ExamplePatch};

/// Lexical relations attached to a sense. Empty lists mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseRelations {
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub idioms: Vec<String>,
    pub phrases: Vec<String>,
    pub phrasal_verbs: Vec<String>,
    pub collocations: Vec<String>,
    pub related_words: Vec<String>,
}

impl SenseRelations {
    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
            && self.antonyms.is_empty()
            && self.idioms.is_empty()
            && self.phrases.is_empty()
            && self.phrasal_verbs.is_empty()
            && self.collocations.is_empty()
            && self.related_words.is_empty()
    }
}

/// Input for `Word::add_sense`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseData {
    pub part_of_speech: String,
    pub definition: String,
    pub short_definition: Option<String>,
    pub localized_definition: Option<String>,
    /// Assigned by the aggregate when absent
    pub sense_index: Option<i32>,
    pub source: String,
    pub cefr_level: Option<String>,
    pub relations: SenseRelations,
    /// Provider-side id kept for traceability
    pub external_id: Option<String>,
}

/// Partial update for a sense. `None` leaves a field untouched.
///
/// The sense index is not patchable: it is fixed when the sense is added.
#[derive(Debug, Clone, Default)]
pub struct SensePatch {
    pub part_of_speech: Option<String>,
    pub definition: Option<String>,
    pub short_definition: Option<Option<String>>,
    pub localized_definition: Option<Option<String>>,
    pub cefr_level: Option<Option<String>>,
    pub relations: Option<SenseRelations>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSense {
    id: Uuid,
    part_of_speech: String,
    definition: String,
    short_definition: Option<String>,
    localized_definition: Option<String>,
    sense_index: i32,
    source: String,
    cefr_level: Option<String>,
    relations: SenseRelations,
    external_id: Option<String>,
    examples: Vec<Example>,
}

impl WordSense {
    pub(crate) fn new(data: SenseData, sense_index: i32) -> Self {
        Self::restore(crate::new_id(), data, sense_index, Vec::new())
    }

    /// Reconstitute from storage. Not for business mutation: no invariant
    /// checks run here.
    pub fn restore(id: Uuid, data: SenseData, sense_index: i32, examples: Vec<Example>) -> Self {
        Self {
            id,
            part_of_speech: data.part_of_speech,
            definition: data.definition,
            short_definition: data.short_definition,
            localized_definition: data.localized_definition,
            sense_index,
            source: data.source,
            cefr_level: data.cefr_level,
            relations: data.relations,
            external_id: data.external_id,
            examples,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn part_of_speech(&self) -> &str {
        &self.part_of_speech
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn short_definition(&self) -> Option<&str> {
        self.short_definition.as_deref()
    }

    pub fn localized_definition(&self) -> Option<&str> {
        self.localized_definition.as_deref()
    }

    pub fn sense_index(&self) -> i32 {
        self.sense_index
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn cefr_level(&self) -> Option<&str> {
        self.cefr_level.as_deref()
    }

    pub fn relations(&self) -> &SenseRelations {
        &self.relations
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn example(&self, id: Uuid) -> Option<&Example> {
        self.examples.iter().find(|e| e.id() == id)
    }

    /// Copy of the sense's own fields (no identity, no index, no examples).
    pub fn to_data(&self) -> SenseData {
        SenseData {
            part_of_speech: self.part_of_speech.clone(),
            definition: self.definition.clone(),
            short_definition: self.short_definition.clone(),
            localized_definition: self.localized_definition.clone(),
            sense_index: None,
            source: self.source.clone(),
            cefr_level: self.cefr_level.clone(),
            relations: self.relations.clone(),
            external_id: self.external_id.clone(),
        }
    }

    /// Add an example; display order defaults to the current example count.
    pub fn add_example(&mut self, data: ExampleData) -> &Example {
        let default_order = self.examples.len() as i32;
        self.examples.push(Example::new(data, default_order));
        let last = self.examples.len() - 1;
        &self.examples[last]
    }

    pub fn update_example(&mut self, id: Uuid, patch: ExamplePatch) -> Option<&Example> {
        let example = self.examples.iter_mut().find(|e| e.id() == id)?;
        example.apply(patch);
        Some(&*example)
    }

    pub fn remove_example(&mut self, id: Uuid) -> bool {
        let before = self.examples.len();
        self.examples.retain(|e| e.id() != id);
        self.examples.len() != before
    }

    pub(crate) fn apply(&mut self, patch: SensePatch) {
        if let Some(pos) = patch.part_of_speech {
            self.part_of_speech = pos;
        }
        if let Some(definition) = patch.definition {
            self.definition = definition;
        }
        if let Some(short) = patch.short_definition {
            self.short_definition = short;
        }
        if let Some(localized) = patch.localized_definition {
            self.localized_definition = localized;
        }
        if let Some(cefr) = patch.cefr_level {
            self.cefr_level = cefr;
        }
        if let Some(relations) = patch.relations {
            self.relations = relations;
        }
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    pub(crate) fn examples_mut(&mut self) -> &mut [Example] {
        &mut self.examples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sense() -> WordSense {
        WordSense::new(
            SenseData {
                part_of_speech: "verb".into(),
                definition: "move fast on foot".into(),
                source: "azvocab".into(),
                ..Default::default()
            },
            0,
        )
    }

    #[test]
    fn test_add_example_assigns_display_order() {
        let mut s = sense();
        let first = s.add_example(ExampleData::new("She runs daily.")).display_order();
        let second = s.add_example(ExampleData::new("Run!")).display_order();
        assert_eq!((first, second), (0, 1));
    }

    #[test]
    fn test_update_and_remove_example() {
        let mut s = sense();
        let id = s.add_example(ExampleData::new("draft")).id();

        let updated = s
            .update_example(
                id,
                ExamplePatch {
                    text: Some("final".into()),
                    translation: Some(Some("bản cuối".into())),
                    ..Default::default()
                },
            )
            .map(|e| (e.text().to_string(), e.translation().map(str::to_string)));
        assert_eq!(
            updated,
            Some(("final".to_string(), Some("bản cuối".to_string())))
        );

        assert!(s.remove_example(id));
        assert!(!s.remove_example(id));
        assert!(s.examples().is_empty());
    }

    #[test]
    fn test_unknown_example_returns_none() {
        let mut s = sense();
        assert!(s
            .update_example(Uuid::new_v4(), ExamplePatch::default())
            .is_none());
    }
}
