//! `Word` aggregate root.
//!
//! All changes to senses, examples and pronunciations go through the methods
//! on `Word` (or, for examples, through the sense handle returned by
//! `Word::sense_mut`). The `restore` constructors exist only to reconstitute an
//! aggregate from storage and skip invariant checks.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::error::DomainError;
use crate::example::{Example, ExampleData};
use crate::pronunciation::{Pronunciation, PronunciationData};
use crate::sense::{SenseData, SensePatch, WordSense};
use crate::text::normalize_text;

/// Derived forms grouped by part of speech, e.g. `{"noun": ["runner"]}`.
pub type WordFamily = BTreeMap<String, Vec<String>>;

/// Root-level attributes of a word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordData {
    pub text: String,
    pub language: String,
    pub source: String,
    pub frequency_rank: Option<i32>,
    pub frequency_count: Option<i64>,
    pub inflections: Option<Vec<String>>,
    pub word_family: Option<WordFamily>,
    /// Free-text provenance tag (e.g. "backfill:azvocab")
    pub provenance: Option<String>,
}

impl WordData {
    pub fn new(
        text: impl Into<String>,
        language: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Partial update of root-level fields. `None` leaves a field untouched.
///
/// Language is part of the uniqueness key and cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct WordPatch {
    pub text: Option<String>,
    pub source: Option<String>,
    pub frequency_rank: Option<Option<i32>>,
    pub frequency_count: Option<Option<i64>>,
    pub inflections: Option<Option<Vec<String>>>,
    pub word_family: Option<Option<WordFamily>>,
    pub provenance: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    id: Uuid,
    text: String,
    normalized_text: String,
    language: String,
    source: String,
    frequency_rank: Option<i32>,
    frequency_count: Option<i64>,
    inflections: Option<Vec<String>>,
    word_family: Option<WordFamily>,
    provenance: Option<String>,
    pronunciations: Vec<Pronunciation>,
    senses: Vec<WordSense>,
}

impl Word {
    /// Create a transient (unpersisted) word with a fresh identity.
    pub fn new(data: WordData) -> Self {
        Self::restore(crate::new_id(), data, Vec::new(), Vec::new())
    }

    /// Reconstitute from storage. Not for business mutation.
    pub fn restore(
        id: Uuid,
        data: WordData,
        pronunciations: Vec<Pronunciation>,
        senses: Vec<WordSense>,
    ) -> Self {
        let text = data.text.trim().to_string();
        let normalized_text = normalize_text(&text);
        Self {
            id,
            text,
            normalized_text,
            language: data.language,
            source: data.source,
            frequency_rank: data.frequency_rank,
            frequency_count: data.frequency_count,
            inflections: data.inflections,
            word_family: data.word_family,
            provenance: data.provenance,
            pronunciations,
            senses,
        }
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn frequency_rank(&self) -> Option<i32> {
        self.frequency_rank
    }

    pub fn frequency_count(&self) -> Option<i64> {
        self.frequency_count
    }

    pub fn inflections(&self) -> Option<&[String]> {
        self.inflections.as_deref()
    }

    pub fn word_family(&self) -> Option<&WordFamily> {
        self.word_family.as_ref()
    }

    pub fn provenance(&self) -> Option<&str> {
        self.provenance.as_deref()
    }

    pub fn pronunciations(&self) -> &[Pronunciation] {
        &self.pronunciations
    }

    /// Senses in insertion order.
    pub fn senses(&self) -> &[WordSense] {
        &self.senses
    }

    /// Senses ordered by `sense_index`, the external display order.
    pub fn senses_in_display_order(&self) -> Vec<&WordSense> {
        let mut senses: Vec<&WordSense> = self.senses.iter().collect();
        senses.sort_by_key(|s| s.sense_index());
        senses
    }

    pub fn sense(&self, id: Uuid) -> Option<&WordSense> {
        self.senses.iter().find(|s| s.id() == id)
    }

    /// Handle for example-level changes on one sense.
    pub fn sense_mut(&mut self, id: Uuid) -> Option<&mut WordSense> {
        self.senses.iter_mut().find(|s| s.id() == id)
    }

    pub fn example_count(&self) -> usize {
        self.senses.iter().map(|s| s.examples().len()).sum()
    }

    pub fn to_data(&self) -> WordData {
        WordData {
            text: self.text.clone(),
            language: self.language.clone(),
            source: self.source.clone(),
            frequency_rank: self.frequency_rank,
            frequency_count: self.frequency_count,
            inflections: self.inflections.clone(),
            word_family: self.word_family.clone(),
            provenance: self.provenance.clone(),
        }
    }

    // ── Root ───────────────────────────────────────────────────

    pub fn update(&mut self, patch: WordPatch) {
        if let Some(text) = patch.text {
            self.text = text.trim().to_string();
            self.normalized_text = normalize_text(&self.text);
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        if let Some(rank) = patch.frequency_rank {
            self.frequency_rank = rank;
        }
        if let Some(count) = patch.frequency_count {
            self.frequency_count = count;
        }
        if let Some(inflections) = patch.inflections {
            self.inflections = inflections;
        }
        if let Some(family) = patch.word_family {
            self.word_family = family;
        }
        if let Some(provenance) = patch.provenance {
            self.provenance = provenance;
        }
    }

    // ── Senses ─────────────────────────────────────────────────

    /// Index a sense added without an explicit index would receive.
    ///
    /// This is the current sense count unless a removal left that index
    /// taken, in which case it is one past the highest index.
    pub fn next_sense_index(&self) -> i32 {
        let count = self.senses.len() as i32;
        if self.sense_index_taken(count) {
            self.senses
                .iter()
                .map(|s| s.sense_index())
                .max()
                .map_or(count, |max| max + 1)
        } else {
            count
        }
    }

    pub fn add_sense(&mut self, data: SenseData) -> Result<&WordSense, DomainError> {
        let index = match data.sense_index {
            Some(index) if self.sense_index_taken(index) => {
                return Err(DomainError::DuplicateSenseIndex(index))
            }
            Some(index) => index,
            None => self.next_sense_index(),
        };
        self.senses.push(WordSense::new(data, index));
        let last = self.senses.len() - 1;
        Ok(&self.senses[last])
    }

    pub fn update_sense(&mut self, id: Uuid, patch: SensePatch) -> Option<&WordSense> {
        let sense = self.senses.iter_mut().find(|s| s.id() == id)?;
        sense.apply(patch);
        Some(&*sense)
    }

    /// Remove a sense together with its examples.
    pub fn remove_sense(&mut self, id: Uuid) -> bool {
        let before = self.senses.len();
        self.senses.retain(|s| s.id() != id);
        self.senses.len() != before
    }

    /// Add an example to the sense with the given id.
    ///
    /// Unlike the other child operations this fails loudly: a caller holding a
    /// sense id that is not in this aggregate has a bug.
    pub fn add_example(
        &mut self,
        sense_id: Uuid,
        data: ExampleData,
    ) -> Result<&Example, DomainError> {
        let sense = self
            .senses
            .iter_mut()
            .find(|s| s.id() == sense_id)
            .ok_or(DomainError::SenseNotFound(sense_id))?;
        Ok(sense.add_example(data))
    }

    fn sense_index_taken(&self, index: i32) -> bool {
        self.senses.iter().any(|s| s.sense_index() == index)
    }

    // ── Pronunciations ─────────────────────────────────────────

    /// Add a pronunciation, or return the existing one with the same
    /// `(ipa, region)`.
    pub fn add_pronunciation(&mut self, data: PronunciationData) -> &Pronunciation {
        let existing = self
            .pronunciations
            .iter()
            .position(|p| p.has_key(data.ipa.as_deref(), data.region.as_deref()));
        let index = match existing {
            Some(index) => index,
            None => {
                self.pronunciations.push(Pronunciation::new(data));
                self.pronunciations.len() - 1
            }
        };
        &self.pronunciations[index]
    }

    pub fn remove_pronunciation(&mut self, id: Uuid) -> bool {
        let before = self.pronunciations.len();
        self.pronunciations.retain(|p| p.id() != id);
        self.pronunciations.len() != before
    }

    // ── Identity ───────────────────────────────────────────────

    /// Take over the identity of an already persisted version of this word.
    ///
    /// The root id is always adopted. Children adopt the persisted id when
    /// they match by natural key: pronunciations by `(ipa, region)`, senses
    /// by external id, and examples of an adopted sense by external id or
    /// text. Unmatched children keep their fresh ids and are saved as new.
    pub fn adopt_identity(&mut self, persisted: &Word) {
        self.id = persisted.id;
        let mut claimed: HashSet<Uuid> = HashSet::new();

        for pronunciation in &mut self.pronunciations {
            let matched = persisted.pronunciations.iter().find(|p| {
                !claimed.contains(&p.id()) && p.has_key(pronunciation.ipa(), pronunciation.region())
            });
            if let Some(existing) = matched {
                claimed.insert(existing.id());
                pronunciation.set_id(existing.id());
            }
        }

        for sense in &mut self.senses {
            let Some(external_id) = sense.external_id().map(str::to_string) else {
                continue;
            };
            let matched = persisted.senses.iter().find(|s| {
                !claimed.contains(&s.id()) && s.external_id() == Some(external_id.as_str())
            });
            let Some(existing) = matched else {
                continue;
            };
            claimed.insert(existing.id());
            sense.set_id(existing.id());

            for example in sense.examples_mut() {
                let matched = existing.examples().iter().find(|e| {
                    !claimed.contains(&e.id())
                        && match (e.external_id(), example.external_id()) {
                            (Some(a), Some(b)) => a == b,
                            _ => e.text() == example.text(),
                        }
                });
                if let Some(existing_example) = matched {
                    claimed.insert(existing_example.id());
                    example.set_id(existing_example.id());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::ExamplePatch;

    fn word() -> Word {
        Word::new(WordData::new("  Run ", "en", "azvocab"))
    }

    fn sense(definition: &str) -> SenseData {
        SenseData {
            part_of_speech: "verb".into(),
            definition: definition.into(),
            source: "azvocab".into(),
            ..Default::default()
        }
    }

    fn pron(ipa: &str, region: &str) -> PronunciationData {
        PronunciationData {
            ipa: Some(ipa.into()),
            audio_url: None,
            region: Some(region.into()),
        }
    }

    #[test]
    fn test_new_normalizes_text() {
        let w = word();
        assert_eq!(w.text(), "Run");
        assert_eq!(w.normalized_text(), "run");
    }

    #[test]
    fn test_add_sense_assigns_running_index() {
        let mut w = word();
        let a = w.add_sense(sense("a")).unwrap().sense_index();
        let b = w.add_sense(sense("b")).unwrap().sense_index();
        assert_eq!((a, b), (0, 1));
    }

    #[test]
    fn test_add_sense_after_removal_does_not_collide() {
        let mut w = word();
        let first = w.add_sense(sense("a")).unwrap().id();
        w.add_sense(sense("b")).unwrap();
        assert!(w.remove_sense(first));

        // count is 1 but index 1 is taken by "b"
        let c = w.add_sense(sense("c")).unwrap().sense_index();
        assert_eq!(c, 2);
    }

    #[test]
    fn test_add_sense_rejects_duplicate_explicit_index() {
        let mut w = word();
        w.add_sense(sense("a")).unwrap();
        let err = w
            .add_sense(SenseData {
                sense_index: Some(0),
                ..sense("b")
            })
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateSenseIndex(0));
    }

    #[test]
    fn test_update_sense() {
        let mut w = word();
        let id = w.add_sense(sense("old")).unwrap().id();
        let patch = SensePatch {
            definition: Some("new".into()),
            cefr_level: Some(Some("A1".into())),
            ..Default::default()
        };
        let updated = w.update_sense(id, patch).unwrap();
        assert_eq!(updated.definition(), "new");
        assert_eq!(updated.cefr_level(), Some("A1"));
        assert!(w.update_sense(Uuid::new_v4(), SensePatch::default()).is_none());
    }

    #[test]
    fn test_remove_unknown_sense_returns_false() {
        let mut w = word();
        assert!(!w.remove_sense(Uuid::new_v4()));
    }

    #[test]
    fn test_add_example_to_unknown_sense_is_an_error() {
        let mut w = word();
        let missing = Uuid::new_v4();
        let err = w.add_example(missing, ExampleData::new("x")).unwrap_err();
        assert_eq!(err, DomainError::SenseNotFound(missing));
    }

    #[test]
    fn test_example_changes_through_sense_handle() {
        let mut w = word();
        let sense_id = w.add_sense(sense("a")).unwrap().id();
        let example_id = w.add_example(sense_id, ExampleData::new("x")).unwrap().id();

        let handle = w.sense_mut(sense_id).unwrap();
        handle.update_example(
            example_id,
            ExamplePatch {
                text: Some("y".into()),
                ..Default::default()
            },
        );
        assert_eq!(w.sense(sense_id).unwrap().examples()[0].text(), "y");
        assert_eq!(w.example_count(), 1);
    }

    #[test]
    fn test_duplicate_pronunciation_returns_existing() {
        let mut w = word();
        let first = w.add_pronunciation(pron("/rʌn/", "UK")).id();
        let second = w.add_pronunciation(pron("/rʌn/", "UK")).id();
        assert_eq!(first, second);
        assert_eq!(w.pronunciations().len(), 1);

        w.add_pronunciation(pron("/rʌn/", "US"));
        assert_eq!(w.pronunciations().len(), 2);
    }

    #[test]
    fn test_remove_pronunciation() {
        let mut w = word();
        let id = w.add_pronunciation(pron("/rʌn/", "UK")).id();
        assert!(w.remove_pronunciation(id));
        assert!(!w.remove_pronunciation(id));
    }

    #[test]
    fn test_update_root_fields() {
        let mut w = word();
        w.update(WordPatch {
            text: Some(" RUNS".into()),
            frequency_rank: Some(Some(12)),
            provenance: Some(Some("manual".into())),
            ..Default::default()
        });
        assert_eq!(w.normalized_text(), "runs");
        assert_eq!(w.frequency_rank(), Some(12));
        assert_eq!(w.provenance(), Some("manual"));
    }

    #[test]
    fn test_display_order_follows_sense_index() {
        let mut w = word();
        w.add_sense(SenseData {
            sense_index: Some(5),
            ..sense("late")
        })
        .unwrap();
        w.add_sense(SenseData {
            sense_index: Some(1),
            ..sense("early")
        })
        .unwrap();
        let order: Vec<&str> = w
            .senses_in_display_order()
            .iter()
            .map(|s| s.definition())
            .collect();
        assert_eq!(order, vec!["early", "late"]);
    }

    #[test]
    fn test_adopt_identity_matches_children_by_natural_key() {
        let mut persisted = word();
        let p_id = persisted.add_pronunciation(pron("/rʌn/", "UK")).id();
        let s_id = persisted
            .add_sense(SenseData {
                external_id: Some("s1".into()),
                ..sense("a")
            })
            .unwrap()
            .id();
        let e_id = persisted
            .add_example(s_id, ExampleData::new("She runs."))
            .unwrap()
            .id();

        let mut fresh = word();
        fresh.add_pronunciation(pron("/rʌn/", "UK"));
        fresh.add_pronunciation(pron("/rʌn/", "US"));
        let fresh_sense = fresh
            .add_sense(SenseData {
                external_id: Some("s1".into()),
                ..sense("a")
            })
            .unwrap()
            .id();
        fresh
            .add_example(fresh_sense, ExampleData::new("She runs."))
            .unwrap();
        let unmatched = fresh.add_sense(sense("b")).unwrap().id();

        fresh.adopt_identity(&persisted);

        assert_eq!(fresh.id(), persisted.id());
        assert_eq!(fresh.pronunciations()[0].id(), p_id);
        assert_ne!(fresh.pronunciations()[1].id(), p_id);
        assert_eq!(fresh.senses()[0].id(), s_id);
        assert_eq!(fresh.senses()[0].examples()[0].id(), e_id);
        assert_eq!(fresh.senses()[1].id(), unmatched);
    }
}
