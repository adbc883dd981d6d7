//! `Word` aggregate ⇄ persisted entity graph.

use chrono::{DateTime, Utc};

use lexicon_core::{
    Example, ExampleData, Pronunciation, PronunciationData, SenseData, Word, WordData, WordSense,
};

use super::entity::{PronunciationEntity, SenseEntity, WordEntity};
use super::sync::{sync_children, ChangeSet, EntityKind, SyncEntity, WriteOp};

/// Reconstitute the aggregate from a stored graph.
pub fn to_domain(entity: &WordEntity) -> Word {
    let pronunciations = entity
        .pronunciations
        .iter()
        .map(|p| {
            Pronunciation::restore(
                p.id,
                PronunciationData {
                    ipa: p.ipa.clone(),
                    audio_url: p.audio_url.clone(),
                    region: p.region.clone(),
                },
            )
        })
        .collect();

    let senses = entity.senses.iter().map(sense_to_domain).collect();

    Word::restore(
        entity.id,
        WordData {
            text: entity.text.clone(),
            language: entity.language.clone(),
            source: entity.source.clone(),
            frequency_rank: entity.frequency_rank,
            frequency_count: entity.frequency_count,
            inflections: entity.inflections.clone(),
            word_family: entity.word_family.clone(),
            provenance: entity.provenance.clone(),
        },
        pronunciations,
        senses,
    )
}

fn sense_to_domain(sense: &SenseEntity) -> WordSense {
    let examples = sense
        .examples
        .iter()
        .map(|e| {
            Example::restore(
                e.id,
                ExampleData {
                    text: e.text.clone(),
                    translation: e.translation.clone(),
                    display_order: None,
                    external_id: e.external_id.clone(),
                },
                e.display_order,
            )
        })
        .collect();

    WordSense::restore(
        sense.id,
        SenseData {
            part_of_speech: sense.part_of_speech.clone(),
            definition: sense.definition.clone(),
            short_definition: sense.short_definition.clone(),
            localized_definition: sense.localized_definition.clone(),
            sense_index: None,
            source: sense.source.clone(),
            cefr_level: sense.cefr_level.clone(),
            relations: sense.relations.clone(),
            external_id: sense.external_id.clone(),
        },
        sense.sense_index,
        examples,
    )
}

/// Build the persisted graph for `word`.
///
/// With no `existing` graph everything is an insert. Otherwise root fields
/// are copied over and every child collection is synchronized; the
/// returned `ChangeSet` lists exactly the writes needed, and is empty when
/// nothing changed (in which case `updated_at` is left alone).
pub fn to_entity(
    word: &Word,
    existing: Option<WordEntity>,
    now: DateTime<Utc>,
) -> (WordEntity, ChangeSet) {
    let mut changes = ChangeSet::default();

    let Some(mut entity) = existing else {
        let entity = WordEntity {
            id: word.id(),
            text: word.text().to_string(),
            normalized_text: word.normalized_text().to_string(),
            language: word.language().to_string(),
            source: word.source().to_string(),
            frequency_rank: word.frequency_rank(),
            frequency_count: word.frequency_count(),
            inflections: word.inflections().map(<[String]>::to_vec),
            word_family: word.word_family().cloned(),
            provenance: word.provenance().map(str::to_string),
            pronunciations: word
                .pronunciations()
                .iter()
                .map(PronunciationEntity::from_domain)
                .collect(),
            senses: word.senses().iter().map(SenseEntity::from_domain).collect(),
            created_at: now,
            updated_at: now,
        };
        changes.push(WriteOp::Insert(EntityKind::Word, entity.id));
        for p in &entity.pronunciations {
            changes.push(WriteOp::Insert(EntityKind::Pronunciation, p.id));
        }
        for s in &entity.senses {
            changes.push(WriteOp::Insert(EntityKind::Sense, s.id));
            for e in &s.examples {
                changes.push(WriteOp::Insert(EntityKind::Example, e.id));
            }
        }
        return (entity, changes);
    };

    let root_changed = update_root(&mut entity, word);
    sync_children(word, &mut entity, &mut changes);

    if root_changed || !changes.is_empty() {
        changes.push(WriteOp::Update(EntityKind::Word, entity.id));
        entity.updated_at = now;
    }
    (entity, changes)
}

fn update_root(entity: &mut WordEntity, word: &Word) -> bool {
    let before = (
        entity.text.clone(),
        entity.normalized_text.clone(),
        entity.source.clone(),
        entity.frequency_rank,
        entity.frequency_count,
        entity.inflections.clone(),
        entity.word_family.clone(),
        entity.provenance.clone(),
    );

    entity.text = word.text().to_string();
    entity.normalized_text = word.normalized_text().to_string();
    entity.source = word.source().to_string();
    entity.frequency_rank = word.frequency_rank();
    entity.frequency_count = word.frequency_count();
    entity.inflections = word.inflections().map(<[String]>::to_vec);
    entity.word_family = word.word_family().cloned();
    entity.provenance = word.provenance().map(str::to_string);

    before
        != (
            entity.text.clone(),
            entity.normalized_text.clone(),
            entity.source.clone(),
            entity.frequency_rank,
            entity.frequency_count,
            entity.inflections.clone(),
            entity.word_family.clone(),
            entity.provenance.clone(),
        )
}
