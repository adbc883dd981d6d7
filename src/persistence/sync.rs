//! Id-based collection synchronization.
//!
//! Each child collection of a persisted word is reconciled against the
//! aggregate in three explicit sets, computed once per level:
//!
//! - **orphans**: persisted ids absent from the aggregate, deleted
//!   (a sense takes its examples with it)
//! - **new**: aggregate ids absent from storage, materialized and inserted
//! - **matched**: ids on both sides, updated field by field in place
//!
//! Senses are diffed first; then the examples of every surviving sense.
//! Every write is recorded in a `ChangeSet`, so re-running a sync over an
//! unchanged aggregate records nothing.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use lexicon_core::{Example, Pronunciation, Word, WordSense};

use super::entity::{ExampleEntity, PronunciationEntity, SenseEntity, WordEntity};

// ── Change tracking ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Word,
    Pronunciation,
    Sense,
    Example,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WriteOp {
    Insert(EntityKind, Uuid),
    Update(EntityKind, Uuid),
    Delete(EntityKind, Uuid),
}

impl WriteOp {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Insert(k, _) | Self::Update(k, _) | Self::Delete(k, _) => *k,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Insert(_, id) | Self::Update(_, id) | Self::Delete(_, id) => *id,
        }
    }
}

/// Ordered record of the writes one save needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    ops: Vec<WriteOp>,
}

impl ChangeSet {
    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn contains(&self, op: WriteOp) -> bool {
        self.ops.contains(&op)
    }

    pub fn deletes(&self, kind: EntityKind) -> Vec<Uuid> {
        self.select(kind, |op| matches!(op, WriteOp::Delete(..)))
    }

    pub fn inserts(&self, kind: EntityKind) -> Vec<Uuid> {
        self.select(kind, |op| matches!(op, WriteOp::Insert(..)))
    }

    pub fn updates(&self, kind: EntityKind) -> Vec<Uuid> {
        self.select(kind, |op| matches!(op, WriteOp::Update(..)))
    }

    fn select(&self, kind: EntityKind, pred: impl Fn(&WriteOp) -> bool) -> Vec<Uuid> {
        self.ops
            .iter()
            .filter(|op| op.kind() == kind && pred(op))
            .map(WriteOp::id)
            .collect()
    }
}

// ── Generic diff ──────────────────────────────────────────────

/// The three sets of one collection level, in aggregate order where it
/// applies (persisted order for orphans).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDiff {
    pub orphans: Vec<Uuid>,
    pub new: Vec<Uuid>,
    pub matched: Vec<Uuid>,
}

pub fn diff_collection(domain_ids: &[Uuid], persisted_ids: &[Uuid]) -> CollectionDiff {
    let domain: HashSet<Uuid> = domain_ids.iter().copied().collect();
    let persisted: HashSet<Uuid> = persisted_ids.iter().copied().collect();

    let mut diff = CollectionDiff {
        orphans: persisted_ids
            .iter()
            .copied()
            .filter(|id| !domain.contains(id))
            .collect(),
        ..Default::default()
    };
    for id in domain_ids {
        if persisted.contains(id) {
            diff.matched.push(*id);
        } else {
            diff.new.push(*id);
        }
    }
    diff
}

/// A persisted child that can be built from and refreshed from its domain
/// counterpart.
pub trait SyncEntity: Sized {
    type Domain;
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
    fn domain_id(domain: &Self::Domain) -> Uuid;
    fn from_domain(domain: &Self::Domain) -> Self;
    /// Copy changed fields over; true when anything differed.
    fn update_from(&mut self, domain: &Self::Domain) -> bool;
}

/// Reconcile one collection level. The collection ends up in aggregate
/// order. `on_orphan` and `on_new` see a removed or freshly built child so
/// callers can record cascaded writes of its own children.
pub fn sync_collection<E, O, N>(
    domain: &[E::Domain],
    persisted: &mut Vec<E>,
    changes: &mut ChangeSet,
    mut on_orphan: O,
    mut on_new: N,
) where
    E: SyncEntity,
    O: FnMut(&E, &mut ChangeSet),
    N: FnMut(&E, &mut ChangeSet),
{
    let domain_ids: Vec<Uuid> = domain.iter().map(E::domain_id).collect();
    let persisted_ids: Vec<Uuid> = persisted.iter().map(E::id).collect();
    let diff = diff_collection(&domain_ids, &persisted_ids);

    let mut by_id: HashMap<Uuid, E> = persisted.drain(..).map(|e| (e.id(), e)).collect();

    for id in &diff.orphans {
        if let Some(orphan) = by_id.remove(id) {
            on_orphan(&orphan, changes);
            changes.push(WriteOp::Delete(E::KIND, *id));
        }
    }

    for item in domain {
        let id = E::domain_id(item);
        match by_id.remove(&id) {
            Some(mut existing) => {
                if existing.update_from(item) {
                    changes.push(WriteOp::Update(E::KIND, id));
                }
                persisted.push(existing);
            }
            None => {
                let created = E::from_domain(item);
                changes.push(WriteOp::Insert(E::KIND, id));
                on_new(&created, changes);
                persisted.push(created);
            }
        }
    }
}

/// Reconcile every child collection of `entity` against `word`.
pub fn sync_children(word: &Word, entity: &mut WordEntity, changes: &mut ChangeSet) {
    sync_collection(
        word.pronunciations(),
        &mut entity.pronunciations,
        changes,
        |_, _| {},
        |_, _| {},
    );

    sync_collection(
        word.senses(),
        &mut entity.senses,
        changes,
        |orphan: &SenseEntity, changes| {
            for example in &orphan.examples {
                changes.push(WriteOp::Delete(EntityKind::Example, example.id));
            }
        },
        |created: &SenseEntity, changes| {
            for example in &created.examples {
                changes.push(WriteOp::Insert(EntityKind::Example, example.id));
            }
        },
    );

    for sense in word.senses() {
        if let Some(persisted) = entity.senses.iter_mut().find(|s| s.id == sense.id()) {
            sync_collection(
                sense.examples(),
                &mut persisted.examples,
                changes,
                |_, _| {},
                |_, _| {},
            );
        }
    }
}

// ── Entity impls ──────────────────────────────────────────────

fn assign<T: PartialEq + Clone>(slot: &mut T, value: &T, changed: &mut bool) {
    if slot != value {
        *slot = value.clone();
        *changed = true;
    }
}

impl SyncEntity for PronunciationEntity {
    type Domain = Pronunciation;
    const KIND: EntityKind = EntityKind::Pronunciation;

    fn id(&self) -> Uuid {
        self.id
    }

    fn domain_id(domain: &Pronunciation) -> Uuid {
        domain.id()
    }

    fn from_domain(domain: &Pronunciation) -> Self {
        Self {
            id: domain.id(),
            ipa: domain.ipa().map(str::to_string),
            audio_url: domain.audio_url().map(str::to_string),
            region: domain.region().map(str::to_string),
        }
    }

    fn update_from(&mut self, domain: &Pronunciation) -> bool {
        let mut changed = false;
        assign(&mut self.ipa, &domain.ipa().map(str::to_string), &mut changed);
        assign(
            &mut self.audio_url,
            &domain.audio_url().map(str::to_string),
            &mut changed,
        );
        assign(&mut self.region, &domain.region().map(str::to_string), &mut changed);
        changed
    }
}

impl SyncEntity for SenseEntity {
    type Domain = WordSense;
    const KIND: EntityKind = EntityKind::Sense;

    fn id(&self) -> Uuid {
        self.id
    }

    fn domain_id(domain: &WordSense) -> Uuid {
        domain.id()
    }

    fn from_domain(domain: &WordSense) -> Self {
        Self {
            id: domain.id(),
            part_of_speech: domain.part_of_speech().to_string(),
            definition: domain.definition().to_string(),
            short_definition: domain.short_definition().map(str::to_string),
            localized_definition: domain.localized_definition().map(str::to_string),
            sense_index: domain.sense_index(),
            source: domain.source().to_string(),
            cefr_level: domain.cefr_level().map(str::to_string),
            relations: domain.relations().clone(),
            external_id: domain.external_id().map(str::to_string),
            examples: domain.examples().iter().map(ExampleEntity::from_domain).collect(),
        }
    }

    /// Own fields only; examples are synced as their own level.
    fn update_from(&mut self, domain: &WordSense) -> bool {
        let mut changed = false;
        assign(
            &mut self.part_of_speech,
            &domain.part_of_speech().to_string(),
            &mut changed,
        );
        assign(&mut self.definition, &domain.definition().to_string(), &mut changed);
        assign(
            &mut self.short_definition,
            &domain.short_definition().map(str::to_string),
            &mut changed,
        );
        assign(
            &mut self.localized_definition,
            &domain.localized_definition().map(str::to_string),
            &mut changed,
        );
        assign(&mut self.sense_index, &domain.sense_index(), &mut changed);
        assign(&mut self.source, &domain.source().to_string(), &mut changed);
        assign(
            &mut self.cefr_level,
            &domain.cefr_level().map(str::to_string),
            &mut changed,
        );
        assign(&mut self.relations, domain.relations(), &mut changed);
        assign(
            &mut self.external_id,
            &domain.external_id().map(str::to_string),
            &mut changed,
        );
        changed
    }
}

impl SyncEntity for ExampleEntity {
    type Domain = Example;
    const KIND: EntityKind = EntityKind::Example;

    fn id(&self) -> Uuid {
        self.id
    }

    fn domain_id(domain: &Example) -> Uuid {
        domain.id()
    }

    fn from_domain(domain: &Example) -> Self {
        Self {
            id: domain.id(),
            text: domain.text().to_string(),
            translation: domain.translation().map(str::to_string),
            display_order: domain.display_order(),
            external_id: domain.external_id().map(str::to_string),
        }
    }

    fn update_from(&mut self, domain: &Example) -> bool {
        let mut changed = false;
        assign(&mut self.text, &domain.text().to_string(), &mut changed);
        assign(
            &mut self.translation,
            &domain.translation().map(str::to_string),
            &mut changed,
        );
        assign(&mut self.display_order, &domain.display_order(), &mut changed);
        assign(
            &mut self.external_id,
            &domain.external_id().map(str::to_string),
            &mut changed,
        );
        changed
    }
}
