//! Folding several detail aggregates for one headword into one `Word`.
//!
//! The first detail seeds the aggregate. Every later detail contributes its
//! senses (re-indexed after the running count, with their examples), its
//! pronunciations (deduplicated by `(ipa, region)`) and any root field the
//! seed lacks. A sense whose provider id is already present is not added
//! twice.

use lexicon_core::{DomainError, ExampleData, Word, WordPatch};

/// Merge a group of details for the same normalized text.
pub fn merge_details<I>(details: I) -> Result<Option<Word>, DomainError>
where
    I: IntoIterator<Item = Word>,
{
    let mut details = details.into_iter();
    let Some(mut seed) = details.next() else {
        return Ok(None);
    };
    for detail in details {
        merge_into(&mut seed, &detail)?;
    }
    Ok(Some(seed))
}

pub fn merge_into(target: &mut Word, detail: &Word) -> Result<(), DomainError> {
    for pronunciation in detail.pronunciations() {
        target.add_pronunciation(pronunciation.to_data());
    }

    for sense in detail.senses_in_display_order() {
        let duplicate = sense.external_id().is_some_and(|ext| {
            target
                .senses()
                .iter()
                .any(|s| s.external_id() == Some(ext))
        });
        if duplicate {
            continue;
        }

        let sense_id = target.add_sense(sense.to_data())?.id();
        for example in sense.examples() {
            let data = ExampleData {
                display_order: Some(example.display_order()),
                ..example.to_data()
            };
            target.add_example(sense_id, data)?;
        }
    }

    fill_root_fields(target, detail);
    Ok(())
}

/// Copy optional root fields from `other` where `target` has none.
pub fn fill_root_fields(target: &mut Word, other: &Word) {
    let mut patch = WordPatch::default();
    if target.frequency_rank().is_none() && other.frequency_rank().is_some() {
        patch.frequency_rank = Some(other.frequency_rank());
    }
    if target.frequency_count().is_none() && other.frequency_count().is_some() {
        patch.frequency_count = Some(other.frequency_count());
    }
    if target.inflections().is_none() && other.inflections().is_some() {
        patch.inflections = Some(other.inflections().map(<[String]>::to_vec));
    }
    if target.word_family().is_none() && other.word_family().is_some() {
        patch.word_family = Some(other.word_family().cloned());
    }
    if target.provenance().is_none() && other.provenance().is_some() {
        patch.provenance = Some(other.provenance().map(str::to_string));
    }
    target.update(patch);
}
