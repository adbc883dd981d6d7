use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for `Word::add_pronunciation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationData {
    pub ipa: Option<String>,
    pub audio_url: Option<String>,
    /// Dialect tag such as "UK" or "US"
    pub region: Option<String>,
}

/// Pronunciation value object.
///
/// Equality for deduplication is `(ipa, region)`; the id only exists so the
/// persisted row can be matched on the next save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciation {
    id: Uuid,
    ipa: Option<String>,
    audio_url: Option<String>,
    region: Option<String>,
}

impl Pronunciation {
    pub(crate) fn new(data: PronunciationData) -> Self {
        Self::restore(crate::new_id(), data)
    }

    /// Reconstitute from storage. Not for business mutation.
    pub fn restore(id: Uuid, data: PronunciationData) -> Self {
        Self {
            id,
            ipa: data.ipa,
            audio_url: data.audio_url,
            region: data.region,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn ipa(&self) -> Option<&str> {
        self.ipa.as_deref()
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// True when this pronunciation has the given `(ipa, region)` key.
    pub fn has_key(&self, ipa: Option<&str>, region: Option<&str>) -> bool {
        self.ipa() == ipa && self.region() == region
    }

    pub fn to_data(&self) -> PronunciationData {
        PronunciationData {
            ipa: self.ipa.clone(),
            audio_url: self.audio_url.clone(),
            region: self.region.clone(),
        }
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}
