//! Dictionary core
//!
//! Pure domain types and storage ports for the dictionary import pipeline:
//! - `Word` aggregate root with its `WordSense`, `Example` and `Pronunciation` children
//! - `ProviderSource` / `EndpointType` identifying external dictionary calls
//! - `CachedRawResponse`, the verbatim side-channel log of provider responses
//! - `WordRepository` and `RawResponseStore` port traits, implemented by the
//!   in-memory and PostgreSQL adapters in the `lexicon` crate

pub mod error;
pub mod example;
pub mod ports;
pub mod pronunciation;
pub mod raw_response;
pub mod sense;
pub mod source;
pub mod text;
pub mod word;

pub use error::{DomainError, RepositoryError};
pub use example::{Example, ExampleData, ExamplePatch};
pub use ports::{RawResponseStore, WordRepository};
pub use pronunciation::{Pronunciation, PronunciationData};
pub use raw_response::{CacheKey, CachedRawResponse, NewRawResponse};
pub use sense::{SenseData, SensePatch, SenseRelations, WordSense};
pub use source::{EndpointType, ProviderSource, UnknownEndpointType, UnknownSource};
pub use text::normalize_text;
pub use word::{Word, WordData, WordFamily, WordPatch};

use uuid::Uuid;

/// Allocate a new time-sortable identifier for an aggregate or child entity.
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}
