//! Persistence: entity graph, mapper, collection sync, and storage adapters.
//!
//! The `Word` aggregate never leaves the mapper as an entity. Repositories
//! load a `WordEntity`, reconstitute the aggregate with `mapper::to_domain`,
//! and on save compute the exact writes with `mapper::to_entity`.

pub mod entity;
pub mod mapper;
pub mod memory;
pub mod sync;

#[cfg(feature = "database")]
pub mod postgres;

pub use entity::{ExampleEntity, PronunciationEntity, SenseEntity, WordEntity};
pub use memory::{InMemoryRawResponseStore, InMemoryWordRepository};
pub use sync::{ChangeSet, EntityKind, WriteOp};

#[cfg(feature = "database")]
pub use postgres::{
    DatabaseConfig, DatabaseManager, PgBackfillStore, PgRawResponseStore, PgWordRepository,
};
