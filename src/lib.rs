//! Lexicon: multi-source dictionary import, lookup and backfill.
//!
//! Control flow for lookups and imports:
//!
//! ```text
//! LookupFactory ─▶ ProviderOrchestrator ─▶ DictionaryProvider ─▶ CachedHttpClient ─▶ HttpTransport
//!                          │                      │                    │
//!                          │                      ▼                    ▼
//!                          │               WordAdapter → Word    RawResponseStore
//!                          ▼
//!                   WordRepository (mapper + collection sync)
//! ```
//!
//! The backfill pipeline replays `RawResponseStore` contents into persisted
//! words without calling providers.

pub mod backfill;
pub mod config;
pub mod error;
pub mod http;
pub mod lookup;
pub mod persistence;
pub mod providers;

pub use config::LexiconConfig;
pub use error::{LexiconError, ProviderError};
pub use lookup::{ImportResult, LookupFactory, ProviderOrchestrator};

pub use lexicon_core as core;
