//! Lookup and import over the dictionary providers.

pub mod factory;
pub mod merge;
pub mod orchestrator;

pub use factory::LookupFactory;
pub use merge::{merge_details, merge_into};
pub use orchestrator::{ImportResult, ProviderOrchestrator};
