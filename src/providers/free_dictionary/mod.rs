//! Free Dictionary API (dictionaryapi.dev).

mod adapter;
mod client;
mod extract;
pub mod types;

pub use adapter::FreeDictionaryAdapter;
pub use client::FreeDictionaryClient;
pub use extract::FreeDictionaryExtractor;
