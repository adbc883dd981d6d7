//! AzVocab: English headwords with Vietnamese glosses, CEFR levels and
//! frequency data.

mod adapter;
mod client;
mod extract;
pub mod types;

pub use adapter::AzVocabAdapter;
pub use client::AzVocabClient;
pub use extract::AzVocabExtractor;
