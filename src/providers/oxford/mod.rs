//! Oxford Dictionaries API v2.

mod adapter;
mod client;
mod extract;
pub mod types;

pub use adapter::OxfordAdapter;
pub use client::OxfordClient;
pub use extract::OxfordExtractor;
