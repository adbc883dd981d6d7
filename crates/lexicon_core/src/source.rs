//! External dictionary sources and the endpoint kinds called on them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Closed set of supported dictionary providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSource {
    AzVocab,
    Oxford,
    FreeDictionary,
}

impl ProviderSource {
    pub const ALL: [ProviderSource; 3] = [
        ProviderSource::AzVocab,
        ProviderSource::Oxford,
        ProviderSource::FreeDictionary,
    ];

    /// Stable identifier used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzVocab => "azvocab",
            Self::Oxford => "oxford",
            Self::FreeDictionary => "freedictionary",
        }
    }
}

impl std::fmt::Display for ProviderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a source name is not one of the supported providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dictionary source '{0}'")]
pub struct UnknownSource(pub String);

/// Stored endpoint type that is neither `search` nor `definition`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown endpoint type '{0}'")]
pub struct UnknownEndpointType(pub String);

impl FromStr for ProviderSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "azvocab" => Ok(Self::AzVocab),
            "oxford" => Ok(Self::Oxford),
            "freedictionary" => Ok(Self::FreeDictionary),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

/// Kind of provider call, part of the raw-response cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    /// Candidate matches for a term
    Search,
    /// One detailed entry
    Definition,
}

impl EndpointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Definition => "definition",
        }
    }
}

impl std::fmt::Display for EndpointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointType {
    type Err = UnknownEndpointType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "definition" => Ok(Self::Definition),
            other => Err(UnknownEndpointType(other.to_string())),
        }
    }
}
