//! Normalization helpers shared by the provider adapters.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use lexicon_core::ProviderSource;

/// Definitions longer than this get a truncated short form.
pub const SHORT_DEFINITION_CHARS: usize = 120;

/// Parse a raw payload, logging (not propagating) structural failures.
pub fn parse_payload<T: DeserializeOwned>(source: ProviderSource, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(provider = %source, error = %e, "Unreadable provider payload");
            None
        }
    }
}

/// Reads an explicit JSON `null` as the type's default.
///
/// Pair with a container-level `#[serde(default)]` so absent fields still
/// default without reaching this function.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trimmed, non-empty text.
pub fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trim, drop blanks and repeats, keep first-seen order.
pub fn clean_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Short form of a definition: the definition itself when short enough,
/// otherwise cut at a word boundary with an ellipsis.
pub fn short_definition(definition: &str) -> Option<String> {
    let definition = definition.trim();
    if definition.is_empty() {
        return None;
    }
    if definition.chars().count() <= SHORT_DEFINITION_CHARS {
        return Some(definition.to_string());
    }

    let head: String = definition.chars().take(SHORT_DEFINITION_CHARS).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if pos > SHORT_DEFINITION_CHARS / 2 => &head[..pos],
        _ => head.as_str(),
    };
    Some(format!(
        "{}…",
        cut.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';')
    ))
}

/// Region tag from explicit dialect metadata ("British English", "US", ...).
pub fn region_from_dialect(dialect: &str) -> Option<String> {
    let d = dialect.trim().to_ascii_lowercase();
    let region = if d.contains("british") || d == "uk" || d == "gb" || d == "en-gb" {
        "UK"
    } else if d.contains("american") || d == "us" || d == "en-us" {
        "US"
    } else if d.contains("australian") || d == "au" || d == "en-au" {
        "AU"
    } else {
        return None;
    };
    Some(region.to_string())
}

/// Region tag from audio file naming, e.g. `.../run-us.mp3` or `run_uk_1.mp3`.
pub fn region_from_audio_url(url: &str) -> Option<String> {
    let file = url.rsplit('/').next().unwrap_or(url).to_ascii_lowercase();
    const PATTERNS: [(&str, &str); 6] = [
        ("us", "US"),
        ("uk", "UK"),
        ("gb", "UK"),
        ("au", "AU"),
        ("ca", "CA"),
        ("ie", "IE"),
    ];
    for (code, region) in PATTERNS {
        for sep in ['-', '_'] {
            for end in ['.', '_', '-'] {
                if file.contains(&format!("{sep}{code}{end}")) {
                    return Some(region.to_string());
                }
            }
        }
    }
    None
}

/// Dialect metadata wins; the audio file name is the fallback.
pub fn infer_region(dialect: Option<&str>, audio_url: Option<&str>) -> Option<String> {
    dialect
        .and_then(region_from_dialect)
        .or_else(|| audio_url.and_then(region_from_audio_url))
}
