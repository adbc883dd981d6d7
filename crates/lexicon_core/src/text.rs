/// Lower-cased, trimmed form of a headword used as the uniqueness and lookup key.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}
