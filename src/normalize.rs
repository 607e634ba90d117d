// 🧹 Record Normalizer - shared text and list rules used by every parser
// and by the loaders when they explode comma-joined fields into child rows.

use std::borrow::Cow;
use std::collections::HashSet;

/// Default for required-but-unstated values in sources that default rather than skip.
pub const UNKNOWN: &str = "Unknown";

/// Name values that carry no information (UK feed convention).
const PLACEHOLDERS: [&str; 3] = ["-", "None", "N/A"];

// ============================================================================
// LIST RULES
// ============================================================================

/// Split a comma-joined field into trimmed, non-empty, distinct tokens.
///
/// Order of first appearance is kept so child rows are inserted in feed order.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    dedup_preserving_order(
        value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string),
    )
}

/// Join values with ", "; an empty list is `None`, not an empty string.
pub fn join_list<I, S>(values: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

pub fn dedup_preserving_order<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

// ============================================================================
// TEXT RULES
// ============================================================================

/// Trimmed value, or `None` when absent or blank.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn or_unknown(value: Option<String>) -> Option<String> {
    Some(value.unwrap_or_else(|| UNKNOWN.to_string()))
}

pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || PLACEHOLDERS.contains(&value)
}

/// Text cleaning for feeds with unreliable encodings (UN, EU).
///
/// Undoes UTF-8 bytes that were decoded as Latin-1 when the text round-trips,
/// then rejects anything without at least one ASCII Latin letter. Values that
/// fail are treated as unusable rather than repaired further.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    let repaired = repair_mojibake(value);
    let text = repaired.trim();

    if !has_latin_letter(text) {
        return None;
    }

    Some(text.to_string())
}

pub fn has_latin_letter(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

/// "JosÃ©" → "José". Text that isn't representable in Latin-1, or whose
/// bytes aren't valid UTF-8, is returned unchanged.
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if text.is_ascii() || text.chars().any(|c| (c as u32) > 0xFF) {
        return Cow::Borrowed(text);
    }

    let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
    match String::from_utf8(bytes) {
        Ok(repaired) => Cow::Owned(repaired),
        Err(_) => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_dedups_and_trims() {
        let tokens = split_list(Some("A, B, B, A"));
        assert_eq!(tokens, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_split_list_drops_empties() {
        assert_eq!(split_list(Some(" , ,Iraq,, ")), vec!["Iraq".to_string()]);
        assert!(split_list(Some("")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_join_list() {
        assert_eq!(
            join_list(["Russia", " Belarus "]),
            Some("Russia, Belarus".to_string())
        );
        assert_eq!(join_list(Vec::<String>::new()), None);
        assert_eq!(join_list(["", "  "]), None);
    }

    #[test]
    fn test_clean_text_rejects_non_latin() {
        assert_eq!(clean_text(Some("محمد علي")), None);
        assert_eq!(clean_text(Some("金正恩")), None);
        assert_eq!(clean_text(Some("--- 123")), None);
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn test_clean_text_keeps_latin() {
        assert_eq!(
            clean_text(Some("  Abu Bakr al-Baghdadi ")),
            Some("Abu Bakr al-Baghdadi".to_string())
        );
        // Mixed script keeps the whole value
        assert_eq!(
            clean_text(Some("Hezbollah حزب الله")),
            Some("Hezbollah حزب الله".to_string())
        );
    }

    #[test]
    fn test_repair_mojibake() {
        assert_eq!(repair_mojibake("JosÃ© MarÃ\u{AD}a"), "José María");
        // Already-correct Latin-1 text does not round-trip and is kept
        assert_eq!(repair_mojibake("José"), "José");
        assert_eq!(repair_mojibake("plain"), "plain");
    }

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder("-"));
        assert!(is_placeholder(" N/A "));
        assert!(is_placeholder("None"));
        assert!(is_placeholder(""));
        assert!(!is_placeholder("Nonetheless Ltd"));
    }

    #[test]
    fn test_non_empty_and_unknown() {
        assert_eq!(non_empty(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(or_unknown(None), Some(UNKNOWN.to_string()));
        assert_eq!(or_unknown(Some("Iraq".into())), Some("Iraq".to_string()));
    }
}
