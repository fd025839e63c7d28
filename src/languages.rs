//! Static registry of supported languages.
//!
//! Every other component resolves languages through this table: the CLI lists
//! its display names, the detector reverse-maps service codes to names, and the
//! translation orchestrator turns selected names into codes.

/// One supported language: human-readable name plus its service code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageEntry {
    pub name: &'static str,
    pub code: &'static str,
}

/// Supported languages in display order. Names are unique; codes are
/// two-letter tags or hyphenated regional tags.
pub const LANGUAGES: &[LanguageEntry] = &[
    LanguageEntry { name: "Arabic", code: "ar" },
    LanguageEntry { name: "Bengali", code: "bn" },
    LanguageEntry { name: "Chinese (Simplified)", code: "zh-CN" },
    LanguageEntry { name: "Chinese (Traditional)", code: "zh-TW" },
    LanguageEntry { name: "Dutch", code: "nl" },
    LanguageEntry { name: "English", code: "en" },
    LanguageEntry { name: "French", code: "fr" },
    LanguageEntry { name: "German", code: "de" },
    LanguageEntry { name: "Gujarati", code: "gu" },
    LanguageEntry { name: "Hindi", code: "hi" },
    LanguageEntry { name: "Italian", code: "it" },
    LanguageEntry { name: "Japanese", code: "ja" },
    LanguageEntry { name: "Kannada", code: "kn" },
    LanguageEntry { name: "Korean", code: "ko" },
    LanguageEntry { name: "Malayalam", code: "ml" },
    LanguageEntry { name: "Marathi", code: "mr" },
    LanguageEntry { name: "Nepali", code: "ne" },
    LanguageEntry { name: "Persian", code: "fa" },
    LanguageEntry { name: "Portuguese", code: "pt" },
    LanguageEntry { name: "Punjabi", code: "pa" },
    LanguageEntry { name: "Russian", code: "ru" },
    LanguageEntry { name: "Spanish", code: "es" },
    LanguageEntry { name: "Tamil", code: "ta" },
    LanguageEntry { name: "Telugu", code: "te" },
    LanguageEntry { name: "Turkish", code: "tr" },
    LanguageEntry { name: "Ukrainian", code: "uk" },
    LanguageEntry { name: "Urdu", code: "ur" },
    LanguageEntry { name: "Vietnamese", code: "vi" },
];

/// Look up the service code for a display name (case-insensitive).
pub fn code_for_name(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| entry.code)
}

/// Reverse lookup: service code back to a display name (case-insensitive).
pub fn name_for_code(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|entry| entry.code.eq_ignore_ascii_case(code))
        .map(|entry| entry.name)
}

/// All display names in registry order.
pub fn names() -> Vec<&'static str> {
    LANGUAGES.iter().map(|entry| entry.name).collect()
}

/// Resolve a user-supplied language selector that may be either a display
/// name or a raw code.
pub fn resolve_to_code(selector: &str) -> Option<&'static str> {
    code_for_name(selector).or_else(|| name_for_code(selector).and_then(code_for_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_for_name() {
        assert_eq!(code_for_name("Spanish"), Some("es"));
        assert_eq!(code_for_name("spanish"), Some("es"));
        assert_eq!(code_for_name("Chinese (Simplified)"), Some("zh-CN"));
        assert_eq!(code_for_name("Klingon"), None);
    }

    #[test]
    fn test_name_for_code() {
        assert_eq!(name_for_code("es"), Some("Spanish"));
        assert_eq!(name_for_code("zh-cn"), Some("Chinese (Simplified)"));
        assert_eq!(name_for_code("xx"), None);
    }

    #[test]
    fn test_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in LANGUAGES {
            assert!(seen.insert(entry.name), "duplicate name: {}", entry.name);
        }
    }

    #[test]
    fn test_resolve_to_code_accepts_names_and_codes() {
        assert_eq!(resolve_to_code("Hindi"), Some("hi"));
        assert_eq!(resolve_to_code("hi"), Some("hi"));
        assert_eq!(resolve_to_code("nope"), None);
    }
}
