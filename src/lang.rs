//! Supported languages for translation and speech synthesis

/// Display name → ISO 639-1 code pairs accepted by the translation prompt
/// and the synthesis endpoint
pub const LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Chinese", "zh"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Arabic", "ar"),
    ("Hindi", "hi"),
    ("Russian", "ru"),
];

/// Look up the ISO code for a display name (case-insensitive)
pub fn code_for(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, c)| *c)
}

/// Whether an ISO code is on the supported list
pub fn is_supported_code(code: &str) -> bool {
    LANGUAGES.iter().any(|(_, c)| c.eq_ignore_ascii_case(code))
}

/// Display name for an ISO code, if supported
pub fn name_for(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lookup_is_case_insensitive() {
        assert_eq!(code_for("Spanish"), Some("es"));
        assert_eq!(code_for("spanish"), Some("es"));
        assert_eq!(code_for("Klingon"), None);
    }

    #[test]
    fn test_supported_codes() {
        assert!(is_supported_code("en"));
        assert!(is_supported_code("ZH"));
        assert!(!is_supported_code("xx"));
    }

    #[test]
    fn test_name_for_code() {
        assert_eq!(name_for("hi"), Some("Hindi"));
        assert_eq!(name_for("xx"), None);
    }
}
