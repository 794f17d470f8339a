//! Language hints.

use std::fmt;

/// Sentinel meaning "let the engine detect the source language".
pub const AUTO: &str = "auto";

/// Language every engine falls back to when no target is given.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Source-language hint for recognition and translation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    /// Auto-detect.
    Auto,
    /// Explicit language tag, e.g. `"hi"` or `"en-US"`.
    Code(String),
}

impl SourceLanguage {
    /// Parse a wire value. Empty strings and `"auto"` (any case) mean [`SourceLanguage::Auto`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(AUTO) {
            Self::Auto
        } else {
            Self::Code(trimmed.to_string())
        }
    }

    /// The explicit code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Code(code) => Some(code),
        }
    }

    /// Wire representation (`"auto"` or the code).
    pub fn as_str(&self) -> &str {
        self.code().unwrap_or(AUTO)
    }

    /// Whether this is the auto-detect sentinel.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a target-language tag, falling back to [`DEFAULT_LANGUAGE`] when blank.
pub fn target_or_default(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_auto_variants() {
        assert_eq!(SourceLanguage::parse("auto"), SourceLanguage::Auto);
        assert_eq!(SourceLanguage::parse("AUTO"), SourceLanguage::Auto);
        assert_eq!(SourceLanguage::parse(""), SourceLanguage::Auto);
        assert_eq!(SourceLanguage::parse("   "), SourceLanguage::Auto);
    }

    #[test]
    fn parse_explicit_code() {
        let lang = SourceLanguage::parse(" hi ");
        assert_eq!(lang, SourceLanguage::Code("hi".into()));
        assert_eq!(lang.code(), Some("hi"));
        assert!(!lang.is_auto());
    }

    #[test]
    fn display_matches_wire() {
        assert_eq!(SourceLanguage::Auto.to_string(), "auto");
        assert_eq!(SourceLanguage::Code("fr".into()).to_string(), "fr");
    }

    #[test]
    fn target_fallback() {
        assert_eq!(target_or_default(""), "en");
        assert_eq!(target_or_default("  "), "en");
        assert_eq!(target_or_default("es"), "es");
    }
}
