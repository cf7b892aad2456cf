//! Fixed rule tables for the security policy.

use std::sync::LazyLock;

use regex::Regex;

/// Window classes that are never exposed to agents (compared lowercase).
pub const SENSITIVE_CLASSES: [&str; 5] = [
    "keepassxc",
    "bitwarden",
    "1password",
    "firefox-private",
    // Bitwarden browser extension popup
    "crx_nngceckbapebfimnlniiiahkandclblb",
];

/// Title keywords that hide a window (case-insensitive substring match).
pub const SENSITIVE_TITLES: [&str; 7] = [
    "password",
    "bank",
    "login",
    "signin",
    "sign in",
    "private browsing",
    "incognito",
];

/// Ordered `(description, regex)` table of dangerous shell constructs.
const DANGEROUS_INPUT: [(&str, &str); 9] = [
    ("sudo", r"\bd?sudo\s+"),
    ("doas", r"\bdoas\s+"),
    ("su", r"\bsu(?:\s|$)"),
    ("rm -rf", r"(?i)\brm\s+-[a-z]*(?:r[a-z]*f|f[a-z]*r)"),
    ("rm --no-preserve-root", r"\brm\s+.*--no-preserve-root"),
    ("fork bomb", r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:"),
    ("mkfs", r"\bmkfs\b"),
    ("dd if=", r"\bdd\s+if="),
    ("raw block device write", r">\s*/dev/(?:sd|hd|vd|nvme|mmcblk)"),
];

/// A compiled dangerous-input pattern.
#[derive(Debug)]
pub struct InputPattern {
    /// Human-readable name surfaced in rejections.
    pub description: &'static str,
    regex: Regex,
}

impl InputPattern {
    /// Returns whether the pattern occurs anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool { self.regex.is_match(text) }

    /// The source regular expression.
    #[must_use]
    pub fn as_str(&self) -> &str { self.regex.as_str() }
}

#[allow(clippy::expect_used)] // Table entries are compile-time literals
static PATTERNS: LazyLock<Vec<InputPattern>> = LazyLock::new(|| {
    DANGEROUS_INPUT
        .into_iter()
        .map(|(description, source)| InputPattern {
            description,
            regex: Regex::new(source).expect("dangerous-input table holds valid regexes"),
        })
        .collect()
});

/// Returns the compiled dangerous-input patterns in evaluation order.
#[must_use]
pub fn input_patterns() -> &'static [InputPattern] { &PATTERNS }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile_in_order() {
        let patterns = input_patterns();
        assert_eq!(patterns.len(), DANGEROUS_INPUT.len());
        for (pattern, (description, source)) in patterns.iter().zip(DANGEROUS_INPUT) {
            assert_eq!(pattern.description, description);
            assert_eq!(pattern.as_str(), source);
        }
    }

    #[test]
    fn test_tables_are_lowercase() {
        for class in SENSITIVE_CLASSES {
            assert_eq!(class, class.to_lowercase());
        }
        for keyword in SENSITIVE_TITLES {
            assert_eq!(keyword, keyword.to_lowercase());
        }
    }
}
