//! Field value sanitizer
//!
//! Strips template noise, quotes and link brackets from a raw fact box
//! value so that `'''[[Raphus cucullatus]]''' {{†}}` reads as
//! `Raphus cucullatus`.

use regex::Regex;
use std::sync::OnceLock;

/// Straight and curly quote characters peeled off both ends
const QUOTES: &[char] = &['\'', '"', '‘', '’', '“', '”', '„'];

const BRACKETS: &[char] = &['[', ']'];

fn template_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Shortest match; nested templates leave residual braces behind.
    RE.get_or_init(|| Regex::new(r"(?s)\{\{.*?\}\}").expect("template regex"))
}

/// Clean a single raw field value
///
/// 1. Remove every `{{ ... }}` (shortest match, one left-to-right pass)
/// 2. Trim whitespace
/// 3. Trim quote characters
/// 4. Trim square brackets
///
/// Steps 2-4 repeat until none of them removes anything, so
/// `sanitize(sanitize(x)) == sanitize(x)` holds for every input.
pub fn sanitize(raw: &str) -> String {
    let stripped = template_regex().replace_all(raw, "");
    let mut value: &str = &stripped;

    loop {
        let trimmed = value
            .trim()
            .trim_matches(QUOTES)
            .trim_matches(BRACKETS);

        if trimmed.len() == value.len() {
            return trimmed.to_string();
        }
        value = trimmed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(sanitize("Example"), "Example");
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_removes_templates_and_link_syntax() {
        assert_eq!(sanitize("''[[Example]]'' {{†}}"), "Example");
        assert_eq!(sanitize("''[[Example]]''"), "Example");
        assert_eq!(sanitize("'''Hokus pokus'' {{Pilatus}}"), "Hokus pokus");
        assert_eq!(sanitize("  'Hokus Pokus'  "), "Hokus Pokus");
    }

    #[test]
    fn test_mangled_value() {
        assert_eq!(sanitize("'\"[[19]]\"\" {{!}}"), "19");
        assert_eq!(sanitize("'\"[[Raphus cucullatus]]\"\" {{†}}"), "Raphus cucullatus");
    }

    #[test]
    fn test_curly_quotes() {
        assert_eq!(sanitize("“kwetsbaar”"), "kwetsbaar");
        assert_eq!(sanitize("‘[[Dodo]]’"), "Dodo");
    }

    #[test]
    fn test_template_spanning_lines() {
        assert_eq!(sanitize("VU {{Citeer\n|jaar=2020}}"), "VU");
    }

    #[test]
    fn test_empty_template_removed() {
        assert_eq!(sanitize("{{}}VU"), "VU");
    }

    #[test]
    fn test_multiple_templates() {
        assert_eq!(sanitize("{{a}}LC{{b}} {{c}}"), "LC");
    }

    #[test]
    fn test_nested_template_leaves_residue() {
        // Single pass: the inner closing braces end the first match.
        assert_eq!(sanitize("{{outer|{{inner}}}} VU"), "}} VU");
    }

    #[test]
    fn test_interior_brackets_kept() {
        assert_eq!(
            sanitize("[[Raphus cucullatus]] (Linnaeus)"),
            "Raphus cucullatus]] (Linnaeus)"
        );
    }

    #[test]
    fn test_layers_in_any_order() {
        assert_eq!(sanitize("' [[a]] '"), "a");
        assert_eq!(sanitize(sanitize("' [[a]] '").as_str()), "a");
    }
}
