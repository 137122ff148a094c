//! Edit guard
//!
//! Pages opting out of bot edits (`{{nobots}}`, `{{bots|deny=all}}`),
//! nominated for deletion, or marked as being worked on must be left alone.

use regex::RegexSet;
use std::sync::OnceLock;

fn deny_templates() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new([
            r"(?i)\{\{\s*nobots",
            r"(?i)\{\{\s*bots\s*\|\s*deny\s*=\s*all",
            r"(?i)\{\{\s*nuweg",
            r"(?i)\{\{\s*speedy",
            r"(?i)\{\{\s*delete",
            r"(?i)\{\{\s*mee\s?bezig",
            r"(?i)\{\{\s*wiu",
        ])
        .expect("edit guard regex set")
    })
}

/// True unless the page carries a template that forbids bot edits
pub fn is_edit_allowed(document: &str) -> bool {
    !deny_templates().is_match(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_page_allowed() {
        assert!(is_edit_allowed("Hello World"));
        assert!(is_edit_allowed("{{}}"));
        assert!(is_edit_allowed("{{Taxobox\n| status = VU\n}}"));
    }

    #[test]
    fn test_denied_pages() {
        for page in [
            "{{Meebezig}}",
            "{{Meebezig}} De \"Dodo\" is een dode vogel",
            "{{meebezig}}, De \"dodo\" is een vogel",
            "{{ mee bezig }}",
            "{{ meebezig }}",
            "{{ bots | deny = all}}",
            "{{\nbots\n|deny = all}}",
            "{{nobots}}",
            "{{nuweg|}}",
            "{{NUWEG}}",
            "{{ nuweg }}",
            "{{speedy}}",
            "{{delete|reden}}",
            "{{ wiu }}",
            "{{ wiu2}}",
        ] {
            assert!(!is_edit_allowed(page), "{page:?}");
        }
    }

    #[test]
    fn test_bots_allow_list_is_editable() {
        assert!(is_edit_allowed("{{bots|allow=IUCNBot}}"));
    }
}
