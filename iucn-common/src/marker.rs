//! Classification marker rewriter
//!
//! A species page carries one `[[Categorie:IUCN-status <phrase>]]` link.
//! Rewriting drops every such link, whatever status it names and wherever
//! it sits, and appends the link for the current status as the last line.

use crate::status::StatusCode;
use regex::Regex;
use std::sync::OnceLock;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let phrases = StatusCode::ALL
            .iter()
            .map(|code| regex::escape(code.category_phrase()))
            .collect::<Vec<_>>()
            .join("|");

        // Indentation goes with a marker that starts its line.
        Regex::new(&format!(
            r"(?im)(?:^[ \t]+)?\[\[\s*Categor(?:ie|y)\s*:\s*IUCN-status\s+({})\s*\]\][ \t]*(?:\r?\n)?",
            phrases
        ))
        .expect("marker regex")
    })
}

/// Replace all classification markers in `document` with the one for `code`
///
/// Only matched marker text (plus its indentation when it starts a line and
/// at most one trailing line break) is removed; other lines keep their
/// content and order. Trailing line breaks are trimmed before the new
/// marker is appended on its own line, so the rewrite is idempotent.
pub fn rewrite_marker(document: &str, code: StatusCode) -> String {
    let mut text = document.to_string();

    // Removing one marker can splice a new one together out of its
    // neighbours, so repeat until none is left.
    while marker_regex().is_match(&text) {
        text = marker_regex().replace_all(&text, "").into_owned();
    }

    let mut rewritten = text.trim_end_matches('\n').to_string();
    rewritten.push('\n');
    rewritten.push_str(&code.category_link());
    rewritten
}

/// Codes named by the classification markers present in `document`, in order
pub fn markers(document: &str) -> Vec<StatusCode> {
    marker_regex()
        .captures_iter(document)
        .filter_map(|caps| {
            let phrase = caps.get(1)?.as_str();
            StatusCode::ALL
                .into_iter()
                .find(|code| code.category_phrase().eq_ignore_ascii_case(phrase))
        })
        .collect()
}
