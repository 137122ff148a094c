//! Skip-list persistence across runs

use iucn_bot::services::AssessedPages;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_marked_pages_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".page_cache");

    let mut pages = AssessedPages::open(&path).unwrap();
    pages.mark_assessed("Dodo").unwrap();
    pages.mark_assessed("Kwagga").unwrap();
    drop(pages);

    let reopened = AssessedPages::open(&path).unwrap();
    assert!(reopened.is_assessed("Dodo"));
    assert!(reopened.is_assessed("Kwagga"));
    assert!(!reopened.is_assessed("Draak"));
    assert_eq!(reopened.len(), 2);
}

#[test]
fn test_reads_legacy_leading_newline_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".page_cache");
    fs::write(&path, "\nDodo\nKwagga").unwrap();

    let mut pages = AssessedPages::open(&path).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(!pages.is_assessed(""));

    pages.mark_assessed("Draak").unwrap();
    let reopened = AssessedPages::open(&path).unwrap();
    assert!(reopened.is_assessed("Kwagga"));
    assert!(reopened.is_assessed("Draak"));
}

#[test]
fn test_titles_are_exact() {
    let dir = TempDir::new().unwrap();
    let mut pages = AssessedPages::open(dir.path().join(".page_cache")).unwrap();
    pages.mark_assessed("Dodo").unwrap();

    assert!(!pages.is_assessed("dodo"));
    assert!(!pages.is_assessed("Dodo (vogel)"));
}
