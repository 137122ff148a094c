//! Skip-list of pages handled in earlier runs
//!
//! One title per line in a plain text file, appended as pages are
//! finished. Blank lines are ignored. Lets an interrupted run pick up
//! where it stopped.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default skip-list file, relative to the working directory
pub const DEFAULT_SKIP_LIST: &str = ".page_cache";

/// Set of already assessed page titles backed by an append-only file
#[derive(Debug)]
pub struct AssessedPages {
    path: PathBuf,
    titles: HashSet<String>,
}

impl AssessedPages {
    /// Load the skip-list at `path`, creating an empty file if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "")?;
        }

        let titles = fs::read_to_string(&path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { path, titles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_assessed(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Record `title` in memory and on disk
    pub fn mark_assessed(&mut self, title: &str) -> io::Result<()> {
        if self.titles.contains(title) {
            return Ok(());
        }

        // Leading separator: the last line may lack a newline.
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        write!(file, "\n{}", title)?;

        self.titles.insert(title.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join(DEFAULT_SKIP_LIST);

        let pages = AssessedPages::open(&path).unwrap();
        assert!(path.exists());
        assert!(pages.is_empty());
    }

    #[test]
    fn test_mark_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_SKIP_LIST);

        let mut pages = AssessedPages::open(&path).unwrap();
        pages.mark_assessed("Dodo").unwrap();
        pages.mark_assessed("Dodo").unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "\nDodo");
    }
}
