//! Template engine backed by external executables
//!
//! Fact box parsing and writing is done by two helper programs:
//! - `<extract> <page text>` prints the fact box parameters as a JSON object
//! - `<merge> <page text> <fields json>` prints the page with those fields set
//!
//! A non-zero exit status or empty output is a template engine error.

use iucn_common::{Error, FieldUpdate, RawFieldMap, Result, TemplateEngine};
use std::path::{Path, PathBuf};
use std::process::Command;

/// [`TemplateEngine`] that shells out to the extract/merge helpers
#[derive(Debug, Clone)]
pub struct CommandTemplateEngine {
    extract_command: PathBuf,
    merge_command: PathBuf,
}

impl CommandTemplateEngine {
    pub fn new(extract_command: impl Into<PathBuf>, merge_command: impl Into<PathBuf>) -> Self {
        Self {
            extract_command: extract_command.into(),
            merge_command: merge_command.into(),
        }
    }

    /// Run `program` with `args`; `failure` is the error text on any problem
    fn run(program: &Path, args: &[&str], failure: &str) -> Result<String> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            tracing::warn!(program = %program.display(), error = %e, "Template engine did not start");
            Error::TemplateEngine(failure.to_string())
        })?;

        if !output.status.success() {
            tracing::debug!(
                program = %program.display(),
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Template engine exited with error"
            );
            return Err(Error::TemplateEngine(failure.to_string()));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| Error::TemplateEngine(failure.to_string()))?;

        // Helpers print line by line; the final newline is not page content.
        let text = stdout.strip_suffix('\n').unwrap_or(&stdout);
        if text.is_empty() {
            return Err(Error::TemplateEngine(failure.to_string()));
        }

        Ok(text.to_string())
    }
}

impl TemplateEngine for CommandTemplateEngine {
    fn extract_fields(&self, document: &str) -> Result<RawFieldMap> {
        const FAILURE: &str = "Could not parse taxobox";

        let output = Self::run(&self.extract_command, &[document], FAILURE)?;
        let value: serde_json::Value = serde_json::from_str(&output)
            .map_err(|_| Error::TemplateEngine(FAILURE.to_string()))?;

        RawFieldMap::from_json(&value)
    }

    fn merge_fields(&self, document: &str, update: &FieldUpdate) -> Result<String> {
        const FAILURE: &str = "Could not update taxobox";

        let fields = serde_json::to_string(update)
            .map_err(|_| Error::TemplateEngine(FAILURE.to_string()))?;

        Self::run(&self.merge_command, &[document, &fields], FAILURE)
    }
}
