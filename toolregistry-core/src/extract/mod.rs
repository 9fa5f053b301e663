//! Metadata extraction
//!
//! Builds a `ToolRecord` from one candidate's files. Missing or malformed
//! metadata degrades to defaults; only a failed read is an error.

mod patterns;
pub mod rules;

use chrono::{DateTime, Utc};
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

use crate::config::DEFAULT_MAX_READ_BYTES;
use crate::error::ExtractionError;
use crate::probe::{Candidate, ToolFiles};
use crate::record::ToolRecord;

/// Turns candidates into records
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    max_read_bytes: u64,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_READ_BYTES)
    }
}

impl MetadataExtractor {
    pub fn new(max_read_bytes: u64) -> Self {
        Self { max_read_bytes }
    }

    /// Extract and score a record for `candidate`
    pub fn extract(&self, candidate: &Candidate) -> Result<ToolRecord, ExtractionError> {
        let dir = candidate
            .dir
            .canonicalize()
            .map_err(|source| ExtractionError::Io {
                path: candidate.dir.clone(),
                source,
            })?;
        let files = ToolFiles::locate(&candidate.dir, &candidate.script)?;
        let mut newest = Newest::default();

        let source = self.read(&candidate.script, &mut newest)?;
        let docstring = patterns::leading_docstring(&source);
        let doc_text = docstring.map(|d| d.text);
        let code = docstring.map(|d| &source[d.end..]).unwrap_or(&source);

        let mut record = ToolRecord::placeholder(candidate.name.clone(), dir);
        record.found_at = Some(candidate.dir.clone());
        record.description = doc_text.map(patterns::description).unwrap_or_default();
        record.author = doc_text.map(patterns::author).unwrap_or_default();
        record.version = patterns::version(&source, doc_text);
        record.cli_commands = patterns::cli_commands(&source);
        record.dependencies = patterns::dependencies(code, &files.local_modules);

        let module = candidate
            .script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| candidate.name.to_lowercase());
        record.python_api = patterns::python_api(&module, &candidate.name, &source);

        let category_text = format!("{} {}", candidate.name, record.description).to_lowercase();
        record.categories = rules::categories_for(&category_text);
        record.capabilities = rules::capabilities_for(&source.to_lowercase());

        if let Some(readme_path) = &files.readme {
            let readme = self.read(readme_path, &mut newest)?;
            record.has_readme = true;
            record.readme_lines = readme.lines().count();
            record.github_url = patterns::github_url(&readme, &candidate.name);
        }

        for test_file in &files.test_files {
            let content = self.read(test_file, &mut newest)?;
            record.test_count += patterns::test_count(&content);
        }
        record.has_tests = !files.test_files.is_empty();

        if let Some(examples) = &files.examples {
            newest.observe(examples);
            record.has_examples = true;
        }
        record.has_branding = files.branding.is_some();

        record.last_modified = newest.into_datetime();
        record.rescore();

        debug!(
            "Extracted {} v{} (score {}, {} categories)",
            record.name,
            record.version,
            record.quality_score,
            record.categories.len()
        );

        Ok(record)
    }

    fn read(&self, path: &Path, newest: &mut Newest) -> Result<String, ExtractionError> {
        let content = read_capped(path, self.max_read_bytes)?;
        newest.observe(path);
        Ok(content)
    }
}

/// Read at most `max_bytes` of a UTF-8 file.
///
/// A character split by the cap is dropped; invalid UTF-8 anywhere else is
/// an `Encoding` error.
pub fn read_capped(path: &Path, max_bytes: u64) -> Result<String, ExtractionError> {
    let io_err = |source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.take(max_bytes)
        .read_to_end(&mut bytes)
        .map_err(io_err)?;

    let truncated = bytes.len() as u64 == max_bytes;
    if truncated {
        trace!("Read of {} capped at {} bytes", path.display(), max_bytes);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let utf8 = err.utf8_error();
            if truncated && utf8.error_len().is_none() {
                let valid = utf8.valid_up_to();
                let mut bytes = err.into_bytes();
                bytes.truncate(valid);
                String::from_utf8(bytes).map_err(|_| ExtractionError::Encoding {
                    path: path.to_path_buf(),
                })
            } else {
                Err(ExtractionError::Encoding {
                    path: path.to_path_buf(),
                })
            }
        }
    }
}

/// Tracks the newest mtime across files read
#[derive(Default)]
struct Newest(Option<DateTime<Utc>>);

impl Newest {
    fn observe(&mut self, path: &Path) {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from);
        if let Ok(modified) = modified {
            if self.0.map_or(true, |current| modified > current) {
                self.0 = Some(modified);
            }
        }
    }

    fn into_datetime(self) -> DateTime<Utc> {
        self.0.unwrap_or_else(Utc::now)
    }
}
