//! Tool directory probing
//!
//! Finds candidate tool directories exactly one level beneath a root and the
//! files inside each one that extraction cares about. No file contents are
//! read here.
//!
//! A directory is a tool when it contains `<dirname>.<ext>` (any case) or
//! `main.<ext>` for a recognized script extension. Tools are assumed flat:
//! nothing below the first level of a root is visited.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{ExtractionError, ProbeError};

/// Extensions a primary script may carry
pub const SCRIPT_EXTENSIONS: &[&str] = &["py"];

/// Stem of the fallback entry point
const MAIN_STEM: &str = "main";

const README_NAMES: &[&str] = &["readme", "readme.md", "readme.rst", "readme.txt"];

const BRANDING_DIR: &str = "branding";

const TESTS_DIR: &str = "tests";

/// A directory that qualified as a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Directory name, used as the tool name
    pub name: String,
    /// Tool directory
    pub dir: PathBuf,
    /// Primary script
    pub script: PathBuf,
}

/// Walks roots for candidates
#[derive(Debug, Clone)]
pub struct FileProbe {
    excluded: Vec<String>,
}

impl FileProbe {
    pub fn new<S: AsRef<str>>(excluded: &[S]) -> Self {
        Self {
            excluded: excluded.iter().map(|s| s.as_ref().to_lowercase()).collect(),
        }
    }

    /// True for hidden, `_`-prefixed and configured names
    pub fn is_excluded(&self, name: &str) -> bool {
        name.starts_with('.')
            || name.starts_with('_')
            || self.excluded.iter().any(|e| e.eq_ignore_ascii_case(name))
    }

    /// Lazily yield every candidate directly under `root`, in name order.
    ///
    /// Unreadable entries come through as `Err` so the caller can log them
    /// and keep going. Calling this again restarts the walk.
    pub fn candidates<'a>(
        &'a self,
        root: &Path,
    ) -> impl Iterator<Item = Result<Candidate, ProbeError>> + 'a {
        let root_path = root.to_path_buf();
        WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !self.is_excluded(name))
                    .unwrap_or(false)
            })
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    match find_primary_script(entry.path()) {
                        Ok(Some(script)) => Some(Ok(Candidate {
                            name: entry.file_name().to_string_lossy().into_owned(),
                            dir: entry.path().to_path_buf(),
                            script,
                        })),
                        Ok(None) => {
                            trace!("Not a tool directory: {}", entry.path().display());
                            None
                        }
                        Err(source) => Some(Err(ProbeError {
                            path: entry.path().to_path_buf(),
                            name: Some(entry.file_name().to_string_lossy().into_owned()),
                            source,
                        })),
                    }
                }
                Ok(_) => None,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root_path.clone());
                    let name = if err.depth() > 0 {
                        path.file_name().map(|n| n.to_string_lossy().into_owned())
                    } else {
                        None
                    };
                    Some(Err(ProbeError {
                        path,
                        name,
                        source: err.into(),
                    }))
                }
            })
    }
}

/// `<dirname>.<ext>` wins over `main.<ext>`; both case-insensitive
pub fn find_primary_script(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };

    let mut named = None;
    let mut main = None;

    for file in sorted_files(dir)? {
        let Some((stem, ext)) = split_name(&file) else {
            continue;
        };
        if !SCRIPT_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
            continue;
        }
        if named.is_none() && stem.eq_ignore_ascii_case(dir_name) {
            named = Some(file);
        } else if main.is_none() && stem.eq_ignore_ascii_case(MAIN_STEM) {
            main = Some(file);
        }
    }

    Ok(named.or(main))
}

/// Files inside one tool directory that feed extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFiles {
    pub readme: Option<PathBuf>,
    /// Test files in the tool directory and its `tests/` subdirectory
    pub test_files: Vec<PathBuf>,
    pub examples: Option<PathBuf>,
    /// Present only when the directory has at least one entry
    pub branding: Option<PathBuf>,
    /// Stems of the tool's own script files, for telling local imports apart
    pub local_modules: Vec<String>,
}

impl ToolFiles {
    pub fn locate(dir: &Path, script: &Path) -> Result<Self, ExtractionError> {
        let io_err = |source| ExtractionError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = ToolFiles::default();

        for file in sorted_files(dir).map_err(io_err)? {
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let lower = name.to_lowercase();

            if files.readme.is_none() && README_NAMES.contains(&lower.as_str()) {
                files.readme = Some(file.clone());
            }

            if files.examples.is_none() && file_stem_lower(&file).as_deref() == Some("examples")
            {
                files.examples = Some(file.clone());
            }

            if is_script(&file) {
                if file != script && lower.contains("test") {
                    files.test_files.push(file.clone());
                }
                if let Some(stem) = file_stem_lower(&file) {
                    files.local_modules.push(stem);
                }
            }
        }

        let tests_dir = dir.join(TESTS_DIR);
        if tests_dir.is_dir() {
            for file in sorted_files(&tests_dir).map_err(io_err)? {
                let lower = file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if is_script(&file) && lower.contains("test") {
                    files.test_files.push(file);
                }
            }
        }

        let branding = dir.join(BRANDING_DIR);
        if branding.is_dir() {
            let mut entries = std::fs::read_dir(&branding).map_err(io_err)?;
            if entries.next().is_some() {
                files.branding = Some(branding);
            }
        }

        debug!(
            "Located files in {}: readme={}, tests={}, examples={}, branding={}",
            dir.display(),
            files.readme.is_some(),
            files.test_files.len(),
            files.examples.is_some(),
            files.branding.is_some()
        );

        Ok(files)
    }
}

/// Regular files directly inside `dir`, sorted by path
fn sorted_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn split_name(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some((stem.to_string(), ext.to_string()))
}

fn file_stem_lower(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_lowercase)
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SCRIPT_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
