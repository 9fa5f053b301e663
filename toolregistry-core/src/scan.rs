//! Scan driver
//!
//! Probes each root, extracts candidates on blocking worker threads in
//! bounded batches, and upserts the results one at a time on the calling
//! task. The catalog only ever has one writer.

use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogStore};
use crate::config::RegistryConfig;
use crate::error::{ExtractionError, Result};
use crate::extract::MetadataExtractor;
use crate::probe::{Candidate, FileProbe};
use crate::record::ToolRecord;

/// Outcome of one scan pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Records written, placeholders included
    pub upserted: usize,
    /// Candidates whose extraction failed and got a placeholder
    pub degraded: usize,
    pub probe_errors: usize,
    /// Stale tools removed, by name
    pub removed: Vec<String>,
    /// Roots that did not exist
    pub missing_roots: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    probe: FileProbe,
    extractor: MetadataExtractor,
    workers: usize,
    prune_stale: bool,
}

impl Scanner {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            probe: FileProbe::new(&config.exclude),
            extractor: MetadataExtractor::new(config.max_read_bytes),
            workers: config.workers(),
            prune_stale: config.prune_stale,
        }
    }

    /// Scan `roots` into `catalog`.
    ///
    /// Probe and extraction failures are logged and counted. A store
    /// failure stops the scan; everything upserted before it stays.
    ///
    /// Pruning only touches tools found under a root that was listed in
    /// full. Entries that could not be read keep their records.
    pub async fn scan<S: CatalogStore>(
        &self,
        catalog: &mut Catalog<S>,
        roots: &[PathBuf],
    ) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let mut scanned_roots = Vec::new();
        let mut candidates = Vec::new();
        let mut unreadable: Vec<String> = Vec::new();

        for root in roots {
            let Ok(root) = root.canonicalize() else {
                warn!("Scan root does not exist, skipping: {}", root.display());
                report.missing_roots.push(root.clone());
                continue;
            };

            info!("Scanning {}", root.display());
            let mut listed = true;
            for item in self.probe.candidates(&root) {
                match item {
                    Ok(candidate) => candidates.push(candidate),
                    Err(err) => {
                        warn!("{}: {}", err, err.source);
                        report.probe_errors += 1;
                        match err.name {
                            Some(name) => unreadable.push(name),
                            None => listed = false,
                        }
                    }
                }
            }

            if listed {
                scanned_roots.push(root);
            } else {
                warn!(
                    "Could not list {}, its tools will not be pruned",
                    root.display()
                );
            }
        }

        debug!(
            "Found {} candidates, extracting with {} workers",
            candidates.len(),
            self.workers
        );

        let mut seen: HashSet<String> = HashSet::new();

        for batch in candidates.chunks(self.workers) {
            let tasks = batch.iter().cloned().map(|candidate| {
                let extractor = self.extractor.clone();
                tokio::task::spawn_blocking(move || extractor.extract(&candidate))
            });
            let results = join_all(tasks).await;

            for (candidate, joined) in batch.iter().zip(results) {
                let record = settle(candidate, joined, &mut report);

                if !seen.insert(record.name.clone()) {
                    warn!(
                        "Tool name {} appears under more than one root; keeping {}",
                        record.name,
                        record.path.display()
                    );
                }

                catalog.upsert(record)?;
                report.upserted += 1;
            }
        }

        if self.prune_stale && !scanned_roots.is_empty() {
            seen.extend(unreadable);
            for record in catalog.list_all() {
                if !under_any(record.scan_path(), &scanned_roots) {
                    seen.insert(record.name.clone());
                }
            }
            report.removed = catalog.remove_stale(&seen)?;
        }

        info!(
            "Scan complete: {} tools ({} degraded), {} probe errors, {} removed",
            report.upserted,
            report.degraded,
            report.probe_errors,
            report.removed.len()
        );

        Ok(report)
    }
}

/// Record for one finished extraction task; any failure becomes a placeholder
fn settle(
    candidate: &Candidate,
    joined: Result<Result<ToolRecord, ExtractionError>, JoinError>,
    report: &mut ScanReport,
) -> ToolRecord {
    let err = match joined {
        Ok(Ok(record)) => return record,
        Ok(Err(err)) => err.to_string(),
        Err(err) => format!("worker failed: {err}"),
    };
    warn!(
        "Extraction failed for {} ({}), recording placeholder",
        candidate.name, err
    );
    report.degraded += 1;
    placeholder(candidate)
}

fn placeholder(candidate: &Candidate) -> ToolRecord {
    let dir = candidate
        .dir
        .canonicalize()
        .unwrap_or_else(|_| candidate.dir.clone());
    let mut record = ToolRecord::placeholder(candidate.name.clone(), dir);
    record.found_at = Some(candidate.dir.clone());
    record
}

fn under_any(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tool(root: &Path, name: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{}.py", name.to_lowercase())),
            format!("\"\"\"{name} does things.\"\"\"\n"),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_scan_upserts_every_candidate() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["Alpha", "Beta", "Gamma"] {
            tool(temp_dir.path(), name);
        }

        let config = RegistryConfig {
            concurrency: 2,
            ..RegistryConfig::default()
        };
        let mut catalog = Catalog::in_memory();
        let report = Scanner::new(&config)
            .scan(&mut catalog, &[temp_dir.path().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(report.upserted, 3);
        assert_eq!(report.degraded, 0);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("Beta").unwrap().quality_score, 20);
    }

    #[tokio::test]
    async fn test_missing_root_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let mut catalog = Catalog::in_memory();
        let report = Scanner::new(&RegistryConfig::default())
            .scan(&mut catalog, &[missing.clone()])
            .await
            .unwrap();

        assert_eq!(report.upserted, 0);
        assert_eq!(report.missing_roots, vec![missing]);
    }

    #[tokio::test]
    async fn test_panicked_extraction_becomes_placeholder() {
        let candidate = Candidate {
            name: "Crashy".to_string(),
            dir: PathBuf::from("/tools/Crashy"),
            script: PathBuf::from("/tools/Crashy/crashy.py"),
        };
        let joined = tokio::task::spawn_blocking(|| -> Result<ToolRecord, ExtractionError> {
            panic!("extractor blew up")
        })
        .await;
        assert!(joined.is_err());

        let mut report = ScanReport::default();
        let record = settle(&candidate, joined, &mut report);
        assert_eq!(record.name, "Crashy");
        assert_eq!(record.quality_score, 10);
        assert_eq!(record.found_at, Some(candidate.dir.clone()));
        assert_eq!(report.degraded, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_entry_is_not_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tools");
        let elsewhere = temp_dir.path().join("elsewhere");
        fs::create_dir_all(&root).unwrap();
        tool(&root, "Fine");
        tool(&elsewhere, "Flaky");
        std::os::unix::fs::symlink(elsewhere.join("Flaky"), root.join("Flaky")).unwrap();

        let scanner = Scanner::new(&RegistryConfig::default());
        let mut catalog = Catalog::in_memory();
        scanner.scan(&mut catalog, &[root.clone()]).await.unwrap();
        assert_eq!(catalog.len(), 2);

        // Link still present but its target is unreadable
        fs::remove_dir_all(elsewhere.join("Flaky")).unwrap();
        let report = scanner.scan(&mut catalog, &[root]).await.unwrap();

        assert_eq!(report.probe_errors, 1);
        assert!(report.removed.is_empty());
        assert!(catalog.get("Flaky").is_some());
    }

    #[test]
    fn test_under_any() {
        let roots = vec![PathBuf::from("/a/tools")];
        assert!(under_any(Path::new("/a/tools/Foo"), &roots));
        assert!(!under_any(Path::new("/a/toolsx/Foo"), &roots));
        assert!(!under_any(Path::new("/b/Foo"), &roots));
    }
}
