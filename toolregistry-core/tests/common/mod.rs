//! Shared helpers for integration tests
//!
//! Builds tool trees on disk the way real tool collections are laid out:
//! one directory per tool, a primary script, and optional README, tests,
//! examples and branding.

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Builder for one tool directory
pub struct ToolFixture {
    name: String,
    docstring: Option<String>,
    body: String,
    readme_lines: Option<usize>,
    tests: usize,
    examples: bool,
    branding: bool,
}

impl ToolFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            docstring: None,
            body: String::new(),
            readme_lines: None,
            tests: 0,
            examples: false,
            branding: false,
        }
    }

    pub fn docstring(mut self, doc: &str) -> Self {
        self.docstring = Some(doc.to_string());
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// README with exactly `lines` lines
    pub fn readme(mut self, lines: usize) -> Self {
        self.readme_lines = Some(lines);
        self
    }

    /// One test file holding `count` test functions
    pub fn tests(mut self, count: usize) -> Self {
        self.tests = count;
        self
    }

    pub fn examples(mut self) -> Self {
        self.examples = true;
        self
    }

    pub fn branding(mut self) -> Self {
        self.branding = true;
        self
    }

    /// Write the tool under `root`, returning its directory
    pub fn write(self, root: &Path) -> Result<PathBuf> {
        let dir = root.join(&self.name);
        fs::create_dir_all(&dir)?;

        let mut script = String::from("#!/usr/bin/env python3\n");
        if let Some(doc) = &self.docstring {
            script.push_str(&format!("\"\"\"{doc}\"\"\"\n"));
        }
        script.push_str(&self.body);
        fs::write(dir.join(format!("{}.py", self.name.to_lowercase())), script)?;

        if let Some(lines) = self.readme_lines {
            let mut readme = format!("# {}\n", self.name);
            for i in 1..lines {
                readme.push_str(&format!("line {i}\n"));
            }
            fs::write(dir.join("README.md"), readme)?;
        }

        if self.tests > 0 {
            let mut tests = String::new();
            for i in 0..self.tests {
                tests.push_str(&format!("def test_case_{i}():\n    assert True\n\n"));
            }
            fs::write(
                dir.join(format!("test_{}.py", self.name.to_lowercase())),
                tests,
            )?;
        }

        if self.examples {
            fs::write(dir.join("EXAMPLES.md"), "# Examples\n")?;
        }

        if self.branding {
            fs::create_dir_all(dir.join("branding"))?;
            fs::write(dir.join("branding").join("logo.svg"), "<svg/>")?;
        }

        Ok(dir)
    }
}
