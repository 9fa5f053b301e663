//! Text patterns over script and README contents
//!
//! Everything here is a pure function of the text it is given.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::is_stdlib;
use crate::record::DEFAULT_VERSION;

static META_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(author|created|version|license|date|updated|copyright|requires|maintainer)\s*:",
    )
    .unwrap()
});

static INLINE_AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bauthor:").unwrap());

static AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"Author:\s*(.+)").unwrap());

static VERSION_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:VERSION|__version__)\s*=\s*["']([^"']+)["']"#).unwrap()
});

static DOC_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*Version:\s*(\S+)").unwrap());

static ADD_PARSER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"add_parser\(\s*(?:name\s*=\s*)?['"]([\w-]+)['"]"#).unwrap()
});

static CHOICES: Lazy<Regex> = Lazy::new(|| Regex::new(r"choices\s*=\s*\[([^\]]+)\]").unwrap());

static QUOTED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"](\w+)['"]"#).unwrap());

static TEST_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:async\s+)?def\s+test_\w*\s*\(").unwrap());

static TOP_LEVEL_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^class\s+([A-Za-z_]\w*)").unwrap());

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:from[ \t]+([\w.]+)[ \t]+import\b|import[ \t]+([\w., \t]+))")
        .unwrap()
});

static GITHUB_REPO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)").unwrap()
});

/// The leading docstring of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Docstring<'a> {
    /// Text between the quotes
    pub text: &'a str,
    /// Byte offset just past the closing quotes
    pub end: usize,
}

/// First `"""` or `'''` block, allowing only blank and `#` lines before it
pub fn leading_docstring(source: &str) -> Option<Docstring<'_>> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            offset += line.len();
            continue;
        }
        break;
    }

    let rest = &source[offset..];
    let indent = rest.len() - rest.trim_start().len();
    let body = &rest[indent..];

    let quote = ["\"\"\"", "'''"]
        .into_iter()
        .find(|q| body.starts_with(q))?;

    let inner = &body[quote.len()..];
    let close = inner.find(quote)?;

    Some(Docstring {
        text: &inner[..close],
        end: offset + indent + quote.len() + close + quote.len(),
    })
}

/// First non-metadata line, cut before an inline `Author:`
pub fn description(doc: &str) -> String {
    for line in doc.lines() {
        let line = line.trim();
        if line.is_empty() || META_LINE.is_match(line) {
            continue;
        }
        let cut = match INLINE_AUTHOR.find(line) {
            Some(m) => &line[..m.start()],
            None => line,
        };
        let cut = cut.trim();
        if !cut.is_empty() {
            return cut.to_string();
        }
    }
    String::new()
}

pub fn author(doc: &str) -> String {
    AUTHOR
        .captures(doc)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Assigned version, then docstring `Version:`, then the default
pub fn version(source: &str, doc: Option<&str>) -> String {
    VERSION_ASSIGN
        .captures(source)
        .or_else(|| doc.and_then(|d| DOC_VERSION.captures(d)))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_VERSION.to_string())
}

/// `add_parser` names, then `choices=[...]` values, de-duplicated
pub fn cli_commands(source: &str) -> Vec<String> {
    let mut commands: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !commands.iter().any(|c| c == name) {
            commands.push(name.to_string());
        }
    };

    for caps in ADD_PARSER.captures_iter(source) {
        push(&caps[1]);
    }
    // choices lists on any add_argument call
    for list in CHOICES.captures_iter(source) {
        for caps in QUOTED_WORD.captures_iter(&list[1]) {
            push(&caps[1]);
        }
    }
    commands
}

/// Number of `def test_*` functions
pub fn test_count(source: &str) -> usize {
    TEST_FN.find_iter(source).count()
}

/// `from <module> import <Class>`, preferring a class named like the tool
pub fn python_api(module: &str, tool_name: &str, source: &str) -> Option<String> {
    let classes: Vec<&str> = TOP_LEVEL_CLASS
        .captures_iter(source)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    let class = classes
        .iter()
        .find(|c| c.eq_ignore_ascii_case(tool_name))
        .or_else(|| classes.first())?;

    Some(format!("from {module} import {class}"))
}

/// Third-party import roots in first-seen order.
///
/// `local_modules` are lowercase stems of the tool's own scripts.
pub fn dependencies(code: &str, local_modules: &[String]) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();

    for caps in IMPORT.captures_iter(code) {
        let modules: Vec<&str> = if let Some(from) = caps.get(1) {
            vec![from.as_str()]
        } else if let Some(list) = caps.get(2) {
            list.as_str()
                .split(',')
                .filter_map(|item| item.split_whitespace().next())
                .collect()
        } else {
            continue;
        };

        for module in modules {
            if module.starts_with('.') {
                continue;
            }
            let root = module.split('.').next().unwrap_or(module);
            if root.is_empty()
                || is_stdlib(root)
                || local_modules.iter().any(|l| l.eq_ignore_ascii_case(root))
                || deps.iter().any(|d| d == root)
            {
                continue;
            }
            deps.push(root.to_string());
        }
    }

    deps
}

/// First GitHub repository URL, preferring one whose repo is the tool name
pub fn github_url(readme: &str, tool_name: &str) -> Option<String> {
    let mut first = None;

    for caps in GITHUB_REPO.captures_iter(readme) {
        let owner = &caps[1];
        let mut repo = caps[2].trim_end_matches('.');
        if let Some(stripped) = repo.strip_suffix(".git") {
            repo = stripped;
        }
        if repo.is_empty() {
            continue;
        }

        let url = format!("https://github.com/{owner}/{repo}");
        if repo.eq_ignore_ascii_case(tool_name) {
            return Some(url);
        }
        if first.is_none() {
            first = Some(url);
        }
    }

    first
}
