//! Rule tables for category and capability inference
//!
//! Both tables are ordered; inferred tags come out in table order.

/// Category tag → trigger substrings (tag first, then synonyms)
pub const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "synapse",
        &["synapse", "message", "communication", "inbox", "notification"],
    ),
    (
        "monitoring",
        &["monitoring", "health", "watch", "monitor", "tracker", "stats", "analytics"],
    ),
    ("task", &["task", "queue", "todo", "flow", "schedule", "assign"]),
    ("memory", &["memory", "bridge", "context", "compress", "cache"]),
    ("config", &["config", "setting", "env", "environment"]),
    ("session", &["session", "replay", "record", "collab"]),
    (
        "security",
        &["security", "secure", "vault", "encrypt", "password", "auth"],
    ),
    ("file", &["file", "backup", "rename", "deduplicate", "clip"]),
    ("network", &["network", "net", "port", "scan", "ssh", "rest", "api"]),
    ("dev", &["dev", "git", "regex", "log", "data", "convert", "json"]),
    (
        "productivity",
        &["productivity", "time", "focus", "notes", "window", "screen"],
    ),
    ("routing", &["routing", "router", "route", "dispatch", "assign"]),
    ("utility", &["utility", "util", "helper", "misc"]),
];

/// Capability label → trigger substrings, matched against lowercased source
pub const CAPABILITY_RULES: &[(&str, &[&str])] = &[
    ("CLI interface", &["argparse", "cli"]),
    ("Python API", &["class "]),
    ("Persistent storage", &["sqlite", "database"]),
    ("JSON support", &["json"]),
    ("Async operations", &["async"]),
    ("Process execution", &["subprocess"]),
    ("File operations", &["pathlib", "os.path"]),
    ("Network operations", &["socket", "http"]),
];

/// Top-level standard library modules; imports of these are not dependencies
pub const STDLIB_MODULES: &[&str] = &[
    "abc", "argparse", "array", "ast", "asyncio", "atexit", "base64", "binascii", "bisect",
    "builtins", "bz2", "calendar", "cmath", "cmd", "codecs", "collections", "colorsys",
    "concurrent", "configparser", "contextlib", "contextvars", "copy", "csv", "ctypes",
    "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis", "email",
    "enum", "errno", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "getopt", "getpass", "gettext", "glob", "gzip", "hashlib", "heapq",
    "hmac", "html", "http", "imaplib", "importlib", "inspect", "io", "ipaddress",
    "itertools", "json", "keyword", "locale", "logging", "lzma", "mailbox", "math",
    "mimetypes", "mmap", "msvcrt", "multiprocessing", "numbers", "operator", "os",
    "pathlib", "pickle", "pkgutil", "platform", "plistlib", "pprint", "profile", "pstats",
    "pty", "pwd", "queue", "random", "re", "readline", "reprlib", "resource", "sched",
    "secrets", "select", "selectors", "shelve", "shlex", "shutil", "signal", "site",
    "smtplib", "socket", "socketserver", "sqlite3", "ssl", "stat", "statistics", "string",
    "struct", "subprocess", "sys", "sysconfig", "syslog", "tarfile", "tempfile", "termios",
    "textwrap", "threading", "time", "timeit", "tkinter", "token", "tokenize", "tomllib",
    "trace", "traceback", "tracemalloc", "tty", "turtle", "types", "typing", "unicodedata",
    "unittest", "urllib", "uuid", "venv", "warnings", "wave", "weakref", "webbrowser",
    "winreg", "winsound", "wsgiref", "xml", "xmlrpc", "zipfile", "zipimport", "zlib",
    "zoneinfo",
];

/// Tags whose triggers occur in `text`, in vocabulary order.
///
/// `text` must already be lowercase.
pub fn categories_for(text: &str) -> Vec<String> {
    CATEGORY_RULES
        .iter()
        .filter(|(_, triggers)| triggers.iter().any(|t| text.contains(t)))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// Capabilities whose triggers occur in the lowercased script
pub fn capabilities_for(source_lower: &str) -> Vec<String> {
    CAPABILITY_RULES
        .iter()
        .filter(|(_, triggers)| triggers.iter().any(|t| source_lower.contains(t)))
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Trigger list for a tag, empty for tags outside the vocabulary
pub fn category_triggers(tag: &str) -> &'static [&'static str] {
    CATEGORY_RULES
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(tag))
        .map(|(_, triggers)| *triggers)
        .unwrap_or(&[])
}

pub fn is_stdlib(module: &str) -> bool {
    module == "__future__" || STDLIB_MODULES.contains(&module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_triggers_itself() {
        for (tag, triggers) in CATEGORY_RULES {
            assert!(
                triggers.iter().any(|t| tag.contains(t)),
                "tag {tag} is not matched by its own triggers"
            );
        }
    }

    #[test]
    fn test_categories_in_vocabulary_order() {
        let cats = categories_for("synapselink sends a message and tracks tasks");
        assert_eq!(cats, vec!["synapse", "task"]);
    }

    #[test]
    fn test_no_fallback_category() {
        assert!(categories_for("zzz qqq").is_empty());
    }

    #[test]
    fn test_capabilities() {
        let source = "import argparse\nimport subprocess\nclass Foo:\n    pass\n";
        assert_eq!(
            capabilities_for(source),
            vec!["CLI interface", "Python API", "Process execution"]
        );
    }

    #[test]
    fn test_category_triggers_lookup() {
        assert!(category_triggers("Synapse").contains(&"message"));
        assert!(category_triggers("nonexistent").is_empty());
    }

    #[test]
    fn test_stdlib() {
        assert!(is_stdlib("os"));
        assert!(is_stdlib("__future__"));
        assert!(!is_stdlib("requests"));
    }
}
