//! Integration tests for the toolregistry binary

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Output;
use tempfile::TempDir;

struct Workspace {
    _temp: TempDir,
    tools: PathBuf,
    config: PathBuf,
    catalog: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        fs::create_dir_all(&tools).unwrap();
        let config = temp.path().join("config.yaml");
        let catalog = temp.path().join("registry.json");
        Self {
            _temp: temp,
            tools,
            config,
            catalog,
        }
    }

    fn add_tool(&self, name: &str, script: &str) -> PathBuf {
        let dir = self.tools.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.py", name.to_lowercase())), script).unwrap();
        dir
    }

    fn run(&self, args: &[&str]) -> Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_toolregistry"))
            .arg("--config")
            .arg(&self.config)
            .arg("--catalog")
            .arg(&self.catalog)
            .args(args)
            .output()
            .expect("Failed to run toolregistry")
    }

    fn scan(&self) {
        let tools = self.tools.to_string_lossy().into_owned();
        let output = self.run(&["scan", "--path", &tools]);
        assert!(
            output.status.success(),
            "scan failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn seeded() -> Workspace {
    let ws = Workspace::new();
    ws.add_tool("SynapseLink", "\"\"\"Send a message to another agent\"\"\"\n");
    let task = ws.add_tool("TaskQueuePro", "\"\"\"Priority task queue\"\"\"\n");
    fs::write(task.join("README.md"), "# TaskQueuePro\n").unwrap();
    ws.scan();
    ws
}

#[test]
fn test_scan_then_list_json() {
    let ws = seeded();
    let listed = stdout_json(&ws.run(&["list", "--json"]));
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    // TaskQueuePro has a README and scores higher
    assert_eq!(names, vec!["TaskQueuePro", "SynapseLink"]);
}

#[test]
fn test_catalog_persists_between_invocations() {
    let ws = seeded();
    assert!(ws.catalog.exists());

    let info = stdout_json(&ws.run(&["info", "synapselink", "--json"]));
    assert_eq!(info["name"], "SynapseLink");
    assert_eq!(info["quality_score"], 20);
    assert_eq!(info["categories"][0], "synapse");
}

#[test]
fn test_info_unknown_tool_fails() {
    let ws = seeded();
    let output = ws.run(&["info", "DoesNotExist"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Tool not found: DoesNotExist"));
}

#[test]
fn test_search_json() {
    let ws = seeded();
    let results = stdout_json(&ws.run(&["search", "queue", "--json"]));
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "TaskQueuePro");
}

#[test]
fn test_health_json() {
    let ws = seeded();
    let health = stdout_json(&ws.run(&["health", "--json"]));
    assert_eq!(health["total_tools"], 2);
    assert_eq!(health["readme_coverage"], 0.5);
}

#[test]
fn test_export_markdown_to_file() {
    let ws = seeded();
    let out = ws.tools.parent().unwrap().join("registry.md");
    let out_str = out.to_string_lossy().into_owned();

    let output = ws.run(&["export", "--format", "md", "--output", &out_str]);
    assert!(output.status.success());

    let markdown = fs::read_to_string(&out).unwrap();
    assert!(markdown.contains("## Synapse (1 tool)"));
    assert!(markdown.contains("## Task (1 tool)"));
}

#[test]
fn test_scan_without_paths_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["scan"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No scan paths given"));
}

#[test]
fn test_scan_paths_from_config() {
    let ws = Workspace::new();
    ws.add_tool("Solo", "\"\"\"Solo tool\"\"\"\n");
    fs::write(
        &ws.config,
        format!("scan_paths:\n  - {}\n", ws.tools.display()),
    )
    .unwrap();

    assert!(ws.run(&["scan"]).status.success());
    let listed = stdout_json(&ws.run(&["list", "--json"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_launch_passes_exit_code_and_records_usage() {
    let ws = Workspace::new();
    ws.add_tool("Exiter", "exit 3\n");
    fs::write(&ws.config, "interpreter: sh\n").unwrap();
    ws.scan();

    let output = ws.run(&["launch", "Exiter"]);
    assert_eq!(output.status.code(), Some(3));

    let stats = ws.run(&["stats", "--tool", "Exiter"]);
    let text = String::from_utf8_lossy(&stats.stdout);
    assert!(text.contains("Total uses:   1"), "{text}");
    assert!(text.contains("Successful:   0"), "{text}");
}

#[test]
fn test_recommend_prints_matches() {
    let ws = seeded();
    let output = ws.run(&["recommend", "deliver a message to an agent"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("SynapseLink"));
}

