use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn claude_tree(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("claude-tree").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("CLAUDE_TREE_TOKENIZER")
        .env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

/// At least one BPE token per word.
fn words(n: usize) -> String {
    vec!["hello"; n].join(" ")
}

fn doc_tokens(tree: &Value, path: &str) -> u64 {
    tree["agentDocs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|doc| doc["path"] == path)
        .and_then(|doc| doc["tokens"].as_u64())
        .unwrap_or_else(|| panic!("no agent doc {path}"))
}

/// `a/CLAUDE.md` and `a/b/AGENTS.md` together sit past the default
/// yellow ceiling.
fn setup_project() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path().join("proj");
    write(&root, "a/CLAUDE.md", &words(800));
    write(&root, "a/b/AGENTS.md", &words(1_200));
    write(&root, "a/b/main.rs", "fn main() {}");
    write(&root, "c/notes.txt", "no docs here");
    write(&root, "node_modules/pkg/CLAUDE.md", "ignored");
    temp
}

#[test]
fn tree_writes_filtered_artifact_and_summary() {
    let temp = setup_project();
    let out = temp.path().join("out/tree.json");

    claude_tree(temp.path())
        .arg("tree")
        .arg("proj")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Agent docs found:"))
        .stderr(predicate::str::contains("a/CLAUDE.md ("))
        .stderr(predicate::str::contains("Tree written to:"));

    let tree = read_json(&out);
    assert_eq!(tree["totalAgentDocs"], 2);
    let claude = doc_tokens(&tree, "a/CLAUDE.md");
    let agents = doc_tokens(&tree, "a/b/AGENTS.md");
    assert!(claude >= 800 && agents >= 1_200, "{claude} {agents}");
    assert_eq!(tree["totalTokens"], claude + agents);
    assert_eq!(tree["agentDocs"][0]["path"], "a/CLAUDE.md");
    assert_eq!(tree["agentDocs"][1]["path"], "a/b/AGENTS.md");
    assert_eq!(tree["tree"]["path"], ".");
    let top: Vec<_> = tree["tree"]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|child| child["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(top, vec!["a"]);
}

#[test]
fn tree_without_docs_reports_none() {
    let temp = tempdir().unwrap();
    write(temp.path(), "proj/src/lib.rs", "pub fn f() {}");

    let output = claude_tree(temp.path())
        .args(["tree", "proj"])
        .assert()
        .success()
        .stderr(predicate::str::contains("(none)"))
        .get_output()
        .stdout
        .clone();

    let tree: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(tree["totalAgentDocs"], 0);
    assert_eq!(tree["agentDocs"], Value::Array(Vec::new()));
}

#[test]
fn tree_warns_about_docs_over_budget() {
    let temp = tempdir().unwrap();
    write(temp.path(), "proj/CLAUDE.md", &words(2_000));

    claude_tree(temp.path())
        .args(["tree", "proj"])
        .assert()
        .success()
        .stderr(predicate::str::contains("exceed the 1,500-token budget"));
}

#[test]
fn tree_on_missing_root_fails() {
    let temp = tempdir().unwrap();

    claude_tree(temp.path())
        .args(["tree", "does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn tree_honors_config_skip_dirs() {
    let temp = setup_project();
    write(
        temp.path(),
        "proj/.claude-tree.toml",
        "[scan]\nextra_skip_dirs = [\"b\"]\n",
    );

    let output = claude_tree(temp.path())
        .args(["tree", "proj"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let tree: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["totalAgentDocs"], 1);
    assert_eq!(tree["totalTokens"], doc_tokens(&tree, "a/CLAUDE.md"));
}

#[test]
fn merge_counts_invalid_files_and_exits_nonzero() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "edges/a.json",
        r#"{"source":"CLAUDE.md","edges":[{"source":"CLAUDE.md","target":"src","type":"directory"}]}"#,
    );
    write(
        temp.path(),
        "edges/b.json",
        r#"{"source":"a/CLAUDE.md","edges":[{"source":"a/CLAUDE.md","target":"a/x.rs","type":"file"}]}"#,
    );
    write(temp.path(), "edges/c.json", r#"{"source":"broken.md"}"#);
    let out = temp.path().join("merged/edges.json");

    claude_tree(temp.path())
        .args(["merge", "--input-dir", "edges", "--validate", "--output"])
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Files processed: 3"))
        .stderr(predicate::str::contains("Valid files: 2"))
        .stderr(predicate::str::contains("Invalid files: 1"))
        .stderr(predicate::str::contains("Missing 'edges' field"));

    let merged = read_json(&out);
    let targets: Vec<_> = merged["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|edge| edge["target"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(targets, vec!["src", "a/x.rs"]);
}

#[test]
fn merge_of_valid_files_succeeds() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "edges/only.json",
        r#"{"source":"CLAUDE.md","edges":[]}"#,
    );

    claude_tree(temp.path())
        .args(["merge", "-i", "edges", "-o", "merged.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Total edges: 0"));

    assert_eq!(
        read_json(&temp.path().join("merged.json")),
        serde_json::json!({"edges": []})
    );
}

#[test]
fn merge_with_missing_input_dir_fails() {
    let temp = tempdir().unwrap();

    claude_tree(temp.path())
        .args(["merge", "-i", "nowhere", "-o", "merged.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory does not exist"));
    assert!(!temp.path().join("merged.json").exists());
}

#[test]
fn weights_rank_paths_per_filter() {
    let temp = setup_project();
    claude_tree(temp.path())
        .args(["tree", "proj", "-o", "tree.json"])
        .assert()
        .success();

    claude_tree(temp.path())
        .args(["weights", "--tree", "tree.json", "-o", "weights.json"])
        .assert()
        .success();
    let tree = read_json(&temp.path().join("tree.json"));
    let claude = doc_tokens(&tree, "a/CLAUDE.md");
    let agents = doc_tokens(&tree, "a/b/AGENTS.md");

    let all = read_json(&temp.path().join("weights.json"));
    assert_eq!(all["pathWeights"]["a/b"], claude + agents);
    assert_eq!(all["pathWeights"]["a"], claude);
    assert_eq!(all["ranking"][0]["path"], "a/b");
    assert_eq!(all["ranking"][0]["cumulativeTokens"], claude + agents);
    assert_eq!(all["metadata"]["maxPathWeight"], claude + agents);
    assert_eq!(all["metadata"]["docTypeFilter"], "all");

    let output = claude_tree(temp.path())
        .args(["weights", "--tree", "tree.json", "--doc-type", "claude"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let claude_only: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(claude_only["pathWeights"]["a/b"], claude);
    assert_eq!(claude_only["metadata"]["docTypeFilter"], "claude");
}

#[test]
fn report_renders_markdown() {
    let temp = setup_project();
    claude_tree(temp.path())
        .args(["tree", "proj", "-o", "tree.json"])
        .assert()
        .success();

    claude_tree(temp.path())
        .args(["report", "--tree", "tree.json", "--path", "a/b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Heaviest Paths (Cumulative Tokens)"))
        .stdout(predicate::str::is_match(r"\| 1 \| `a/b/` \| [\d,]+ \| 🔴 High \|").unwrap())
        .stdout(predicate::str::contains("## Context Chain: `a/b/`"))
        .stdout(predicate::str::contains("**Total:**"));
}

#[test]
fn report_applies_threshold_overrides() {
    let temp = setup_project();
    claude_tree(temp.path())
        .args(["tree", "proj", "-o", "tree.json"])
        .assert()
        .success();

    claude_tree(temp.path())
        .args([
            "report", "--tree", "tree.json", "--green", "1000000", "--yellow", "2000000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\| 1 \| `a/b/` \| [\d,]+ \| ✅ OK \|").unwrap());
}

#[test]
fn report_on_unreadable_tree_fails() {
    let temp = tempdir().unwrap();
    write(temp.path(), "tree.json", "not json");

    claude_tree(temp.path())
        .args(["report", "--tree", "tree.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid artifact"));
}

#[test]
fn schema_prints_json_schema() {
    let temp = tempdir().unwrap();

    let output = claude_tree(temp.path())
        .args(["schema", "path-weights"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"].get("pathWeights").is_some(), "{schema}");
}
