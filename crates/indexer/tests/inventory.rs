use claude_tree_indexer::{inventory, ScanOptions, TokenCounter};
use std::fs;
use tempfile::TempDir;

struct WordCounter;

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

fn write_doc(root: &std::path::Path, rel: &str, tokens: usize) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, vec!["w"; tokens].join(" ")).expect("write doc");
}

fn setup_project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write_doc(root, "CLAUDE.md", 500);
    write_doc(root, "services/api/AGENTS.md", 1200);
    write_doc(root, "services/api/CLAUDE.md", 300);
    fs::write(root.join("services/api/handler.rs"), b"fn handle() {}").unwrap();
    fs::create_dir_all(root.join("tools/lint")).unwrap();
    fs::write(root.join("tools/lint/main.py"), b"print()").unwrap();
    fs::create_dir_all(root.join("target/debug")).unwrap();
    write_doc(root, "target/debug/CLAUDE.md", 50);
    temp
}

#[test]
fn filtered_inventory_lists_docs_and_totals() {
    let temp = setup_project();

    let artifact = inventory(temp.path(), &WordCounter, ScanOptions::default(), false)
        .expect("inventory");

    let docs: Vec<_> = artifact
        .agent_docs
        .iter()
        .map(|d| (d.path.as_str(), d.tokens))
        .collect();
    assert_eq!(
        docs,
        vec![
            ("CLAUDE.md", 500),
            ("services/api/AGENTS.md", 1200),
            ("services/api/CLAUDE.md", 300),
        ]
    );
    assert_eq!(artifact.total_agent_docs, 3);
    assert_eq!(artifact.total_tokens, 2000);
    assert!(artifact.tree.iter().any(|n| n.path == "services/api/handler.rs"));
    assert!(artifact.tree.iter().all(|n| !n.path.starts_with("tools")));
    assert!(artifact.tree.iter().all(|n| !n.path.starts_with("target")));
}

#[test]
fn full_inventory_keeps_unrelated_directories() {
    let temp = setup_project();

    let artifact =
        inventory(temp.path(), &WordCounter, ScanOptions::default(), true).expect("inventory");

    assert!(artifact.tree.iter().any(|n| n.path == "tools/lint/main.py"));
    assert_eq!(artifact.total_agent_docs, 3);
}

#[test]
fn artifact_serializes_with_camel_case_keys() {
    let temp = setup_project();

    let artifact = inventory(temp.path(), &WordCounter, ScanOptions::default(), false)
        .expect("inventory");
    let value = serde_json::to_value(&artifact).expect("serialize");

    assert_eq!(value["totalAgentDocs"], 3);
    assert_eq!(value["tree"]["path"], ".");
    assert_eq!(value["tree"]["type"], "directory");
    assert_eq!(value["agentDocs"][0]["path"], "CLAUDE.md");
}
