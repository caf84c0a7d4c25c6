use claude_tree_protocol::{EdgeRecord, EdgeType};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Read, parse and structurally validate one edge record file.
///
/// Returns every problem found, not just the first one. Read and parse
/// failures end validation early with a single message.
pub fn validate_edge_file(path: &Path) -> Result<EdgeRecord, Vec<String>> {
    let raw = fs::read(path).map_err(|e| vec![format!("Could not read file: {e}")])?;
    let value: Value =
        serde_json::from_slice(&raw).map_err(|e| vec![format!("Invalid JSON: {e}")])?;
    validate_edge_record(&value)
}

/// Structural validation of a parsed edge record.
pub fn validate_edge_record(value: &Value) -> Result<EdgeRecord, Vec<String>> {
    let Some(root) = value.as_object() else {
        return Err(vec!["Root must be an object".to_string()]);
    };

    let mut errors = Vec::new();

    match root.get("source") {
        None => errors.push("Missing 'source' field".to_string()),
        Some(Value::String(_)) => {}
        Some(_) => errors.push("'source' must be a string".to_string()),
    }

    match root.get("edges") {
        None => errors.push("Missing 'edges' field".to_string()),
        Some(Value::Array(edges)) => {
            for (i, edge) in edges.iter().enumerate() {
                match edge.as_object() {
                    Some(edge) => check_edge(i, edge, &mut errors),
                    None => errors.push(format!("Edge {i}: must be an object")),
                }
            }
        }
        Some(_) => errors.push("'edges' must be an array".to_string()),
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value.clone()).map_err(|e| vec![format!("Invalid record: {e}")])
}

fn check_edge(i: usize, edge: &Map<String, Value>, errors: &mut Vec<String>) {
    for field in ["source", "target"] {
        match edge.get(field) {
            None => errors.push(format!("Edge {i}: missing '{field}'")),
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(_) => errors.push(format!("Edge {i}: '{field}' must be a non-empty string")),
        }
    }

    match edge.get("type") {
        None => errors.push(format!("Edge {i}: missing 'type'")),
        Some(kind) => {
            if kind.as_str().and_then(EdgeType::from_wire).is_none() {
                errors.push(format!(
                    "Edge {i}: 'type' must be 'agent-doc', 'file', or 'directory'"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_record() {
        let record = validate_edge_record(&json!({
            "source": "CLAUDE.md",
            "edges": [
                {"source": "CLAUDE.md", "target": "docs/AGENTS.md", "type": "agent-doc"},
                {"source": "CLAUDE.md", "target": "src", "type": "directory", "note": "extra"}
            ]
        }))
        .expect("valid record");

        assert_eq!(record.edges.len(), 2);
        assert_eq!(record.edges[1].kind, EdgeType::Directory);
        assert_eq!(record.edges[1].extra.get("note"), Some(&json!("extra")));
        assert!(record.edges[0].extra.is_empty());
    }

    #[test]
    fn empty_edge_list_is_valid() {
        let record = validate_edge_record(&json!({"source": "a/CLAUDE.md", "edges": []}))
            .expect("valid record");
        assert!(record.edges.is_empty());
    }

    #[test]
    fn non_object_root_is_a_single_error() {
        let errors = validate_edge_record(&json!([1, 2])).unwrap_err();
        assert_eq!(errors, vec!["Root must be an object"]);
    }

    #[test]
    fn reports_every_problem_in_one_pass() {
        let errors = validate_edge_record(&json!({
            "source": 7,
            "edges": [
                "nope",
                {"target": "x"},
                {"source": "", "target": "y", "type": "link"},
                {"source": "a", "target": "b"}
            ]
        }))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "'source' must be a string",
                "Edge 0: must be an object",
                "Edge 1: missing 'source'",
                "Edge 1: missing 'type'",
                "Edge 2: 'source' must be a non-empty string",
                "Edge 2: 'type' must be 'agent-doc', 'file', or 'directory'",
                "Edge 3: missing 'type'",
            ]
        );
    }

    #[test]
    fn missing_top_level_fields_are_both_reported() {
        let errors = validate_edge_record(&json!({})).unwrap_err();
        assert_eq!(
            errors,
            vec!["Missing 'source' field", "Missing 'edges' field"]
        );
    }

    #[test]
    fn edges_must_be_an_array() {
        let errors =
            validate_edge_record(&json!({"source": "CLAUDE.md", "edges": {}})).unwrap_err();
        assert_eq!(errors, vec!["'edges' must be an array"]);
    }

    #[test]
    fn unparsable_file_reports_invalid_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, b"{\"source\": ").unwrap();

        let errors = validate_edge_file(&path).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Invalid JSON:"), "{errors:?}");
    }

    #[test]
    fn missing_file_reports_read_error() {
        let temp = tempfile::tempdir().unwrap();
        let errors = validate_edge_file(&temp.path().join("gone.json")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Could not read file:"));
    }
}
