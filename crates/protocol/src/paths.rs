//! Root-relative path helpers.
//!
//! Every path in the artifacts is relative to the scanned root, uses `/` as
//! separator, and spells the root itself as `"."`.

pub const ROOT_PATH: &str = ".";

/// Normalize a user or producer supplied path into the artifact spelling.
///
/// Backslashes become `/`, leading `./` and surrounding slashes are stripped,
/// and an empty result maps to [`ROOT_PATH`].
pub fn normalize_rel_path(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");
    while value.starts_with("./") {
        value = value[2..].to_string();
    }
    let value = value.trim_matches('/');
    if value.is_empty() || value == ROOT_PATH {
        return ROOT_PATH.to_string();
    }
    value.to_string()
}

/// Join a child name onto a directory path.
pub fn join_rel(dir: &str, name: &str) -> String {
    if dir == ROOT_PATH || dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Directory holding `path`; top-level entries live in [`ROOT_PATH`].
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => ROOT_PATH,
    }
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Non-root directory prefixes of a directory path, shallow to deep.
///
/// `"a/b/c"` yields `["a", "a/b", "a/b/c"]`; the root yields nothing.
pub fn dir_prefixes(dir: &str) -> Vec<String> {
    let dir = normalize_rel_path(dir);
    if dir == ROOT_PATH {
        return Vec::new();
    }

    let mut prefixes = Vec::new();
    let mut current = String::new();
    for segment in dir.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        prefixes.push(current.clone());
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_strips_dot_prefix_and_slashes() {
        assert_eq!(normalize_rel_path("./a/b/"), "a/b");
        assert_eq!(normalize_rel_path("a\\b"), "a/b");
        assert_eq!(normalize_rel_path("./"), ".");
        assert_eq!(normalize_rel_path(""), ".");
        assert_eq!(normalize_rel_path("."), ".");
    }

    #[test]
    fn prefixes_walk_shallow_to_deep() {
        assert_eq!(dir_prefixes("a/b/c"), vec!["a", "a/b", "a/b/c"]);
        assert!(dir_prefixes(".").is_empty());
    }

    #[test]
    fn parent_of_top_level_entry_is_root() {
        assert_eq!(parent_dir("CLAUDE.md"), ".");
        assert_eq!(parent_dir("a/b/AGENTS.md"), "a/b");
        assert_eq!(file_name("a/b/AGENTS.md"), "AGENTS.md");
        assert_eq!(join_rel(".", "a"), "a");
        assert_eq!(join_rel("a", "b"), "a/b");
    }
}
