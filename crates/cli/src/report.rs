use claude_tree_graph::{
    cumulative_tokens, rank, AgentDocIndex, ReferenceGraph, Thresholds,
};
use claude_tree_protocol::{paths, DocTypeFilter, MergedGraph, TreeArtifact};
use std::path::Path;
use std::process::Command;

/// Per-doc tokens above which the budget table says "Warning".
pub const BUDGET_WARNING_TOKENS: usize = 500;

pub struct ReportInput<'a> {
    pub tree: &'a TreeArtifact,
    pub edges: Option<&'a MergedGraph>,
    /// Directory whose context chain gets its own section.
    pub focus_path: Option<&'a str>,
    pub filter: DocTypeFilter,
    pub thresholds: Thresholds,
    pub doc_budget: usize,
    pub top: usize,
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    let index = AgentDocIndex::from_artifact(input.tree);

    let mut md = String::new();
    md.push_str("# Claude tree report\n\n");
    md.push_str(&format!("- Root: `{}`\n", input.tree.root));
    md.push_str(&format!(
        "- Git: `{}`\n",
        git_head(Path::new(&input.tree.root)).as_deref().unwrap_or("n/a")
    ));
    md.push_str(&format!(
        "- Agent docs: `{}` ({})\n",
        index.docs(input.filter).count(),
        input.filter.label()
    ));
    md.push_str(&format!(
        "- Total tokens: `{}`\n",
        fmt_tokens(index.total_tokens(input.filter))
    ));
    md.push_str(&format!("- {}\n\n", thresholds_line(&input.thresholds)));

    render_heaviest_paths(&mut md, &index, input);
    render_token_budget(&mut md, &index, input);
    if let Some(path) = input.focus_path {
        render_context_chain(&mut md, &index, path, input);
    }
    if let Some(edges) = input.edges {
        render_references(&mut md, edges, input.tree);
    }

    md
}

fn render_heaviest_paths(md: &mut String, index: &AgentDocIndex, input: &ReportInput<'_>) {
    md.push_str("## Heaviest Paths (Cumulative Tokens)\n\n");

    let ranking = rank(index, input.filter);
    if ranking.is_empty() {
        match input.filter {
            DocTypeFilter::All => md.push_str("_No paths with agent docs._\n\n"),
            family => md.push_str(&format!("_No paths with {} files._\n\n", family.label())),
        }
        return;
    }

    md.push_str("| Rank | Path | Cumulative Tokens | Status |\n");
    md.push_str("|---:|---|---:|---|\n");
    for (i, item) in ranking.iter().take(input.top).enumerate() {
        md.push_str(&format!(
            "| {} | `{}/` | {} | {} |\n",
            i + 1,
            escape_cell(&item.path),
            fmt_tokens(item.cumulative_tokens),
            input.thresholds.classify(item.cumulative_tokens).status()
        ));
    }
    md.push_str("\nThese paths have the highest context cost when an agent works in them.\n\n");
}

fn render_token_budget(md: &mut String, index: &AgentDocIndex, input: &ReportInput<'_>) {
    let budget = input.doc_budget;
    let mut docs: Vec<(&str, usize)> = index.docs(input.filter).collect();
    docs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let over_budget: Vec<_> = docs.iter().filter(|(_, tokens)| *tokens > budget).collect();
    let total: usize = docs.iter().map(|(_, tokens)| tokens).sum();

    md.push_str("## Token Budget Report\n\n");
    md.push_str("### Summary\n\n");
    md.push_str(&format!("- **Total agent docs:** {}\n", docs.len()));
    md.push_str(&format!("- **Total tokens:** {}\n", fmt_tokens(total)));
    md.push_str(&format!(
        "- **Files over budget (>{budget}):** {}\n\n",
        over_budget.len()
    ));

    if !over_budget.is_empty() {
        md.push_str("### Files Exceeding Budget\n\n");
        md.push_str("| File | Tokens | Over By |\n");
        md.push_str("|---|---:|---|\n");
        for (path, tokens) in &over_budget {
            let ratio = if budget == 0 {
                0.0
            } else {
                *tokens as f64 / budget as f64
            };
            md.push_str(&format!(
                "| `{}` | {} | +{} ({ratio:.1}x) |\n",
                escape_cell(path),
                fmt_tokens(*tokens),
                fmt_tokens(tokens - budget),
            ));
        }
        md.push('\n');
    }

    md.push_str("### All Agent Docs by Token Count\n\n");
    if docs.is_empty() {
        md.push_str("_No agent docs found._\n\n");
        return;
    }
    md.push_str("| File | Tokens | Status |\n");
    md.push_str("|---|---:|---|\n");
    for (path, tokens) in &docs {
        let status = if *tokens > budget {
            "Over"
        } else if *tokens > BUDGET_WARNING_TOKENS {
            "Warning"
        } else {
            "OK"
        };
        md.push_str(&format!(
            "| `{}` | {} | {status} |\n",
            escape_cell(path),
            fmt_tokens(*tokens)
        ));
    }
    md.push('\n');
}

fn render_context_chain(
    md: &mut String,
    index: &AgentDocIndex,
    path: &str,
    input: &ReportInput<'_>,
) {
    let path = paths::normalize_rel_path(path);
    let cost = cumulative_tokens(&path, input.filter, index);

    md.push_str(&format!("## Context Chain: `{}/`\n\n", escape_cell(&path)));
    if cost.breakdown.is_empty() {
        md.push_str("No instruction files load in this directory.\n\n");
        return;
    }
    md.push_str("When an agent works in this directory, these instruction files load:\n\n");
    md.push_str("| # | File | Tokens |\n");
    md.push_str("|---:|---|---:|\n");
    for (i, entry) in cost.breakdown.iter().enumerate() {
        md.push_str(&format!(
            "| {} | `{}` | {} |\n",
            i + 1,
            escape_cell(&entry.file),
            fmt_tokens(entry.tokens)
        ));
    }
    md.push_str(&format!(
        "\n**Total:** {} tokens ({})\n",
        fmt_tokens(cost.total),
        input.thresholds.classify(cost.total).status()
    ));
    md.push_str(&format!("\n**{}**\n\n", thresholds_line(&input.thresholds)));
}

fn render_references(md: &mut String, edges: &MergedGraph, tree: &TreeArtifact) {
    let graph = ReferenceGraph::build(edges, tree.tree.iter().map(|node| node.path.as_str()));
    let dangling = graph.dangling_targets();

    md.push_str("## References\n\n");
    md.push_str(&format!("- Edges: `{}`\n", graph.edge_count()));
    md.push_str(&format!("- Dangling targets: `{}`\n\n", dangling.len()));

    let sources = graph.sources();
    if !sources.is_empty() {
        md.push_str("| Agent doc | References |\n");
        md.push_str("|---|---:|\n");
        for source in sources {
            md.push_str(&format!(
                "| `{}` | {} |\n",
                escape_cell(source),
                graph.references_from(source).len()
            ));
        }
        md.push('\n');
    }

    if !dangling.is_empty() {
        md.push_str("### Dangling Targets\n\n");
        for target in dangling {
            md.push_str(&format!(
                "- `{}` ({} references)\n",
                truncate_one_line(target, 120),
                graph.inbound_count(target)
            ));
        }
        md.push('\n');
    }
}

fn thresholds_line(thresholds: &Thresholds) -> String {
    format!(
        "Thresholds: Green < {}, Yellow < {}, Red ≥ {}",
        fmt_tokens(thresholds.green()),
        fmt_tokens(thresholds.yellow()),
        fmt_tokens(thresholds.yellow())
    )
}

/// Thousands-separated token count (`12,345`).
pub fn fmt_tokens(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn git_head(project_root: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(project_root)
        .arg("rev-parse")
        .arg("HEAD")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn truncate_one_line(text: &str, max_chars: usize) -> String {
    let mut s = text.replace(['\n', '\r', '\t'], " ");
    s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= max_chars {
        return escape_cell(&s);
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    escape_cell(&format!("{truncated}…"))
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
