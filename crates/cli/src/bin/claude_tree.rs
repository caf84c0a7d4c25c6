use anyhow::Result;

fn main() -> Result<()> {
    claude_tree_cli::main_entry()
}
