//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use stowage_entity::FolderNode;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("(empty)");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a folder tree, indented by depth
pub fn print_tree(node: &FolderNode, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            for line in tree_lines(node) {
                println!("{line}");
            }
        }
        OutputFormat::Json => print_json(node),
    }
}

/// One line per folder, drawn with box characters in display order.
fn tree_lines(root: &FolderNode) -> Vec<String> {
    let mut lines = vec![format!("{}/  ({})", root.folder.name, root.folder.id)];
    // (node, prefix inherited from ancestors, last among its siblings)
    let mut pending: Vec<(&FolderNode, String, bool)> = Vec::new();
    push_children(&mut pending, root, "");

    while let Some((node, prefix, last)) = pending.pop() {
        let (branch, extend) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{prefix}{branch}{}/  ({})", node.folder.name, node.folder.id));
        push_children(&mut pending, node, &format!("{prefix}{extend}"));
    }
    lines
}

fn push_children<'a>(
    pending: &mut Vec<(&'a FolderNode, String, bool)>,
    node: &'a FolderNode,
    prefix: &str,
) {
    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate().rev() {
        pending.push((child, prefix.to_string(), i == last));
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    eprintln!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<20} {}", format!("{key}:"), value);
}
