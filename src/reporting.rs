use crate::document::{Document, EntryOutcome};
use crate::errors::CollectError;
use std::collections::BTreeMap;
use tiktoken_rs::get_bpe_from_model;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
    pub chars: usize,
    pub tokens: usize,
    pub failed: bool,
}

/// Path components of collected entries, with counts on the leaves.
#[derive(Debug, Default)]
pub struct StatsNode {
    pub children: BTreeMap<String, StatsNode>,
    pub stats: Option<EntryStats>,
}

impl StatsNode {
    pub fn insert(&mut self, label: &str, stats: EntryStats) {
        let mut node = self;
        for component in label.split('/').filter(|c| !c.is_empty()) {
            node = node.children.entry(component.to_string()).or_default();
        }
        node.stats = Some(stats);
    }

    pub fn total(&self) -> EntryStats {
        let own = self.stats.unwrap_or_default();
        self.children.values().fold(own, |acc, child| {
            let child = child.total();
            EntryStats {
                chars: acc.chars + child.chars,
                tokens: acc.tokens + child.tokens,
                failed: acc.failed || child.failed,
            }
        })
    }
}

/// Character and token counts per collected entry.
pub fn build_stats(document: &Document, model: &str) -> Result<StatsNode, CollectError> {
    let tokenizer =
        get_bpe_from_model(model).map_err(|e| CollectError::TokenizerError(e.to_string()))?;

    let mut root = StatsNode::default();
    for entry in document.entries() {
        let stats = match &entry.outcome {
            EntryOutcome::Content(content) => EntryStats {
                chars: content.chars().count(),
                tokens: tokenizer.encode_ordinary(content).len(),
                failed: false,
            },
            EntryOutcome::ReadError(_) | EntryOutcome::ListingError(_) => EntryStats {
                failed: true,
                ..EntryStats::default()
            },
        };
        debug!("{}: {:?}", entry.label, stats);
        root.insert(&entry.label, stats);
    }
    Ok(root)
}

pub fn print_stats(document: &Document, model: &str) -> Result<(), CollectError> {
    let root = build_stats(document, model)?;
    let total = root.total();
    info!(
        "Overall ({} chars, {} tokens)",
        total.chars, total.tokens
    );
    for line in render_tree(&root) {
        info!("{}", line);
    }
    Ok(())
}

pub fn render_tree(root: &StatsNode) -> Vec<String> {
    let mut lines = Vec::new();
    render_children(root, "", &mut lines);
    lines
}

fn render_children(node: &StatsNode, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "┗━━" } else { "┣━━" };

        if child.children.is_empty() {
            let stats = child.stats.unwrap_or_default();
            if stats.failed {
                lines.push(format!("{}{} {} (error)", prefix, connector, name));
            } else {
                lines.push(format!(
                    "{}{} {} ({} chars, {} tokens)",
                    prefix, connector, name, stats.chars, stats.tokens
                ));
            }
        } else {
            let total = child.total();
            lines.push(format!(
                "{}{}📂 {} ({} chars, {} tokens)",
                prefix, connector, name, total.chars, total.tokens
            ));
            let child_prefix = format!("{}{}    ", prefix, if is_last { " " } else { "┃" });
            render_children(child, &child_prefix, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(chars: usize, tokens: usize) -> EntryStats {
        EntryStats {
            chars,
            tokens,
            failed: false,
        }
    }

    #[test]
    fn test_totals_roll_up() {
        let mut root = StatsNode::default();
        root.insert("a.py", stats(10, 3));
        root.insert("pkg/b.py", stats(5, 2));
        root.insert("pkg/sub/c.py", stats(1, 1));

        assert_eq!(root.total(), stats(16, 6));
        assert_eq!(root.children["pkg"].total(), stats(6, 3));
    }

    #[test]
    fn test_render_tree_sorted() {
        let mut root = StatsNode::default();
        root.insert("z.py", stats(1, 1));
        root.insert("pkg/b.py", stats(2, 1));
        root.insert(
            "broken.py",
            EntryStats {
                failed: true,
                ..EntryStats::default()
            },
        );

        assert_eq!(
            render_tree(&root),
            vec![
                "┣━━ broken.py (error)".to_string(),
                "┣━━📂 pkg (2 chars, 1 tokens)".to_string(),
                "┃    ┗━━ b.py (2 chars, 1 tokens)".to_string(),
                "┗━━ z.py (1 chars, 1 tokens)".to_string(),
            ]
        );
    }

    #[test]
    fn test_build_stats_counts_chars() {
        let mut document = Document::new();
        document.push_content("a.py", "print('hi')".to_string());
        document.push_read_error("b.py", "denied");

        let root = build_stats(&document, "gpt-4o").unwrap();
        let a = root.children["a.py"].stats.unwrap();
        assert_eq!(a.chars, 11);
        assert!(a.tokens > 0);
        assert!(root.children["b.py"].stats.unwrap().failed);
    }
}
