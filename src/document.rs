/// What a collector produced for one label.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Content(String),
    ReadError(String),
    ListingError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedEntry {
    /// Relative file path, or the directory path for listing errors.
    pub label: String,
    pub outcome: EntryOutcome,
}

impl CollectedEntry {
    pub fn is_error(&self) -> bool {
        !matches!(self.outcome, EntryOutcome::Content(_))
    }

    pub fn render(&self) -> String {
        match &self.outcome {
            EntryOutcome::Content(content) => format!("```{}\n{}\n```\n\n", self.label, content),
            EntryOutcome::ReadError(message) => format!(
                "```{}\nError reading file: {}\n```\n\n",
                self.label, message
            ),
            EntryOutcome::ListingError(message) => format!(
                "```Error listing directory {}: {}\n```\n\n",
                self.label, message
            ),
        }
    }
}

/// Entries in traversal order. Rendering concatenates their fenced blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<CollectedEntry>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn push_content(&mut self, relative_path: impl Into<String>, content: String) {
        self.push(relative_path.into(), EntryOutcome::Content(content));
    }

    pub fn push_read_error(&mut self, relative_path: impl Into<String>, message: impl ToString) {
        self.push(relative_path.into(), EntryOutcome::ReadError(message.to_string()));
    }

    pub fn push_listing_error(&mut self, directory: impl Into<String>, message: impl ToString) {
        self.push(directory.into(), EntryOutcome::ListingError(message.to_string()));
    }

    fn push(&mut self, label: String, outcome: EntryOutcome) {
        self.entries.push(CollectedEntry { label, outcome });
    }

    pub fn entries(&self) -> &[CollectedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        self.entries.iter().map(CollectedEntry::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_blocks() {
        let mut document = Document::new();
        document.push_content("a.py", "x".to_string());
        document.push_read_error("b.py", "stream did not contain valid UTF-8");
        document.push_listing_error("/srv/app/private", "permission denied");

        assert_eq!(
            document.render(),
            "```a.py\nx\n```\n\n\
             ```b.py\nError reading file: stream did not contain valid UTF-8\n```\n\n\
             ```Error listing directory /srv/app/private: permission denied\n```\n\n"
        );
        assert_eq!(document.len(), 3);
        assert!(!document.entries()[0].is_error());
        assert!(document.entries()[1].is_error());
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        assert_eq!(Document::new().render(), "");
    }
}
