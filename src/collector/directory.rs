use crate::collector::Collector;
use crate::document::Document;
use crate::errors::CollectError;
use crate::filter::FileFilter;
use crate::utils::{read_file_content, relative_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

pub struct DirectoryCollector {
    root: PathBuf,
}

enum Candidate {
    File { path: PathBuf, relative: String },
    Unlisted { relative: String, message: String },
}

impl DirectoryCollector {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryCollector {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn candidates(&self, filter: &FileFilter) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            match entry {
                // dangling symlinks are kept so the failed read shows up
                Ok(entry) if !entry.path().is_dir() => {
                    let relative = relative_path(entry.path(), &self.root);
                    if filter.should_include(&relative) {
                        candidates.push(Candidate::File {
                            path: entry.path().to_path_buf(),
                            relative,
                        });
                    } else {
                        trace!("Filtered out: {}", relative);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let relative = e
                        .path()
                        .map(|p| relative_path(p, &self.root))
                        .unwrap_or_else(|| self.root.display().to_string());
                    warn!("Error walking {}: {}", relative, e);
                    candidates.push(Candidate::Unlisted {
                        relative,
                        message: e.to_string(),
                    });
                }
            }
        }
        candidates
    }
}

#[async_trait]
impl Collector for DirectoryCollector {
    async fn collect(&self, filter: &FileFilter) -> Result<Document, CollectError> {
        if !self.root.is_dir() {
            return Err(CollectError::NotADirectoryError(
                self.root.display().to_string(),
            ));
        }

        debug!("Collecting files under {}", self.root.display());
        let mut document = Document::new();
        for candidate in self.candidates(filter) {
            match candidate {
                Candidate::File { path, relative } => {
                    debug!("Processing file: {}", relative);
                    match read_file_content(&path).await {
                        Ok(content) => document.push_content(relative, content),
                        Err(e) => {
                            warn!("Failed to read file {}: {}", relative, e);
                            document.push_read_error(relative, e);
                        }
                    }
                }
                Candidate::Unlisted { relative, message } => {
                    document.push_listing_error(relative, message);
                }
            }
        }

        debug!("Collected {} entries from {}", document.len(), self.root.display());
        Ok(document)
    }
}
