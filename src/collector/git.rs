use crate::collector::{Collector, DirectoryCollector};
use crate::document::Document;
use crate::errors::CollectError;
use crate::filter::FileFilter;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tempfile::{Builder, TempDir};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Clones a repository into a temporary checkout and collects it like a
/// local directory. The checkout is removed when `collect` finishes,
/// whatever the outcome.
pub struct GitCollector {
    url: String,
    checkout_parent: Option<PathBuf>,
}

impl GitCollector {
    pub fn new(url: impl Into<String>) -> Self {
        GitCollector {
            url: url.into(),
            checkout_parent: None,
        }
    }

    /// Creates checkouts under `parent` instead of the system temp directory.
    pub fn with_checkout_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.checkout_parent = Some(parent.into());
        self
    }

    fn create_checkout(&self) -> Result<TempDir, CollectError> {
        let mut builder = Builder::new();
        builder.prefix("hh-c2t-");
        let checkout = match &self.checkout_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        checkout.map_err(|e| {
            CollectError::CloneError(format!("cannot create checkout directory: {}", e))
        })
    }

    async fn clone_into(&self, checkout: &TempDir) -> Result<(), CollectError> {
        info!(
            "Cloning repository from {} to {}...",
            self.url,
            checkout.path().display()
        );
        let status = Command::new("git")
            .arg("clone")
            .arg(&self.url)
            .arg(checkout.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| CollectError::CloneError(format!("failed to launch git: {}", e)))?;

        if !status.success() {
            return Err(CollectError::CloneError(format!(
                "git clone {} exited with {}",
                self.url, status
            )));
        }
        debug!("Clone of {} finished", self.url);
        Ok(())
    }
}

#[async_trait]
impl Collector for GitCollector {
    async fn collect(&self, filter: &FileFilter) -> Result<Document, CollectError> {
        let checkout = self.create_checkout()?;
        self.clone_into(&checkout).await?;

        let document = DirectoryCollector::new(checkout.path())
            .collect(filter)
            .await?;

        let checkout_path = checkout.path().to_path_buf();
        if let Err(e) = checkout.close() {
            warn!(
                "Failed to remove checkout {}: {}",
                checkout_path.display(),
                e
            );
        }
        Ok(document)
    }
}
