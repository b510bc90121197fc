use crate::collector::{Collector, DirectoryCollector, GitCollector, RemoteAddress, RemoteCollector};
use crate::document::Document;
use crate::errors::CollectError;
use crate::filter::FileFilter;
use std::path::PathBuf;
use tracing::debug;

const GIT_PREFIXES: &[&str] = &["http://", "https://", "git@"];

/// Where the files come from, decided once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Git(String),
    Remote {
        address: RemoteAddress,
        path: String,
    },
    Local(PathBuf),
}

impl Source {
    /// Git URLs win over `user@host` so `git@host:repo` is never treated as
    /// an SSH address. A remote address needs a remote path; without one
    /// the source is a local directory.
    pub fn parse(source: &str, remote_path: Option<&str>) -> Result<Self, CollectError> {
        if GIT_PREFIXES.iter().any(|prefix| source.starts_with(prefix)) {
            return Ok(Source::Git(source.to_string()));
        }

        match remote_path {
            Some(path) if !path.is_empty() && source.contains('@') => Ok(Source::Remote {
                address: source.parse()?,
                path: path.to_string(),
            }),
            _ => Ok(Source::Local(PathBuf::from(source))),
        }
    }

    pub fn collector(&self, password: Option<String>) -> Box<dyn Collector + Send + Sync> {
        match self {
            Source::Git(url) => Box::new(GitCollector::new(url.clone())),
            Source::Remote { address, path } => Box::new(
                RemoteCollector::new(address.clone(), path.clone()).with_password(password),
            ),
            Source::Local(root) => Box::new(DirectoryCollector::new(root)),
        }
    }
}

pub async fn dispatch(
    source: &str,
    remote_path: Option<&str>,
    password: Option<String>,
    filter: &FileFilter,
) -> Result<Document, CollectError> {
    let source = Source::parse(source, remote_path)?;
    debug!("Resolved source: {:?}", source);
    source.collector(password).collect(filter).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_prefixes() {
        for url in [
            "https://github.com/org/repo.git",
            "http://example.com/repo.git",
            "git@github.com:org/repo.git",
        ] {
            assert_eq!(Source::parse(url, None).unwrap(), Source::Git(url.to_string()));
        }
    }

    #[test]
    fn test_git_wins_over_remote() {
        let source = Source::parse("git@github.com:org/repo.git", Some("/srv")).unwrap();
        assert!(matches!(source, Source::Git(_)));
    }

    #[test]
    fn test_remote_requires_path() {
        let source = Source::parse("deploy@example.com:2222", Some("/srv/app")).unwrap();
        assert_eq!(
            source,
            Source::Remote {
                address: RemoteAddress {
                    user: "deploy".to_string(),
                    host: "example.com".to_string(),
                    port: 2222,
                },
                path: "/srv/app".to_string(),
            }
        );

        let source = Source::parse("deploy@example.com", None).unwrap();
        assert_eq!(source, Source::Local(PathBuf::from("deploy@example.com")));

        let source = Source::parse("deploy@example.com", Some("")).unwrap();
        assert_eq!(source, Source::Local(PathBuf::from("deploy@example.com")));
    }

    #[test]
    fn test_bad_port_is_invalid_address() {
        assert!(matches!(
            Source::parse("deploy@example.com:port", Some("/srv")),
            Err(CollectError::InvalidAddressError(_))
        ));
    }
}
