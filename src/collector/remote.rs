use crate::collector::Collector;
use crate::document::Document;
use crate::errors::CollectError;
use crate::filter::FileFilter;
use crate::utils::join_remote;
use async_trait::async_trait;
use dialoguer::Password;
use ssh2::{Session, Sftp};
use std::fmt;
use std::io::{self, Read};
use std::net::TcpStream;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_KEY_FILES: &[&str] = &["id_ed25519", "id_ecdsa", "id_rsa"];

/// `user@host[:port]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddress {
    pub user: String,
    pub host: String,
    pub port: u16,
}

impl FromStr for RemoteAddress {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user, host) = s
            .split_once('@')
            .ok_or_else(|| CollectError::InvalidAddressError(s.to_string()))?;
        let (host, port) = match host.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    CollectError::InvalidAddressError(format!("{} (bad port: {})", s, e))
                })?;
                (host, port)
            }
            None => (host, DEFAULT_SSH_PORT),
        };
        if user.is_empty() || host.is_empty() {
            return Err(CollectError::InvalidAddressError(s.to_string()));
        }

        Ok(RemoteAddress {
            user: user.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// The two operations the collector needs from a remote filesystem.
pub trait RemoteFs {
    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteDirEntry>>;
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Asks the user for a password once key-based authentication failed.
pub trait PasswordPrompt: Send + Sync {
    fn prompt(&self, address: &RemoteAddress) -> Result<String, CollectError>;
}

pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&self, address: &RemoteAddress) -> Result<String, CollectError> {
        Password::new()
            .with_prompt(format!("Password for {}@{}", address.user, address.host))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CollectError::AuthenticationError(format!("password prompt failed: {}", e)))
    }
}

enum Candidate {
    File { full: String, relative: String },
    Unlisted { dir: String, message: String },
}

/// Depth-first walk of `dir`, entries visited in name order. A directory
/// that cannot be listed becomes one `Unlisted` candidate and the walk
/// carries on with its siblings.
fn find_candidates<F: RemoteFs + ?Sized>(
    fs: &F,
    dir: &str,
    relative_dir: &str,
    filter: &FileFilter,
    candidates: &mut Vec<Candidate>,
) {
    let mut entries = match fs.list_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error listing directory {}: {}", dir, e);
            candidates.push(Candidate::Unlisted {
                dir: dir.to_string(),
                message: e.to_string(),
            });
            return;
        }
    };
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in entries {
        let full = join_remote(dir, &entry.name);
        let relative = if relative_dir.is_empty() {
            entry.name
        } else {
            format!("{}/{}", relative_dir, entry.name)
        };

        if entry.is_dir {
            find_candidates(fs, &full, &relative, filter, candidates);
        } else if filter.should_include(&relative) {
            candidates.push(Candidate::File { full, relative });
        } else {
            trace!("Filtered out: {}", relative);
        }
    }
}

/// Lists and reads everything under `root` that passes `filter`.
pub fn collect_tree<F: RemoteFs + ?Sized>(fs: &F, root: &str, filter: &FileFilter) -> Document {
    let mut candidates = Vec::new();
    find_candidates(fs, root, "", filter, &mut candidates);

    let mut document = Document::new();
    for candidate in candidates {
        match candidate {
            Candidate::File { full, relative } => {
                debug!("Processing remote file: {}", full);
                let content = fs
                    .read_file(&full)
                    .and_then(|bytes| {
                        String::from_utf8(bytes)
                            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
                    });
                match content {
                    Ok(content) => document.push_content(relative, content),
                    Err(e) => {
                        warn!("Failed to read remote file {}: {}", full, e);
                        document.push_read_error(relative, e);
                    }
                }
            }
            Candidate::Unlisted { dir, message } => document.push_listing_error(dir, message),
        }
    }
    document
}

/// The authentication steps a session offers.
pub trait SshAuth {
    fn auth_password(&self, user: &str, password: &str) -> Result<(), CollectError>;
    /// SSH agent first, then the default private keys.
    fn auth_keys(&self, user: &str) -> bool;
    fn authenticated(&self) -> bool;
}

impl SshAuth for Session {
    fn auth_password(&self, user: &str, password: &str) -> Result<(), CollectError> {
        self.userauth_password(user, password)
            .map_err(|e| CollectError::AuthenticationError(e.to_string()))
    }

    fn auth_keys(&self, user: &str) -> bool {
        match self.userauth_agent(user) {
            Ok(()) if self.authenticated() => {
                debug!("Authenticated {} through the SSH agent", user);
                return true;
            }
            Ok(()) => {}
            Err(e) => debug!("SSH agent authentication failed: {}", e),
        }

        let ssh_dir = match dirs::home_dir() {
            Some(home) => home.join(".ssh"),
            None => return false,
        };
        for key in DEFAULT_KEY_FILES {
            let private_key = ssh_dir.join(key);
            if !private_key.exists() {
                continue;
            }
            match self.userauth_pubkey_file(user, None, &private_key, None) {
                Ok(()) if self.authenticated() => {
                    debug!("Authenticated {} with {}", user, private_key.display());
                    return true;
                }
                Ok(()) => {}
                Err(e) => debug!("Key {} rejected: {}", private_key.display(), e),
            }
        }
        false
    }

    fn authenticated(&self) -> bool {
        Session::authenticated(self)
    }
}

/// A supplied password is used as is. Otherwise keys are tried, and only
/// when they fail is the user prompted, once.
pub fn authenticate<A: SshAuth + ?Sized>(
    auth: &A,
    address: &RemoteAddress,
    password: Option<&str>,
    prompt: &dyn PasswordPrompt,
) -> Result<(), CollectError> {
    match password {
        Some(password) => {
            debug!("Authenticating {} with password", address.user);
            auth.auth_password(&address.user, password)?;
        }
        None => {
            if !auth.auth_keys(&address.user) {
                info!("Key-based authentication failed for {}", address);
                let password = prompt.prompt(address)?;
                auth.auth_password(&address.user, &password)?;
            }
        }
    }

    if !auth.authenticated() {
        return Err(CollectError::AuthenticationError(format!(
            "{} was not accepted",
            address
        )));
    }
    Ok(())
}

/// Disconnects the wrapped session when dropped.
struct SessionGuard(Session);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.disconnect(None, "collection finished", None) {
            debug!("Error while disconnecting: {}", e);
        }
    }
}

/// An authenticated SFTP session. The SFTP channel is shut down before the
/// session disconnects.
pub struct SftpSession {
    sftp: Sftp,
    _session: SessionGuard,
}

impl SftpSession {
    pub fn connect(
        address: &RemoteAddress,
        password: Option<&str>,
        prompt: &dyn PasswordPrompt,
    ) -> Result<Self, CollectError> {
        info!("Connecting to {}", address);
        let tcp = TcpStream::connect((address.host.as_str(), address.port)).map_err(|e| {
            CollectError::ConnectionError(format!("{}: {}", address, e))
        })?;
        let mut session = Session::new()
            .map_err(|e| CollectError::ConnectionError(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| CollectError::ConnectionError(format!("{}: {}", address, e)))?;
        let session = SessionGuard(session);

        authenticate(&session.0, address, password, prompt)?;

        let sftp = session
            .0
            .sftp()
            .map_err(|e| CollectError::ConnectionError(format!("cannot open SFTP: {}", e)))?;
        debug!("SFTP session open on {}", address);
        Ok(SftpSession {
            sftp,
            _session: session,
        })
    }
}

impl RemoteFs for SftpSession {
    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteDirEntry>> {
        let entries = self.sftp.readdir(Path::new(path))?;
        Ok(entries
            .into_iter()
            .filter_map(|(entry_path, stat)| {
                let name = entry_path.file_name()?.to_string_lossy().into_owned();
                Some(RemoteDirEntry {
                    name,
                    is_dir: stat.is_dir(),
                })
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut file = self.sftp.open(Path::new(path))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

pub struct RemoteCollector {
    address: RemoteAddress,
    remote_root: String,
    password: Option<String>,
    prompt: Arc<dyn PasswordPrompt>,
}

impl RemoteCollector {
    pub fn new(address: RemoteAddress, remote_root: impl Into<String>) -> Self {
        RemoteCollector {
            address,
            remote_root: remote_root.into(),
            password: None,
            prompt: Arc::new(TerminalPrompt),
        }
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn PasswordPrompt>) -> Self {
        self.prompt = prompt;
        self
    }
}

#[async_trait]
impl Collector for RemoteCollector {
    async fn collect(&self, filter: &FileFilter) -> Result<Document, CollectError> {
        let address = self.address.clone();
        let remote_root = self.remote_root.clone();
        let password = self.password.clone();
        let prompt = Arc::clone(&self.prompt);
        let filter = filter.clone();

        tokio::task::spawn_blocking(move || -> Result<Document, CollectError> {
            let session = SftpSession::connect(&address, password.as_deref(), prompt.as_ref())?;
            Ok(collect_tree(&session, &remote_root, &filter))
        })
        .await
        .map_err(|e| CollectError::ConnectionError(format!("remote collection aborted: {}", e)))?
    }
}
