use std::path::Path;
use tokio::fs as async_fs;

pub fn normalize_path(path: &str) -> String {
    let path = Path::new(path);
    let normalized_path = path.strip_prefix("./").unwrap_or(path);

    normalized_path.to_string_lossy().replace('\\', "/")
}

/// `path` relative to `root`, with `/` separators.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize_path(&relative.to_string_lossy())
}

pub async fn read_file_content(file_path: &Path) -> Result<String, std::io::Error> {
    async_fs::read_to_string(file_path).await
}

/// Joins a remote directory and an entry name with `/`.
pub fn join_remote(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}
