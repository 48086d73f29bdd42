//! Source loading: local files, remote URLs, uploaded bytes and pasted text.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::contract::SourceLoader;
use crate::error::LoadError;

/// Where the source code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Path(PathBuf),
    Url(String),
    /// Raw bytes of an uploaded file, decoded as UTF-8.
    Upload { filename: String, bytes: Vec<u8> },
    Text(String),
}

impl SourceInput {
    /// Anything starting with `http://` or `https://` is a URL, everything else a path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            SourceInput::Url(location.to_string())
        } else {
            SourceInput::Path(PathBuf::from(location))
        }
    }
}

/// Loaded source code plus a label describing where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub content: String,
    pub origin: String,
}

impl SourceText {
    pub fn new(content: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: origin.into(),
        }
    }

    /// Code fence language guessed from the origin's file extension.
    pub fn language_hint(&self) -> Option<&'static str> {
        let trimmed = self
            .origin
            .split(&['?', '#'][..])
            .next()
            .unwrap_or(&self.origin);
        let ext = Path::new(trimmed).extension()?.to_str()?.to_ascii_lowercase();
        let lang = match ext.as_str() {
            "py" | "pyw" => "python",
            "rs" => "rust",
            "js" | "mjs" | "cjs" => "javascript",
            "ts" | "tsx" => "typescript",
            "go" => "go",
            "java" => "java",
            "kt" | "kts" => "kotlin",
            "c" | "h" => "c",
            "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
            "cs" => "csharp",
            "rb" => "ruby",
            "php" => "php",
            "swift" => "swift",
            "scala" => "scala",
            "sh" | "bash" => "bash",
            "sql" => "sql",
            "toml" => "toml",
            "yaml" | "yml" => "yaml",
            "json" => "json",
            _ => return None,
        };
        Some(lang)
    }
}

fn github_blob_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^(https?://)(?:www\.)?github\.com/([^/]+/[^/]+)/blob/(.+)$").ok()
        })
        .as_ref()
}

/// Rewrite a GitHub `blob` page URL to its raw-content equivalent. Other URLs are returned
/// unchanged.
pub fn rewrite_github_url(url: &str) -> String {
    match github_blob_pattern() {
        Some(pattern) => pattern
            .replace(url, "${1}raw.githubusercontent.com/${2}/${3}")
            .into_owned(),
        None => url.to_string(),
    }
}

/// Loader backed by the local filesystem and a reqwest client.
pub struct DefaultLoader {
    http: Client,
}

impl DefaultLoader {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn fetch_url(&self, url: &str) -> Result<SourceText, LoadError> {
        let resolved = rewrite_github_url(url);
        if resolved != url {
            debug!(original = %url, resolved = %resolved, "[LOAD] Rewrote GitHub blob URL");
        }
        info!(url = %resolved, "[LOAD] Fetching source from URL");

        let response = self.http.get(&resolved).send().await.map_err(|e| {
            error!(error = ?e, url = %resolved, "[LOAD] Request failed");
            LoadError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %resolved, "[LOAD] Server returned error status");
            return Err(LoadError::Status {
                url: resolved,
                status: status.as_u16(),
            });
        }

        let content = response.text().await?;
        Ok(SourceText::new(content, resolved))
    }

    async fn read_path(&self, path: &Path) -> Result<SourceText, LoadError> {
        info!(path = %path.display(), "[LOAD] Reading source file");
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(SourceText::new(content, path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(path = %path.display(), "[LOAD] File not found");
                Err(LoadError::NotFound(path.to_path_buf()))
            }
            Err(e) => {
                error!(error = ?e, path = %path.display(), "[LOAD] Failed to read file");
                Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
    }
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceLoader for DefaultLoader {
    async fn load(&self, input: SourceInput) -> Result<SourceText, LoadError> {
        let loaded = match input {
            SourceInput::Path(path) => self.read_path(&path).await?,
            SourceInput::Url(url) => self.fetch_url(&url).await?,
            SourceInput::Upload { filename, bytes } => {
                let content = String::from_utf8(bytes).map_err(|source| {
                    error!(filename = %filename, "[LOAD] Uploaded file is not UTF-8");
                    LoadError::InvalidUtf8 {
                        filename: filename.clone(),
                        source,
                    }
                })?;
                SourceText::new(content, filename)
            }
            SourceInput::Text(text) => SourceText::new(text, "<text>"),
        };

        // Applies to every input mode, including empty files and empty URL bodies.
        if loaded.content.is_empty() {
            error!(origin = %loaded.origin, "[LOAD] Source is empty");
            return Err(LoadError::Empty);
        }

        info!(
            origin = %loaded.origin,
            bytes = loaded.content.len(),
            "[LOAD] Source loaded"
        );
        Ok(loaded)
    }
}
