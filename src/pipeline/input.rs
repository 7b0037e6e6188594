//! Input resolution: turn a path, URL, or uploaded bytes into a local PDF file.
//!
//! ## Why stage into a temp directory?
//!
//! pdfium opens documents from a file-system path. Downloads and uploads are
//! written into a `TempDir` owned by the returned [`ResolvedInput`], so the
//! staged copy disappears when the input is dropped, whether the run
//! succeeded or failed.
//!
//! A missing `%PDF` header is only logged. Some producers prepend junk bytes
//! that pdfium tolerates, and a document pdfium truly cannot open already
//! degrades to an empty extraction downstream.

use crate::error::SlidesError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// The resolved input: a local path, or a staged copy kept alive by its `TempDir`.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the PDF was downloaded into a temp directory.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
    /// Input was an in-memory upload written into a temp directory.
    Staged { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } | ResolvedInput::Staged { path, .. } => path,
        }
    }

    /// File stem, used as the deck title.
    pub fn title(&self) -> String {
        self.path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local PDF file path.
///
/// URLs are downloaded with `timeout_secs`; local paths are checked for
/// existence and read permission.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, SlidesError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SlidesError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Write uploaded bytes into a fresh temp directory under a sanitised name.
pub fn stage_bytes(bytes: &[u8], file_name: &str) -> Result<ResolvedInput, SlidesError> {
    let name = sanitise_file_name(file_name);
    let staging_err = |source: std::io::Error| SlidesError::StagingFailed {
        name: name.clone(),
        source,
    };

    let temp_dir = TempDir::new().map_err(staging_err)?;
    let path = temp_dir.path().join(&name);
    std::fs::write(&path, bytes).map_err(staging_err)?;
    check_magic(&path, bytes);

    debug!("Staged {} bytes at {}", bytes.len(), path.display());
    Ok(ResolvedInput::Staged {
        path,
        _temp_dir: temp_dir,
    })
}

/// Resolve a local file path, validating existence and read permission.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, SlidesError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(SlidesError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() {
                check_magic(&path, &magic);
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SlidesError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(SlidesError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, SlidesError> {
    info!("Downloading PDF from: {}", url);

    let failed = |reason: String| SlidesError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SlidesError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = filename_from_url(url);
    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            SlidesError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    let temp_dir = TempDir::new().map_err(|e| SlidesError::StagingFailed {
        name: filename.clone(),
        source: e,
    })?;
    let file_path = temp_dir.path().join(&filename);
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| SlidesError::StagingFailed {
            name: filename.clone(),
            source: e,
        })?;
    check_magic(&file_path, &bytes);

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

fn check_magic(path: &Path, head: &[u8]) {
    if head.len() >= 4 && &head[..4] != PDF_MAGIC {
        warn!(
            "{} does not start with %PDF (found {:?}); trying anyway",
            path.display(),
            &head[..4]
        );
    }
}

/// Last URL path segment if it looks like a file name, else `downloaded.pdf`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .map(|last| sanitise_file_name(&last))
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

/// Reduce a user-supplied name to a safe single path component ending in `.pdf`.
fn sanitise_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let mut clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    clean = clean.trim_start_matches('.').to_string();

    if clean.is_empty() {
        clean = "upload".to_string();
    }
    if !clean.to_ascii_lowercase().ends_with(".pdf") {
        clean.push_str(".pdf");
    }
    clean
}
