//! Object Storage
//!
//! Uploaded cover images. The store only keeps bytes and issues a URL;
//! it never inspects or transforms the image.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::io::AsyncWriteExt;

use crate::domain::{DomainError, DomainResult};

/// Scheme + host the asset protocol serves local files from
pub const ASSET_URL_PREFIX: &str = "asset://localhost";

/// Sub-directory of the assets dir holding uploaded covers
pub const IMAGE_DIR: &str = "anime-images";

/// Suffixed names tried before giving up on a crowded millisecond
const MAX_NAME_ATTEMPTS: u32 = 100;

const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a name derived from `name_hint`, return their URL
    async fn upload(&self, bytes: Vec<u8>, name_hint: &str) -> DomainResult<String>;

    /// Remove an object this store issued. Missing objects are not an error.
    async fn delete(&self, url: &str) -> DomainResult<()>;
}

/// Object store backed by a local directory
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: assets_dir.into().join(IMAGE_DIR),
        }
    }

    fn object_path(&self, name: &str, millis: i64, attempt: u32) -> PathBuf {
        if attempt == 0 {
            self.root.join(format!("{}_{}", millis, name))
        } else {
            self.root.join(format!("{}_{}_{}", millis, attempt, name))
        }
    }

    /// Write `bytes` to a fresh file. Existing objects are never overwritten.
    async fn create_object(&self, name_hint: &str, bytes: &[u8]) -> DomainResult<PathBuf> {
        let name = sanitize_name(name_hint);
        let millis = chrono::Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.object_path(&name, millis, attempt);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await.map_err(|e| {
                        DomainError::Storage(format!("Failed to write image file: {}", e))
                    })?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(DomainError::Storage(format!("No free object name for {}", name)))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, bytes: Vec<u8>, name_hint: &str) -> DomainResult<String> {
        if bytes.is_empty() {
            return Err(DomainError::InvalidInput("Please choose an image.".to_string()));
        }
        ensure_image_name(name_hint)?;

        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.create_object(name_hint, &bytes).await?;

        log::info!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(asset_url(&path))
    }

    async fn delete(&self, url: &str) -> DomainResult<()> {
        let path = asset_path(url)
            .filter(|path| path.starts_with(&self.root))
            .filter(|path| !path.components().any(|c| c == Component::ParentDir))
            .ok_or_else(|| DomainError::InvalidInput(format!("Not an uploaded image: {}", url)))?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                log::info!("Removed image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep a file name safe for any filesystem
pub fn sanitize_name(name_hint: &str) -> String {
    let base = Path::new(name_hint)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Reject names whose guessed type is not an image
pub fn ensure_image_name(name_hint: &str) -> DomainResult<()> {
    match mime_guess::from_path(name_hint).first() {
        Some(mime) if mime.type_() == mime_guess::mime::IMAGE => Ok(()),
        _ => Err(DomainError::InvalidInput(format!(
            "{} is not an image file.",
            name_hint
        ))),
    }
}

/// URL the asset protocol resolves back to `path`
pub fn asset_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let encoded = utf8_percent_encode(&raw, PATH_SET).to_string();
    if encoded.starts_with('/') {
        format!("{}{}", ASSET_URL_PREFIX, encoded)
    } else {
        format!("{}/{}", ASSET_URL_PREFIX, encoded)
    }
}

/// Inverse of `asset_url`
pub fn asset_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix(ASSET_URL_PREFIX)?;
    let decoded = percent_decode_str(rest).decode_utf8_lossy().to_string();

    // Windows paths: /C:/Users... -> C:/Users...
    let decoded = if decoded.starts_with('/') && decoded.chars().nth(2) == Some(':') {
        decoded[1..].to_string()
    } else {
        decoded
    };
    Some(PathBuf::from(decoded))
}

/// Bytes and content type behind an asset URL, for the asset protocol
pub async fn read_asset(url: &str) -> DomainResult<(Vec<u8>, String)> {
    let path = asset_path(url)
        .ok_or_else(|| DomainError::InvalidInput(format!("Not an asset URL: {}", url)))?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DomainError::NotFound(path.display().to_string()),
        _ => DomainError::from(e),
    })?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((bytes, mime.to_string()))
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Decode pasted clipboard data, with or without a
/// `data:image/png;base64,` prefix.
/// Returns the bytes and a file name matching the declared type.
pub fn decode_data_url(data: &str) -> DomainResult<(Vec<u8>, String)> {
    let (header, payload) = match data.split_once(',') {
        Some((header, payload)) => (Some(header), payload),
        None => (None, data),
    };

    let extension = header
        .and_then(|h| h.strip_prefix("data:"))
        .and_then(|h| h.split(';').next())
        .and_then(|mime| mime_guess::get_mime_extensions_str(mime))
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("png");

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::InvalidInput(format!("Failed to decode pasted image: {}", e)))?;

    Ok((bytes, format!("clipboard.{}", extension)))
}
