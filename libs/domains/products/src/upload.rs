//! Upload coordinator: streams image content into the uploads directory.
//!
//! Each upload is written under a hidden `.{name}.part` temp file and renamed
//! into place only after every byte has been flushed and synced, so readers
//! never observe a half-written image. On failure or cancellation the temp
//! file is removed.

use futures::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::pin;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};

/// Longest sanitized original kept in a stored name, in bytes. Leaves room for
/// the uuid, separator and `.{name}.part` temp affixes under a 255-byte limit.
const MAX_ORIGINAL_BYTES: usize = 200;

/// Extensions longer than this are treated as part of the stem when trimming.
const MAX_EXTENSION_BYTES: usize = 16;

#[derive(Debug, Clone)]
pub struct UploadCoordinator {
    uploads_dir: PathBuf,
}

impl UploadCoordinator {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Create the uploads directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> ProductResult<()> {
        fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| upload_error("create uploads directory", e))
    }

    /// `{uuid}-{sanitized original}`, or the bare uuid when nothing survives
    /// sanitization. A fresh v4 uuid per call keeps names unique. Long
    /// originals are trimmed to 200 bytes, keeping the extension.
    pub fn stored_filename(original: &str) -> String {
        let token = Uuid::new_v4();
        let sanitized = truncate_filename(&sanitize_filename(original), MAX_ORIGINAL_BYTES);
        if sanitized.is_empty() {
            token.to_string()
        } else {
            format!("{}-{}", token, sanitized)
        }
    }

    /// Write `stream` to a new uniquely named file and return that name.
    ///
    /// A stream error is returned as is after the temp file is discarded.
    /// Retrying always produces a different filename; partial writes are
    /// never resumed.
    #[instrument(skip(self, stream), fields(uploads_dir = %self.uploads_dir.display()))]
    pub async fn store<S, B, E>(&self, stream: S, original_filename: &str) -> ProductResult<String>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<ProductError>,
    {
        let stored = Self::stored_filename(original_filename);
        let final_path = self.uploads_dir.join(&stored);
        let mut partial = PartialFile::new(self.uploads_dir.join(format!(".{}.part", stored)));

        let written = match write_stream(partial.path(), stream).await {
            Ok(written) => written,
            Err(e) => {
                partial.discard().await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(partial.path(), &final_path).await {
            partial.discard().await;
            return Err(upload_error("promote uploaded file", e));
        }
        partial.disarm();

        info!(filename = %stored, bytes = written, "Upload stored");
        Ok(stored)
    }
}

/// Strip whitespace, `:`, `/` and `\` from a client-supplied filename.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ':' | '/' | '\\'))
        .collect()
}

/// Shorten `name` to at most `max_bytes` on a char boundary, keeping a short
/// trailing extension intact.
fn truncate_filename(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let extension = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => &name[dot..],
        _ => "",
    };
    let stem = &name[..name.len() - extension.len()];

    let mut end = max_bytes.saturating_sub(extension.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &stem[..end], extension)
}

async fn write_stream<S, B, E>(path: &Path, stream: S) -> ProductResult<u64>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<ProductError>,
{
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| upload_error("create temp file", e))?;

    let mut stream = pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::into)?;
        let bytes = chunk.as_ref();
        file.write_all(bytes)
            .await
            .map_err(|e| upload_error("write upload", e))?;
        written += bytes.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| upload_error("flush upload", e))?;
    file.sync_all()
        .await
        .map_err(|e| upload_error("sync upload", e))?;

    Ok(written)
}

fn upload_error(action: &str, err: io::Error) -> ProductError {
    ProductError::Upload(format!("failed to {}: {}", action, err))
}

/// Temp file removed on drop unless disarmed.
///
/// Drop covers request cancellation, where the owning future is dropped
/// mid-write and no async cleanup can run in place.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    async fn discard(&mut self) {
        self.armed = false;
        match fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Discarded partial upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to discard partial upload"),
        }
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let path = std::mem::take(&mut self.path);
        warn!(path = %path.display(), "Upload cancelled, discarding partial file");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let _ = fs::remove_file(&path).await;
                });
            }
            Err(_) => {
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}
