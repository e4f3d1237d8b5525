use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const MAX_EVIDENCE_FILES: usize = 5;
pub const MAX_EVIDENCE_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Write one evidence file to the upload directory under a generated name.
/// Client-supplied file names never become paths; only a short alphanumeric
/// extension is kept so the file stays openable. Returns the stored name.
pub async fn store_evidence(
    dir: &Path,
    original_name: Option<&str>,
    bytes: &[u8],
) -> Result<String> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("create upload directory {}", dir.display()))?;

    let id = Uuid::new_v4();
    let stored_name = match original_name.and_then(sanitized_extension) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    };

    let path = dir.join(&stored_name);
    let mut file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("create {}", path.display()))?;
    file.write_all(bytes)
        .await
        .with_context(|| format!("write {}", path.display()))?;

    Ok(stored_name)
}

/// Extension of the client file name, if it is purely alphanumeric and at
/// most 8 characters. Anything else is dropped.
fn sanitized_extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}
