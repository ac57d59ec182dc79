use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::events::{FileSource, SelectedFile, UploadedImage};

/// Reads a selected file into its encoded form.
pub async fn read_file(file: SelectedFile) -> Result<UploadedImage> {
    let data: Arc<[u8]> = match file.source {
        FileSource::Memory(bytes) => bytes,
        FileSource::Path(path) => {
            let bytes = tokio::fs::read(&path).await.map_err(|source| Error::Read {
                name: file.name.clone(),
                source,
            })?;
            Arc::from(bytes)
        }
    };
    debug!(name = %file.name, bytes = data.len(), "read upload");
    Ok(UploadedImage {
        name: file.name,
        data,
    })
}
