use std::io::Cursor;

use image::{ImageError, ImageReader};
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::events::{DecodedImage, DecodedImageSet, UploadedImage};

// Decodes to RGBA8 so every later draw works on one concrete buffer type.
fn decode_rgba8(upload: &UploadedImage) -> Result<DecodedImage> {
    let decoded = ImageReader::new(Cursor::new(upload.data.as_ref()))
        .with_guessed_format()
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.decode())
        .map_err(|source| Error::Decode {
            name: upload.name.clone(),
            source,
        })?;
    Ok(DecodedImage::new(upload.name.clone(), decoded.to_rgba8()))
}

/// Decodes every upload, resolving once all of them have settled.
///
/// Results land in the slot of the upload they came from regardless of
/// completion order. A failed decode is logged and leaves its slot empty.
pub async fn load_images(uploads: &[UploadedImage]) -> DecodedImageSet {
    if uploads.is_empty() {
        return DecodedImageSet::default();
    }

    let mut slots: Vec<Option<DecodedImage>> = vec![None; uploads.len()];
    let mut tasks: JoinSet<(usize, Result<DecodedImage>)> = JoinSet::new();
    for (index, upload) in uploads.iter().enumerate() {
        let upload = upload.clone();
        tasks.spawn_blocking(move || (index, decode_rgba8(&upload)));
    }

    let mut settled = 0usize;
    while let Some(joined) = tasks.join_next().await {
        settled += 1;
        match joined {
            Ok((index, Ok(image))) => {
                debug!(index, name = %image.name, width = image.width(), height = image.height(), "decoded");
                slots[index] = Some(image);
            }
            Ok((index, Err(err))) => {
                let cause = std::error::Error::source(&err)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                error!(index, "{err}: {cause}");
            }
            Err(err) => error!("decode task failed: {err}"),
        }
    }

    let set = DecodedImageSet::from_slots(slots);
    debug!(settled, decoded = set.decoded_count(), "image batch settled");
    set
}
