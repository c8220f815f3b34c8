//! Image variant selection by ordered tag preference.

use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use super::types::ImageRef;

/// No image url could be selected for a vehicle.
///
/// Carries both the offered images and the preference order so a failing
/// record can be diagnosed from the log alone.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No images in the object")]
    NoImages,

    #[error("No known tags in image list: {images:?}, known usable tags: {preference:?}")]
    NoUsableTag {
        images: Vec<ImageRef>,
        preference: Vec<String>,
    },
}

/// Picks the url of the most preferred image variant.
///
/// Pure and deterministic: images are deduplicated by tag (last write wins),
/// then the preference list is scanned in order and the first tag present
/// wins.
pub fn select_preferred_image(
    images: &[ImageRef],
    preference: &[String],
) -> Result<String, SelectionError> {
    if images.is_empty() {
        return Err(SelectionError::NoImages);
    }

    let by_tag: HashMap<&str, &str> = images
        .iter()
        .map(|image| (image.tag.as_str(), image.url.as_str()))
        .collect();

    for tag in preference {
        match by_tag.get(tag.as_str()) {
            Some(url) => return Ok((*url).to_string()),
            None => info!("key [{}] not in images", tag),
        }
    }

    Err(SelectionError::NoUsableTag {
        images: images.to_vec(),
        preference: preference.to_vec(),
    })
}
