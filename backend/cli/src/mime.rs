//! Image MIME type guessing for files handed to `cardread extract`.

use std::path::Path;

use cardread_understanding::ocr::DEFAULT_MIME_TYPE;

/// Guess an image MIME type from the file extension.
///
/// Only formats the Read API accepts are recognised; anything else gets the
/// generic default and is left for the service to judge.
pub fn detect_image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "pdf"          => "application/pdf",
        _              => DEFAULT_MIME_TYPE,
    }
}
