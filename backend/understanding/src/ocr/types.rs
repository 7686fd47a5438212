//! Request-side values for one extraction.

/// Used when the caller does not say what kind of image it has.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Image bytes plus a MIME tag. The tag is informational only: the Read API
/// sniffs the format itself and the upload is always `application/octet-stream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    image: Vec<u8>,
    mime_type: String,
}

impl ExtractionRequest {
    pub fn new(image: impl Into<Vec<u8>>, mime_type: Option<&str>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        Self {
            image: image.into(),
            mime_type,
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Give up the bytes for upload.
    pub fn into_image(self) -> Vec<u8> {
        self.image
    }
}

/// URL from `Operation-Location`, valid while the job is being polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(String);

impl OperationHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
