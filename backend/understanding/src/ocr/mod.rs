//! Optical Character Recognition (OCR)
//!
//! Sends images to the Azure Computer Vision Read API and turns the finished
//! analysis into plain text.
//!
//! ```rust,ignore
//! use cardread_understanding::ocr::{ReadClient, ReadSettings};
//!
//! let client = ReadClient::new(ReadSettings::new(key, endpoint))?;
//! if let Some(text) = client.extract_text(&image_bytes, Some("image/png")).await {
//!     println!("{text}");
//! }
//! ```

mod client;
mod error;
mod policy;
mod transport;
mod types;
mod wire;

pub use client::{ReadClient, ReadSettings, OPERATION_LOCATION_HEADER, SUBSCRIPTION_KEY_HEADER};
pub use error::{OcrError, OcrErrorKind, Phase, TransportError};
pub use policy::PollPolicy;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{ExtractionRequest, OperationHandle, DEFAULT_MIME_TYPE};
pub use wire::{assemble_text, AnalyzeResult, Line, PollStatus, ReadOperation, ReadResult, Word};

use cardread_config::VisionConfig;
use tracing::error;

/// One-shot fail-soft extraction straight from a config section.
///
/// Builds a client per call; keep a [`ReadClient`] around instead when
/// extracting more than once.
pub async fn extract_text_from_config(
    config: &VisionConfig,
    image: &[u8],
    mime_type: Option<&str>,
) -> Option<String> {
    match ReadClient::from_config(config) {
        Ok(client) => client.extract_text(image, mime_type).await,
        Err(e) => {
            error!(error = %e, "Could not build OCR client");
            None
        }
    }
}
