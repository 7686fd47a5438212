//! `cardread extract`: run one image through the Read API.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cardread_config::{CardreadConfig, PollConfig};
use cardread_understanding::ocr::{ExtractionRequest, OcrErrorKind};
use cardread_understanding::{CancelToken, ReadClient};

use crate::mime::detect_image_mime;

pub struct ExtractArgs<'a> {
    pub image: &'a Path,
    pub mime: Option<&'a str>,
    pub max_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
}

/// Print the extracted text on stdout. Returns whether text was produced.
pub async fn run(config: &CardreadConfig, args: ExtractArgs<'_>) -> Result<bool> {
    let mut vision = config.vision();
    let poll = vision.poll.get_or_insert_with(PollConfig::default);
    if let Some(max_attempts) = args.max_attempts {
        poll.max_attempts = Some(max_attempts);
    }
    if let Some(delay_ms) = args.delay_ms {
        poll.delay_ms = Some(delay_ms);
    }

    let client = ReadClient::from_config(&vision)?;
    if !client.is_configured() {
        eprintln!("OCR is not configured: set AZURE_VISION_KEY and AZURE_VISION_ENDPOINT (see `cardread check`).");
        return Ok(false);
    }

    let image = tokio::fs::read(args.image)
        .await
        .with_context(|| format!("Failed to read image: {}", args.image.display()))?;
    let mime = args.mime.unwrap_or_else(|| detect_image_mime(args.image));
    info!(path = %args.image.display(), mime, "Extracting text");

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match client.extract(ExtractionRequest::new(image, Some(mime)), &cancel).await {
        Ok(text) => {
            println!("{text}");
            Ok(true)
        }
        Err(e) if e.kind() == OcrErrorKind::Cancelled => {
            eprintln!("Interrupted.");
            Ok(false)
        }
        Err(e) => {
            eprintln!("No text extracted: {e}");
            Ok(false)
        }
    }
}
