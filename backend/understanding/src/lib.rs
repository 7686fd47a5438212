pub mod cancel;
pub mod ocr;

pub use cancel::CancelToken;
pub use ocr::{extract_text_from_config, OcrError, OcrErrorKind, PollPolicy, ReadClient, ReadSettings};
