//! Read API wire format (v3.2 `analyzeResults` payloads).

use serde::{Deserialize, Serialize};

/// Operation state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PollStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    /// Anything the service sends that we do not recognise.
    #[serde(other)]
    Unknown,
}

impl PollStatus {
    /// `Succeeded` or `Failed`; the service will not change the outcome after.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "notStarted",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET <Operation-Location>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOperation {
    pub status: PollStatus,
    #[serde(default)]
    pub created_date_time: Option<String>,
    #[serde(default)]
    pub last_updated_date_time: Option<String>,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub version: Option<String>,
    /// Required: a finished analysis without pages is malformed, not empty.
    pub read_results: Vec<ReadResult>,
}

/// One page of recognised text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Option<Vec<f64>>,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl AnalyzeResult {
    /// Total number of lines across all pages.
    pub fn line_count(&self) -> usize {
        self.read_results.iter().map(|p| p.lines.len()).sum()
    }
}

/// Flatten pages then lines into plain text.
///
/// Every line is followed by `\n`; trailing whitespace of the whole result is
/// trimmed (leading whitespace is kept).
pub fn assemble_text(result: &AnalyzeResult) -> String {
    let mut text = String::new();
    for page in &result.read_results {
        for line in &page.lines {
            text.push_str(&line.text);
            text.push('\n');
        }
    }
    text.truncate(text.trim_end().len());
    text
}
