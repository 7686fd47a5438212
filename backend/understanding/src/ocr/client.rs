//! Azure Computer Vision Read API client.
//!
//! Two legs:
//! 1. `POST {endpoint}/{api_path}` with the raw image; the service answers
//!    202 and an `Operation-Location` header naming the queued job.
//! 2. `GET` that URL on the poll cadence until the job reports `succeeded`
//!    or `failed`, or the attempt ceiling is hit.
//!
//! `extract` reports every failure as an [`OcrError`]; `extract_text` is the
//! fail-soft projection that only says "text" or "nothing".

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use cardread_config::{usable_credentials, VisionConfig};
use cardread_config::defaults::{DEFAULT_API_PATH, DEFAULT_REQUEST_TIMEOUT_MS};
use cardread_logging::redact_for_log;

use super::error::{OcrError, OcrErrorKind, Phase, TransportError};
use super::policy::PollPolicy;
use super::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use super::types::{ExtractionRequest, OperationHandle};
use super::wire::{assemble_text, AnalyzeResult, PollStatus, ReadOperation};
use crate::cancel::CancelToken;

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const OPERATION_LOCATION_HEADER: &str = "Operation-Location";
const OCTET_STREAM: &str = "application/octet-stream";

/// Longest service error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Everything the client needs to talk to one Read API resource.
#[derive(Debug, Clone)]
pub struct ReadSettings {
    pub key: Option<String>,
    pub endpoint: Option<String>,
    pub api_path: String,
    pub request_timeout: Duration,
    pub policy: PollPolicy,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            key: None,
            endpoint: None,
            api_path: DEFAULT_API_PATH.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            policy: PollPolicy::default(),
        }
    }
}

impl From<&VisionConfig> for ReadSettings {
    fn from(config: &VisionConfig) -> Self {
        let base = Self::default();
        Self {
            key: config.key.clone(),
            endpoint: config.endpoint.clone(),
            api_path: config.api_path.clone().unwrap_or(base.api_path),
            request_timeout: config
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(base.request_timeout),
            policy: config.poll.as_ref().map(PollPolicy::from).unwrap_or(base.policy),
        }
    }
}

impl ReadSettings {
    pub fn new(key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Key and endpoint when both are usable; `None` disables OCR.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        usable_credentials(self.key.as_deref(), self.endpoint.as_deref())
    }

    /// `{endpoint}/{api_path}` with exactly one slash between them.
    pub fn analyze_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            endpoint.trim().trim_end_matches('/'),
            self.api_path.trim_start_matches('/')
        )
    }
}

/// Read API client. Holds no per-request state, so one instance can serve
/// any number of concurrent extractions.
pub struct ReadClient {
    settings: ReadSettings,
    transport: Arc<dyn HttpTransport>,
}

impl ReadClient {
    pub fn new(settings: ReadSettings) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(settings.request_timeout)?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    pub fn from_config(config: &VisionConfig) -> Result<Self, TransportError> {
        Self::new(ReadSettings::from(config))
    }

    pub fn with_transport(settings: ReadSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self { settings, transport }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.settings.policy = policy;
        self
    }

    pub fn settings(&self) -> &ReadSettings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        self.settings.credentials().is_some()
    }

    /// Fail-soft extraction: `Some(text)` on success, `None` for any failure
    /// (including "not configured"). Diagnostics go to the log.
    pub async fn extract_text(&self, image: &[u8], mime_type: Option<&str>) -> Option<String> {
        self.extract_text_with_cancel(image, mime_type, &CancelToken::new()).await
    }

    pub async fn extract_text_with_cancel(
        &self,
        image: &[u8],
        mime_type: Option<&str>,
        cancel: &CancelToken,
    ) -> Option<String> {
        let request = ExtractionRequest::new(image, mime_type);
        self.extract(request, cancel).await.ok()
    }

    /// Submit `request`, poll until done, and return the recognised text.
    ///
    /// The request is consumed by the upload. No partial text is ever
    /// returned: either every page was read or this is an error.
    pub async fn extract(&self, request: ExtractionRequest, cancel: &CancelToken) -> Result<String, OcrError> {
        let Some((key, endpoint)) = self.settings.credentials() else {
            warn!("Vision credentials not found. Skipping OCR");
            return Err(OcrError::NotConfigured);
        };

        let request_id = Uuid::new_v4();
        let span = info_span!("ocr", %request_id);
        let outcome = self.run(key, endpoint, request, cancel).instrument(span.clone()).await;

        let _entered = span.enter();
        match &outcome {
            Ok(text) => info!(chars = text.chars().count(), "OCR extraction succeeded"),
            Err(e) if e.kind() == OcrErrorKind::Cancelled => info!("OCR extraction cancelled"),
            Err(e) => error!(error = %e, kind = ?e.kind(), "OCR extraction failed"),
        }
        outcome
    }

    async fn run(
        &self,
        key: &str,
        endpoint: &str,
        request: ExtractionRequest,
        cancel: &CancelToken,
    ) -> Result<String, OcrError> {
        info!(bytes = request.len(), mime = %request.mime_type(), "Starting OCR extraction");

        let handle = self.submit(key, endpoint, request, cancel).await?;
        debug!(operation = %handle, "OCR job queued");

        let result = self.poll(key, &handle, cancel).await?;
        Ok(assemble_text(&result))
    }

    async fn submit(
        &self,
        key: &str,
        endpoint: &str,
        request: ExtractionRequest,
        cancel: &CancelToken,
    ) -> Result<OperationHandle, OcrError> {
        let url = self.settings.analyze_url(endpoint);
        let headers = [("Content-Type", OCTET_STREAM), (SUBSCRIPTION_KEY_HEADER, key)];

        let response = guarded(cancel, self.transport.post(&url, &headers, request.into_image()))
            .await?
            .map_err(|source| OcrError::Transport { phase: Phase::Submit, source })?;
        check_status(Phase::Submit, &response)?;

        response
            .header(OPERATION_LOCATION_HEADER)
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(OperationHandle::new)
            .ok_or(OcrError::MissingOperationLocation)
    }

    /// Poll until a terminal status. At most one terminal status is ever
    /// observed: the loop exits on the first one.
    async fn poll(
        &self,
        key: &str,
        handle: &OperationHandle,
        cancel: &CancelToken,
    ) -> Result<AnalyzeResult, OcrError> {
        let policy = &self.settings.policy;
        let headers = [(SUBSCRIPTION_KEY_HEADER, key)];

        let mut status = PollStatus::NotStarted;
        let mut attempts: u32 = 0;
        let mut last: Option<ReadOperation> = None;

        while !status.is_terminal() {
            if !policy.should_poll(attempts) {
                return Err(OcrError::TimedOut { attempts, last_status: status });
            }

            guarded(cancel, tokio::time::sleep(policy.delay_for(attempts + 1))).await?;

            let response = guarded(cancel, self.transport.get(handle.as_str(), &headers))
                .await?
                .map_err(|source| OcrError::Transport { phase: Phase::Poll, source })?;
            check_status(Phase::Poll, &response)?;

            let operation: ReadOperation = serde_json::from_slice(&response.body)
                .map_err(|e| OcrError::MalformedResponse(e.to_string()))?;

            attempts += 1;
            status = operation.status;
            debug!(attempt = attempts, status = %status, "Polled OCR operation");
            last = Some(operation);
        }

        if status != PollStatus::Succeeded {
            return Err(OcrError::ServiceFailed { status });
        }

        last.and_then(|op| op.analyze_result).ok_or_else(|| {
            OcrError::MalformedResponse("succeeded without analyzeResult".to_string())
        })
    }
}

/// Run `fut` unless `cancel` fires first (or has already fired).
async fn guarded<T>(cancel: &CancelToken, fut: impl Future<Output = T>) -> Result<T, OcrError> {
    if cancel.is_cancelled() {
        return Err(OcrError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(OcrError::Cancelled),
        out = fut => Ok(out),
    }
}

fn check_status(phase: Phase, response: &HttpResponse) -> Result<(), OcrError> {
    if response.is_success() {
        return Ok(());
    }
    Err(OcrError::HttpStatus {
        phase,
        status: response.status,
        body: redact_for_log(&response.body_text(), MAX_ERROR_BODY_CHARS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const KEY: &str = "0123456789abcdef0123456789abcdef";
    const ENDPOINT: &str = "https://res.example.com/";
    const HANDLE: &str = "https://res.example.com/vision/v3.2/read/analyzeResults/op-1";

    #[derive(Debug, Clone)]
    struct Call {
        method: &'static str,
        url: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    /// Scripted Read API. Submits replay `submits` in order (last one
    /// repeats); each operation URL replays `polls` in order (last repeats).
    #[derive(Default)]
    struct ScriptedTransport {
        submits: Vec<Result<HttpResponse, String>>,
        polls: Vec<Result<HttpResponse, String>>,
        cancel_after_polls: Option<(usize, CancelToken)>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedTransport {
        fn new(submit: HttpResponse, polls: Vec<HttpResponse>) -> Self {
            Self {
                submits: vec![Ok(submit)],
                polls: polls.into_iter().map(Ok).collect(),
                ..Default::default()
            }
        }

        fn record(&self, method: &'static str, url: &str, headers: &[(&str, &str)], body: Vec<u8>) -> usize {
            let mut calls = self.calls.lock().unwrap();
            let previous = calls.iter().filter(|c| c.method == method && (method == "POST" || c.url == url)).count();
            calls.push(Call {
                method,
                url: url.to_string(),
                headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                body,
            });
            previous
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, method: &str) -> usize {
            self.calls().iter().filter(|c| c.method == method).count()
        }
    }

    fn pick(script: &[Result<HttpResponse, String>], index: usize) -> Result<HttpResponse, TransportError> {
        let step = script.get(index).or(script.last()).expect("empty script");
        step.clone().map_err(TransportError::new)
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn post(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: Vec<u8>,
        ) -> Result<HttpResponse, TransportError> {
            let n = self.record("POST", url, headers, body);
            pick(&self.submits, n)
        }

        async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
            let n = self.record("GET", url, headers, Vec::new());
            if let Some((after, token)) = &self.cancel_after_polls {
                if n + 1 >= *after {
                    token.cancel();
                }
            }
            pick(&self.polls, n)
        }
    }

    fn accepted(handle: &str) -> HttpResponse {
        HttpResponse::new(202).with_header(OPERATION_LOCATION_HEADER, handle)
    }

    fn status(value: serde_json::Value) -> HttpResponse {
        HttpResponse::new(200).with_body(value.to_string())
    }

    fn running() -> HttpResponse {
        status(json!({ "status": "running" }))
    }

    fn succeeded(pages: serde_json::Value) -> HttpResponse {
        status(json!({ "status": "succeeded", "analyzeResult": { "readResults": pages } }))
    }

    fn hello_world() -> HttpResponse {
        succeeded(json!([{ "lines": [{ "text": "HELLO" }, { "text": "WORLD" }] }]))
    }

    fn client(transport: Arc<ScriptedTransport>) -> ReadClient {
        ReadClient::with_transport(ReadSettings::new(KEY, ENDPOINT), transport).with_policy(PollPolicy::immediate())
    }

    fn header<'a>(call: &'a Call, name: &str) -> Option<&'a str> {
        call.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn not_configured_makes_no_calls() {
        let combos: [(Option<&str>, Option<&str>); 5] = [
            (None, None),
            (Some(KEY), None),
            (None, Some(ENDPOINT)),
            (Some(""), Some(ENDPOINT)),
            (Some(KEY), Some("  ")),
        ];
        for (key, endpoint) in combos {
            let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![hello_world()]));
            let settings = ReadSettings {
                key: key.map(str::to_string),
                endpoint: endpoint.map(str::to_string),
                ..Default::default()
            };
            let client = ReadClient::with_transport(settings, transport.clone());

            assert!(!client.is_configured());
            assert_eq!(client.extract_text(b"img", None).await, None);
            let err = client
                .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), OcrErrorKind::NotConfigured);
            assert!(transport.calls().is_empty(), "calls made for {key:?}/{endpoint:?}");
        }
    }

    #[tokio::test]
    async fn missing_operation_location_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new(HttpResponse::new(202), vec![hello_world()]));
        let client = client(transport.clone());

        assert_eq!(client.extract_text(b"img", None).await, None);
        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::MissingOperationLocation));
        assert_eq!(err.kind(), OcrErrorKind::Protocol);
        assert_eq!(transport.count("GET"), 0);
    }

    #[tokio::test]
    async fn polls_until_succeeded_and_assembles_lines() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![
                running(),
                running(),
                succeeded(json!([
                    { "page": 1, "lines": [{ "text": "NAME: A. STUDENT" }, { "text": "ROLL 17CS042" }] },
                    { "page": 2, "lines": [{ "text": "VALID 2025  " }] }
                ])),
            ],
        ));
        let client = client(transport.clone());

        let text = client.extract_text(&[1, 2, 3, 4], Some("image/jpeg")).await;
        assert_eq!(text.as_deref(), Some("NAME: A. STUDENT\nROLL 17CS042\nVALID 2025"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 4);

        let submit = &calls[0];
        assert_eq!(submit.method, "POST");
        assert_eq!(submit.url, "https://res.example.com/vision/v3.2/read/analyze");
        assert_eq!(header(submit, "content-type"), Some("application/octet-stream"));
        assert_eq!(header(submit, SUBSCRIPTION_KEY_HEADER), Some(KEY));
        assert_eq!(submit.body, vec![1, 2, 3, 4]);

        for poll in &calls[1..] {
            assert_eq!(poll.method, "GET");
            assert_eq!(poll.url, HANDLE);
            assert_eq!(header(poll, SUBSCRIPTION_KEY_HEADER), Some(KEY));
        }
    }

    #[tokio::test]
    async fn never_terminal_times_out_after_exactly_ten_polls() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![status(json!({ "status": "notStarted" })), running()],
        ));
        let client = client(transport.clone());

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::TimedOut { attempts: 10, last_status: PollStatus::Running }));
        assert_eq!(transport.count("GET"), 10);

        assert_eq!(client.extract_text(b"img", None).await, None);
    }

    #[tokio::test]
    async fn unknown_status_counts_toward_ceiling() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![status(json!({ "status": "queued" }))]));
        let client = client(transport.clone()).with_policy(PollPolicy::immediate().with_max_attempts(3));

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::TimedOut { attempts: 3, last_status: PollStatus::Unknown }));
        assert_eq!(transport.count("GET"), 3);
    }

    #[tokio::test]
    async fn failed_status_ignores_payload() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![
                running(),
                status(json!({
                    "status": "failed",
                    "analyzeResult": { "readResults": [{ "lines": [{ "text": "IGNORED" }] }] }
                })),
                hello_world(),
            ],
        ));
        let client = client(transport.clone());

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::ServiceFailed { status: PollStatus::Failed }));
        assert_eq!(err.kind(), OcrErrorKind::ServiceFailure);
        // Stopped at the first terminal status.
        assert_eq!(transport.count("GET"), 2);
    }

    #[tokio::test]
    async fn end_to_end_hello_world() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![running(), hello_world()]));
        let client = client(transport.clone());

        let text = client.extract_text(b"B", Some("image/png")).await;
        assert_eq!(text.as_deref(), Some("HELLO\nWORLD"));
        assert_eq!(transport.count("GET"), 2);
    }

    #[tokio::test]
    async fn repeated_invocations_are_independent() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![hello_world()]));
        let client = client(transport.clone());

        let first = client.extract_text(b"same bytes", None).await;
        let second = client.extract_text(b"same bytes", None).await;
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("HELLO\nWORLD"));
        assert_eq!(transport.count("POST"), 2);
    }

    #[tokio::test]
    async fn concurrent_invocations_keep_their_own_handles() {
        let h1 = "https://res.example.com/ops/1";
        let h2 = "https://res.example.com/ops/2";
        let transport = Arc::new(ScriptedTransport {
            submits: vec![Ok(accepted(h1)), Ok(accepted(h2))],
            polls: vec![Ok(running()), Ok(hello_world())],
            ..Default::default()
        });
        let client = client(transport.clone());

        let (a, b) = tokio::join!(client.extract_text(b"a", None), client.extract_text(b"b", None));
        assert_eq!(a.as_deref(), Some("HELLO\nWORLD"));
        assert_eq!(b.as_deref(), Some("HELLO\nWORLD"));

        let calls = transport.calls();
        for handle in [h1, h2] {
            assert_eq!(calls.iter().filter(|c| c.url == handle).count(), 2);
        }
    }

    #[tokio::test]
    async fn submit_http_error_is_transport_and_redacted() {
        let body = format!(r#"{{"error":"bad key {KEY}"}}"#);
        let transport = Arc::new(ScriptedTransport::new(HttpResponse::new(401).with_body(body), vec![]));
        let client = client(transport.clone());

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::HttpStatus { phase: Phase::Submit, status: 401, .. }));
        assert_eq!(err.kind(), OcrErrorKind::Transport);
        assert!(!err.to_string().contains(KEY));
        assert_eq!(transport.count("GET"), 0);
    }

    #[tokio::test]
    async fn poll_http_error_is_transport() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![running(), HttpResponse::new(500).with_body("boom")],
        ));
        let client = client(transport.clone());

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::HttpStatus { phase: Phase::Poll, status: 500, .. }));
        assert_eq!(transport.count("GET"), 2);
    }

    #[tokio::test]
    async fn connection_failure_is_transport() {
        let transport = Arc::new(ScriptedTransport {
            submits: vec![Err("connection refused".into())],
            ..Default::default()
        });
        let client = client(transport);

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Transport { phase: Phase::Submit, .. }));
    }

    #[tokio::test]
    async fn malformed_poll_body_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![HttpResponse::new(200).with_body("<html>gateway</html>")],
        ));
        let err = client(transport)
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), OcrErrorKind::Protocol);
    }

    #[tokio::test]
    async fn succeeded_without_result_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![status(json!({ "status": "succeeded" }))]));
        let err = client(transport)
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn succeeded_without_pages_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![status(json!({ "status": "succeeded", "analyzeResult": {} }))],
        ));
        let client = client(transport);

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), OcrErrorKind::Protocol);
        assert_eq!(client.extract_text(b"img", None).await, None);
    }

    #[tokio::test]
    async fn page_without_lines_yields_no_partial_text() {
        let transport = Arc::new(ScriptedTransport::new(
            accepted(HANDLE),
            vec![succeeded(json!([{ "lines": [{ "text": "A" }] }, { "page": 2 }]))],
        ));
        let client = client(transport);

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &CancelToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), OcrErrorKind::Protocol);
        assert_eq!(client.extract_text(b"img", None).await, None);
    }

    #[tokio::test]
    async fn cancelled_before_start_makes_no_calls() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![hello_world()]));
        let client = client(transport.clone());
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), OcrErrorKind::Cancelled);
        assert!(transport.calls().is_empty());
        assert_eq!(client.extract_text_with_cancel(b"img", None, &cancel).await, None);
    }

    #[tokio::test]
    async fn cancel_during_polling_stops_further_calls() {
        let cancel = CancelToken::new();
        let transport = Arc::new(ScriptedTransport {
            submits: vec![Ok(accepted(HANDLE))],
            polls: vec![Ok(running())],
            cancel_after_polls: Some((2, cancel.clone())),
            ..Default::default()
        });
        let client = client(transport.clone());

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Cancelled));
        assert_eq!(transport.count("GET"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn default_policy_waits_one_second_per_poll() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![running(), running(), hello_world()]));
        let client = ReadClient::with_transport(ReadSettings::new(KEY, ENDPOINT), transport.clone());

        let started = tokio::time::Instant::now();
        let text = client.extract_text(b"img", None).await;
        let waited = started.elapsed();

        assert_eq!(text.as_deref(), Some("HELLO\nWORLD"));
        assert!(waited >= Duration::from_secs(3), "waited {waited:?}");
        assert!(waited < Duration::from_secs(4), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_the_wait() {
        let transport = Arc::new(ScriptedTransport::new(accepted(HANDLE), vec![running()]));
        let client = ReadClient::with_transport(ReadSettings::new(KEY, ENDPOINT), transport.clone());
        let cancel = CancelToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2_500)).await;
            canceller.cancel();
        });

        let err = client
            .extract(ExtractionRequest::new(b"img".to_vec(), None), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Cancelled));
        assert_eq!(transport.count("GET"), 2);
    }

    #[test]
    fn settings_from_config() {
        let config = VisionConfig {
            key: Some("k".into()),
            endpoint: Some("https://e.example".into()),
            poll: Some(cardread_config::PollConfig {
                max_attempts: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let settings = ReadSettings::from(&config);
        assert_eq!(settings.policy.max_attempts, 5);
        assert_eq!(settings.policy.delay_ms, 1_000);
        assert_eq!(settings.api_path, DEFAULT_API_PATH);
        assert_eq!(settings.analyze_url("https://e.example"), "https://e.example/vision/v3.2/read/analyze");
    }
}
