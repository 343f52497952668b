//! Upload submission.
//!
//! One `XMLHttpRequest` per upload (fetch cannot report upload progress).
//! Its callbacks push raw [`TransferSignal`]s into a channel;
//! [`UploadEvents`] drains the channel through an [`UploadOperation`],
//! which turns signals into [`UploadEvent`]s and enforces the ordering
//! rules: progress in transport order, at most one terminal event, and
//! nothing but `Aborted` once the handle has been cancelled.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, ProgressEvent, XmlHttpRequest};

use super::payload::UploadPayload;
use crate::config::{DropAreaOptions, I18n};
use crate::types::{CandidateFile, TransportError, UploadEvent, UploadFailure, UploadSuccess};

/// What the transport reports, before interpretation.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferSignal {
    Progress { loaded: f64, total: f64, computable: bool },
    Loaded { status: u16, status_text: String, body: String },
    NetworkError(String),
    Aborted,
}

/// `ceil(loaded / total * 100)`, or `None` when the total is unknown.
pub fn progress_percent(loaded: f64, total: f64, computable: bool) -> Option<u8> {
    if !computable || total <= 0.0 {
        return None;
    }
    let percent = (loaded / total * 100.0).ceil().clamp(0.0, 100.0);
    Some(percent as u8)
}

// =============================================================================
// Operation state machine
// =============================================================================

/// One in-flight submission.
#[derive(Debug)]
pub struct UploadOperation {
    file: CandidateFile,
    i18n: I18n,
    progress: Option<u8>,
    finished: bool,
}

impl UploadOperation {
    pub fn new(file: CandidateFile, i18n: I18n) -> Self {
        Self {
            file,
            i18n,
            progress: None,
            finished: false,
        }
    }

    /// Last reported percentage.
    pub fn progress(&self) -> Option<u8> {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Interpret one transport signal. Signals after the terminal one are
    /// ignored.
    pub fn handle(&mut self, signal: TransferSignal) -> Vec<UploadEvent> {
        if self.finished {
            return Vec::new();
        }

        match signal {
            TransferSignal::Progress { loaded, total, computable } => {
                match progress_percent(loaded, total, computable) {
                    Some(percent) => {
                        self.progress = Some(percent);
                        vec![UploadEvent::Progress(percent)]
                    }
                    None => Vec::new(),
                }
            }
            TransferSignal::Loaded { status, status_text, body } => {
                self.finished = true;
                self.on_loaded(status, status_text, &body)
            }
            TransferSignal::NetworkError(description) => {
                self.finished = true;
                vec![self.failure(TransportError::Network(description), None)]
            }
            TransferSignal::Aborted => {
                self.finished = true;
                vec![UploadEvent::Aborted]
            }
        }
    }

    /// Cancel the operation. Yields `Aborted` unless it already finished.
    pub fn abort(&mut self) -> Option<UploadEvent> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(UploadEvent::Aborted)
    }

    fn on_loaded(&mut self, status: u16, status_text: String, body: &str) -> Vec<UploadEvent> {
        let parsed = serde_json::from_str::<Value>(body);

        if !(200..300).contains(&status) {
            let error = TransportError::Http { status, status_text };
            return vec![self.failure(error, parsed.ok())];
        }

        match parsed {
            Ok(response) => {
                self.progress = Some(100);
                vec![
                    UploadEvent::Progress(100),
                    UploadEvent::Success(UploadSuccess::new(response, self.file.clone())),
                ]
            }
            Err(e) => vec![self.failure(TransportError::Parse(e.to_string()), None)],
        }
    }

    fn failure(&self, error: TransportError, body: Option<Value>) -> UploadEvent {
        log::warn!("Upload of '{}' failed: {}", self.file.name, error);
        UploadEvent::Failure(UploadFailure::new(error, body, &self.i18n))
    }
}

// =============================================================================
// Handle and event stream
// =============================================================================

/// Cancels one upload.
#[derive(Clone)]
pub struct UploadHandle {
    cancelled: Rc<Cell<bool>>,
    sink: UnboundedSender<TransferSignal>,
    request: Option<XmlHttpRequest>,
}

impl UploadHandle {
    /// Abort the transfer if it is still running. Once called, the event
    /// stream yields `Aborted` and ends.
    pub fn abort(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        log::info!("Upload aborted by user");

        // Wakes the event stream if it is waiting on the transport.
        let _ = self.sink.unbounded_send(TransferSignal::Aborted);

        if let Some(request) = &self.request {
            if let Err(e) = request.abort() {
                log::warn!("Failed to abort request: {:?}", e);
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Ordered events of one upload.
pub struct UploadEvents {
    signals: UnboundedReceiver<TransferSignal>,
    operation: UploadOperation,
    cancelled: Rc<Cell<bool>>,
    pending: VecDeque<UploadEvent>,
}

impl UploadEvents {
    /// Next event, or `None` once the operation is over.
    pub async fn next(&mut self) -> Option<UploadEvent> {
        loop {
            if self.cancelled.get() {
                self.pending.clear();
                return self.operation.abort();
            }
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.operation.is_finished() {
                return None;
            }

            let signal = self.signals.next().await?;
            let events = self.operation.handle(signal);
            self.pending.extend(events);
        }
    }
}

/// Wire a handle and an event stream around a signal channel.
pub fn transfer_channel(
    file: CandidateFile,
    i18n: I18n,
    request: Option<XmlHttpRequest>,
) -> (UnboundedSender<TransferSignal>, UploadHandle, UploadEvents) {
    let (sink, signals) = unbounded();
    let cancelled = Rc::new(Cell::new(false));

    let handle = UploadHandle {
        cancelled: cancelled.clone(),
        sink: sink.clone(),
        request,
    };
    let events = UploadEvents {
        signals,
        operation: UploadOperation::new(file, i18n),
        cancelled,
        pending: VecDeque::new(),
    };

    (sink, handle, events)
}

// =============================================================================
// Browser transport
// =============================================================================

/// Send a validated file to the configured endpoint.
pub fn start_upload(
    options: &DropAreaOptions,
    candidate: CandidateFile,
    payload: &UploadPayload,
) -> Result<(UploadHandle, UploadEvents), TransportError> {
    let file = candidate
        .blob
        .clone()
        .ok_or_else(|| TransportError::Setup("No file handle to send".to_string()))?;
    let form_data = payload.to_form_data(&file).map_err(setup_error)?;

    let request = XmlHttpRequest::new().map_err(setup_error)?;
    request
        .open_with_async(options.method.as_str(), &options.url, true)
        .map_err(setup_error)?;
    request
        .set_request_header("Cache-Control", "no-cache")
        .map_err(setup_error)?;

    log::info!(
        "Uploading '{}' ({} bytes) to {} {}",
        candidate.name,
        candidate.size,
        options.method,
        options.url
    );

    let (sink, handle, events) =
        transfer_channel(candidate, options.i18n.clone(), Some(request.clone()));
    attach_listeners(&request, &sink)?;

    request
        .send_with_opt_form_data(Some(&form_data))
        .map_err(setup_error)?;

    Ok((handle, events))
}

// The closures must outlive the request, which may finish after the widget
// has moved on to another upload, so they are leaked like the other
// long-lived listeners of the page.
fn attach_listeners(
    request: &XmlHttpRequest,
    sink: &UnboundedSender<TransferSignal>,
) -> Result<(), TransportError> {
    let upload = request.upload().map_err(setup_error)?;

    let tx = sink.clone();
    let on_progress = Closure::wrap(Box::new(move |ev: ProgressEvent| {
        let _ = tx.unbounded_send(TransferSignal::Progress {
            loaded: ev.loaded(),
            total: ev.total(),
            computable: ev.length_computable(),
        });
    }) as Box<dyn FnMut(ProgressEvent)>);
    upload.set_onprogress(Some(on_progress.as_ref().unchecked_ref()));
    on_progress.forget();

    let tx = sink.clone();
    let xhr = request.clone();
    let on_load = Closure::wrap(Box::new(move |_: Event| {
        let _ = tx.unbounded_send(TransferSignal::Loaded {
            status: xhr.status().unwrap_or(0),
            status_text: xhr.status_text().unwrap_or_default(),
            body: xhr.response_text().ok().flatten().unwrap_or_default(),
        });
    }) as Box<dyn FnMut(Event)>);
    request.set_onload(Some(on_load.as_ref().unchecked_ref()));
    on_load.forget();

    let tx = sink.clone();
    let xhr = request.clone();
    let on_error = Closure::wrap(Box::new(move |_: Event| {
        let description = xhr
            .status_text()
            .ok()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "network error".to_string());
        let _ = tx.unbounded_send(TransferSignal::NetworkError(description));
    }) as Box<dyn FnMut(Event)>);
    request.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();

    let tx = sink.clone();
    let on_abort = Closure::wrap(Box::new(move |_: Event| {
        let _ = tx.unbounded_send(TransferSignal::Aborted);
    }) as Box<dyn FnMut(Event)>);
    request.set_onabort(Some(on_abort.as_ref().unchecked_ref()));
    on_abort.forget();

    Ok(())
}

fn setup_error(e: JsValue) -> TransportError {
    TransportError::Setup(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn loaded(status: u16, body: &str) -> TransferSignal {
        TransferSignal::Loaded {
            status,
            status_text: if status == 200 { "OK" } else { "Not Found" }.to_string(),
            body: body.to_string(),
        }
    }

    fn progress(loaded: f64, total: f64) -> TransferSignal {
        TransferSignal::Progress { loaded, total, computable: true }
    }

    async fn collect(events: &mut UploadEvents) -> Vec<UploadEvent> {
        let mut out = Vec::new();
        while let Some(event) = events.next().await {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0.0, 1000.0, true), Some(0));
        assert_eq!(progress_percent(1.0, 1000.0, true), Some(1));
        assert_eq!(progress_percent(333.0, 1000.0, true), Some(34));
        assert_eq!(progress_percent(1000.0, 1000.0, true), Some(100));
        assert_eq!(progress_percent(500.0, 1000.0, false), None);
        assert_eq!(progress_percent(500.0, 0.0, true), None);
    }

    #[test]
    fn test_success_reaches_100() {
        let file = CandidateFile::new("photo.jpg", 2048);
        let (sink, _handle, mut events) = transfer_channel(file, I18n::default(), None);

        sink.unbounded_send(progress(512.0, 2048.0)).unwrap();
        sink.unbounded_send(progress(2048.0, 2048.0)).unwrap();
        sink.unbounded_send(loaded(200, r#"{"file_name":"abc.jpg"}"#)).unwrap();

        let out = block_on(collect(&mut events));
        assert_eq!(out.len(), 4);
        assert!(matches!(out[0], UploadEvent::Progress(25)));
        assert!(matches!(out[1], UploadEvent::Progress(100)));
        assert!(matches!(out[2], UploadEvent::Progress(100)));
        match &out[3] {
            UploadEvent::Success(success) => {
                assert_eq!(success.response, json!({"file_name": "abc.jpg"}));
                assert_eq!(success.file_name.as_deref(), Some("abc.jpg"));
                assert_eq!(success.file.name, "photo.jpg");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_total_reports_nothing() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        let events = op.handle(TransferSignal::Progress {
            loaded: 10.0,
            total: 0.0,
            computable: false,
        });
        assert!(events.is_empty());
        assert_eq!(op.progress(), None);
    }

    #[test]
    fn test_progress_not_deduplicated() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        assert_eq!(op.handle(progress(1.0, 10.0)).len(), 1);
        assert_eq!(op.handle(progress(1.0, 10.0)).len(), 1);
        assert_eq!(op.progress(), Some(10));
    }

    #[test]
    fn test_http_error_keeps_json_body() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        let events = op.handle(loaded(404, r#"{"error":"no such endpoint"}"#));
        match events.as_slice() {
            [UploadEvent::Failure(failure)] => {
                assert_eq!(failure.message, "Err: Not Found");
                assert_eq!(failure.body, Some(json!({"error": "no such endpoint"})));
                assert_eq!(
                    failure.error,
                    TransportError::Http { status: 404, status_text: "Not Found".into() }
                );
            }
            other => panic!("expected one failure, got {:?}", other),
        }
    }

    #[test]
    fn test_http_error_with_html_body() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        let events = op.handle(loaded(500, "<html>oops</html>"));
        match events.as_slice() {
            [UploadEvent::Failure(failure)] => {
                assert_eq!(failure.body, None);
                assert!(failure.payload().as_str().unwrap().contains("500"));
            }
            other => panic!("expected one failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_success_is_failure() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        let events = op.handle(loaded(200, "not json"));
        assert!(matches!(
            events.as_slice(),
            [UploadEvent::Failure(UploadFailure { error: TransportError::Parse(_), .. })]
        ));
    }

    #[test]
    fn test_network_error() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        let events = op.handle(TransferSignal::NetworkError("network error".into()));
        match events.as_slice() {
            [UploadEvent::Failure(failure)] => assert_eq!(failure.message, "Err: network error"),
            other => panic!("expected one failure, got {:?}", other),
        }
    }

    #[test]
    fn test_single_terminal_event() {
        let mut op = UploadOperation::new(CandidateFile::new("a.jpg", 1), I18n::default());
        assert_eq!(op.handle(loaded(200, "{}")).len(), 2);
        assert!(op.is_finished());
        assert!(op.handle(progress(5.0, 10.0)).is_empty());
        assert!(op.handle(TransferSignal::NetworkError("late".into())).is_empty());
        assert!(op.abort().is_none());
    }

    #[test]
    fn test_abort_suppresses_queued_outcome() {
        let file = CandidateFile::new("photo.jpg", 100);
        let (sink, handle, mut events) = transfer_channel(file, I18n::default(), None);

        sink.unbounded_send(progress(50.0, 100.0)).unwrap();
        let first = block_on(events.next());
        assert!(matches!(first, Some(UploadEvent::Progress(50))));

        // The response lands before the stream is polled again.
        sink.unbounded_send(loaded(200, "{}")).unwrap();
        handle.abort();
        handle.abort();
        assert!(handle.is_cancelled());

        let rest = block_on(collect(&mut events));
        assert_eq!(rest.len(), 1);
        assert!(matches!(rest[0], UploadEvent::Aborted));
    }

    #[test]
    fn test_abort_after_success_is_silent() {
        let file = CandidateFile::new("photo.jpg", 100);
        let (sink, handle, mut events) = transfer_channel(file, I18n::default(), None);

        sink.unbounded_send(loaded(200, "{}")).unwrap();
        let out = block_on(collect(&mut events));
        assert!(out.last().is_some_and(UploadEvent::is_terminal));

        handle.abort();
        assert!(block_on(events.next()).is_none());
    }
}
