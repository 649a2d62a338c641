//! Coverage fetch transport.
//!
//! Uses channel-based communication to bridge the asynchronous request with
//! the synchronous update loop, the same way tile downloads are handled:
//! the request runs on a background thread (native) or a spawned future
//! (wasm32) and its completion is polled with `try_recv`.
//!
//! Every request is tagged with a monotonically increasing sequence number.
//! The [`SequenceGuard`] rejects a completion that is older than one
//! already applied, so a slow early response can never overwrite the state
//! produced by a newer one.

use super::response::{parse_coverage_body, CoverageResponse};
use std::sync::mpsc::{channel, Receiver, Sender};
use thiserror::Error;

/// Native requests give up after this long.
#[cfg(not(target_arch = "wasm32"))]
const COVERAGE_TIMEOUT_SECS: u64 = 20;

/// Errors raised while fetching coverage.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request was rejected or timed out.
    #[error("request failed: {0}")]
    Transport(String),

    /// The body was not a coverage payload.
    #[error("invalid coverage payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// An issued coverage request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub url: String,
}

/// A finished coverage request.
#[derive(Debug)]
pub struct CoverageCompletion {
    pub seq: u64,
    pub result: Result<CoverageResponse, FetchError>,
}

/// Monotonic request numbering with stale-completion rejection.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    issued: u64,
    applied: Option<u64>,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next sequence number.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Latest sequence number handed out.
    pub fn latest(&self) -> u64 {
        self.issued
    }

    /// Rejects every request issued so far, applied or still in flight.
    pub fn invalidate(&mut self) {
        self.applied = Some(self.issued);
    }

    /// Accepts `seq` if it is newer than every completion applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq == 0 || seq > self.issued {
            return false;
        }
        if self.applied.is_some_and(|applied| seq <= applied) {
            return false;
        }
        self.applied = Some(seq);
        true
    }
}

/// Channel-based coverage fetcher.
///
/// No request is ever cancelled; superseded responses are discarded by the
/// engine's sequence guard when they arrive.
pub struct CoverageChannel {
    sender: Sender<CoverageCompletion>,
    receiver: Receiver<CoverageCompletion>,
}

impl Default for CoverageChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Spawns the request on a background thread. `wake` is called once the
    /// completion has been queued (typically to request a repaint).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn fetch<F>(&self, ticket: FetchTicket, wake: F)
    where
        F: Fn() + Send + 'static,
    {
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            log::debug!("Coverage request #{}: {}", ticket.seq, ticket.url);
            let result = fetch_coverage_native(&ticket.url);
            let _ = sender.send(CoverageCompletion {
                seq: ticket.seq,
                result,
            });
            wake();
        });
    }

    /// Spawns the request as a browser fetch.
    #[cfg(target_arch = "wasm32")]
    pub fn fetch<F>(&self, ticket: FetchTicket, wake: F)
    where
        F: Fn() + 'static,
    {
        let sender = self.sender.clone();

        wasm_bindgen_futures::spawn_local(async move {
            log::debug!("Coverage request #{}: {}", ticket.seq, ticket.url);
            let result = fetch_coverage_wasm(&ticket.url).await;
            let _ = sender.send(CoverageCompletion {
                seq: ticket.seq,
                result,
            });
            wake();
        });
    }

    /// Queues a completion directly, bypassing the network.
    pub fn complete(&self, seq: u64, result: Result<CoverageResponse, FetchError>) {
        let _ = self.sender.send(CoverageCompletion { seq, result });
    }

    /// Non-blocking check for a finished request.
    pub fn try_recv(&self) -> Option<CoverageCompletion> {
        self.receiver.try_recv().ok()
    }
}

/// Native request using a blocking HTTP client on the worker thread.
///
/// Error bodies (unknown key, forbidden area) arrive with non-2xx statuses
/// but still carry a JSON payload, so the status is not checked here.
#[cfg(not(target_arch = "wasm32"))]
fn fetch_coverage_native(url: &str) -> Result<CoverageResponse, FetchError> {
    let body = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(COVERAGE_TIMEOUT_SECS))
        .build()
        .and_then(|client| client.get(url).send())
        .and_then(|response| response.text())
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    parse_coverage_body(&body)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_coverage_wasm(url: &str) -> Result<CoverageResponse, FetchError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_error = |e: wasm_bindgen::JsValue| FetchError::Transport(format!("{:?}", e));

    let window =
        web_sys::window().ok_or_else(|| FetchError::Transport("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_error)?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| FetchError::Transport("fetch did not return a Response".to_string()))?;
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    let body = text
        .as_string()
        .ok_or_else(|| FetchError::Transport("response body is not text".to_string()))?;

    parse_coverage_body(&body)
}
