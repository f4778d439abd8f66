//! Remote leaderboard
//!
//! Uses a fire-and-poll pattern: a `RankingRequest` is started on game over
//! and polled once per frame. The simulation never waits on it, and any
//! failure just leaves the ranking unavailable.
//!
//! Native builds run the blocking `ureq` client on a worker thread; the
//! browser build awaits `fetch` on the JS event loop. Both report into the
//! same channel.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use crate::highscores::{LeaderboardEntry, Ranking};

#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardError {
    /// Request failed or the server answered with an error
    Network(String),
    /// Response body was not a ranking
    Decode(String),
    /// No leaderboard configured
    Offline,
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::Network(msg) => write!(f, "Network error: {}", msg),
            LeaderboardError::Decode(msg) => write!(f, "Bad leaderboard data: {}", msg),
            LeaderboardError::Offline => write!(f, "Leaderboard offline"),
        }
    }
}

impl std::error::Error for LeaderboardError {}

impl From<serde_json::Error> for LeaderboardError {
    fn from(e: serde_json::Error) -> Self {
        LeaderboardError::Decode(e.to_string())
    }
}

/// Outcome of one submit-then-fetch request
pub type RankingResult = Result<Ranking, LeaderboardError>;

/// Score submission and ranking fetch
pub trait LeaderboardService: Send + Sync + 'static {
    fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError>;
    /// Every stored entry, in any order
    fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Submit (if any) then fetch without blocking the caller; the result
    /// goes to `done`.
    fn start(
        self: Arc<Self>,
        submission: Option<LeaderboardEntry>,
        done: Sender<RankingResult>,
    ) {
        start_job(move || {
            let _ = done.send(run_request(&*self, submission.as_ref()));
        });
    }
}

/// Always unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLeaderboard;

impl LeaderboardService for OfflineLeaderboard {
    fn submit(&self, _entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        Err(LeaderboardError::Offline)
    }

    fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Err(LeaderboardError::Offline)
    }
}

/// Process-local leaderboard (demos and tests)
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    entries: Mutex<Vec<LeaderboardEntry>>,
}

impl MemoryLeaderboard {
    pub fn with_entries(entries: Vec<LeaderboardEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl LeaderboardService for MemoryLeaderboard {
    fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        self.entries
            .lock()
            .map_err(|_| LeaderboardError::Network("poisoned".into()))?
            .push(entry.clone());
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| LeaderboardError::Network("poisoned".into()))?;
        Ok(entries.clone())
    }
}

/// Decode a Firebase-style listing: `null`, an object keyed by push id, or an array.
/// Malformed entries are skipped.
pub fn decode_entries(value: serde_json::Value) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    use serde_json::Value;

    let items: Vec<Value> = match value {
        Value::Null => Vec::new(),
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items,
        other => {
            return Err(LeaderboardError::Decode(format!(
                "expected object or array, got {}",
                other
            )));
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<LeaderboardEntry>(v).ok())
        .collect())
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpLeaderboard;

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use std::time::Duration;

    use super::{LeaderboardError, LeaderboardService, decode_entries};
    use crate::highscores::LeaderboardEntry;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// REST leaderboard: POST an entry, GET the whole collection
    pub struct HttpLeaderboard {
        url: String,
        agent: ureq::Agent,
    }

    impl HttpLeaderboard {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            }
        }
    }

    impl From<ureq::Error> for LeaderboardError {
        fn from(e: ureq::Error) -> Self {
            LeaderboardError::Network(e.to_string())
        }
    }

    impl LeaderboardService for HttpLeaderboard {
        fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
            self.agent.post(&self.url).send_json(entry)?;
            Ok(())
        }

        fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            let body: serde_json::Value = self
                .agent
                .get(&self.url)
                .call()?
                .into_json()
                .map_err(|e| LeaderboardError::Decode(e.to_string()))?;
            decode_entries(body)
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchLeaderboard;

#[cfg(target_arch = "wasm32")]
mod fetch {
    use std::sync::Arc;
    use std::sync::mpsc::Sender;

    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, Response};

    use super::{LeaderboardError, LeaderboardService, RankingResult, decode_entries};
    use crate::highscores::{LeaderboardEntry, Ranking};

    /// REST leaderboard over the browser's `fetch`
    pub struct FetchLeaderboard {
        url: String,
    }

    impl FetchLeaderboard {
        pub fn new(url: impl Into<String>) -> Self {
            Self { url: url.into() }
        }

        async fn request(&self, submission: Option<&LeaderboardEntry>) -> RankingResult {
            if let Some(entry) = submission {
                let body = serde_json::to_string(entry)?;
                if let Err(e) = self.send("POST", Some(&body)).await {
                    log::warn!("Score submission failed: {}", e);
                }
            }
            let text = self.send("GET", None).await?;
            let body: serde_json::Value = serde_json::from_str(&text)?;
            Ok(Ranking::from_entries(decode_entries(body)?))
        }

        async fn send(&self, method: &str, body: Option<&str>) -> Result<String, LeaderboardError> {
            let init = RequestInit::new();
            init.set_method(method);
            if let Some(body) = body {
                init.set_body(&JsValue::from_str(body));
            }
            let request = Request::new_with_str_and_init(&self.url, &init).map_err(js_error)?;
            if body.is_some() {
                request
                    .headers()
                    .set("Content-Type", "application/json")
                    .map_err(js_error)?;
            }

            let window = web_sys::window()
                .ok_or_else(|| LeaderboardError::Network("no window".into()))?;
            let response: Response = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(js_error)?
                .dyn_into()
                .map_err(js_error)?;
            if !response.ok() {
                return Err(LeaderboardError::Network(format!("HTTP {}", response.status())));
            }

            let text = JsFuture::from(response.text().map_err(js_error)?)
                .await
                .map_err(js_error)?;
            text.as_string()
                .ok_or_else(|| LeaderboardError::Decode("response body is not text".into()))
        }
    }

    fn js_error(e: JsValue) -> LeaderboardError {
        LeaderboardError::Network(format!("{:?}", e))
    }

    impl LeaderboardService for FetchLeaderboard {
        // The browser has no blocking HTTP; everything goes through `start`
        fn submit(&self, _entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Network("blocking request in the browser".into()))
        }

        fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            Err(LeaderboardError::Network("blocking request in the browser".into()))
        }

        fn start(
            self: Arc<Self>,
            submission: Option<LeaderboardEntry>,
            done: Sender<RankingResult>,
        ) {
            wasm_bindgen_futures::spawn_local(async move {
                let _ = done.send(self.request(submission.as_ref()).await);
            });
        }
    }
}

/// Latest known state of the ranking
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RankingStatus {
    /// Nothing requested this run
    #[default]
    Idle,
    Pending,
    Ready(Ranking),
    /// Request failed; the game carries on without a ranking
    Unavailable,
}

impl RankingStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RankingStatus::Pending)
    }

    pub fn ranking(&self) -> Option<&Ranking> {
        match self {
            RankingStatus::Ready(ranking) => Some(ranking),
            _ => None,
        }
    }
}

/// Submit (optional) then fetch, running off the frame loop
pub struct RankingRequest {
    rx: Receiver<RankingResult>,
    status: RankingStatus,
}

impl RankingRequest {
    /// Start the request. Returns immediately.
    pub fn spawn(
        service: Arc<dyn LeaderboardService>,
        submission: Option<LeaderboardEntry>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        service.start(submission, tx);
        Self {
            rx,
            status: RankingStatus::Pending,
        }
    }

    /// Non-blocking check for the result
    pub fn poll(&mut self) -> &RankingStatus {
        if self.status.is_pending() {
            match self.rx.try_recv() {
                Ok(result) => self.status = Self::settle(result),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.status = RankingStatus::Unavailable,
            }
        }
        &self.status
    }

    /// Block until the result arrives or `timeout` passes (tools and tests)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait(&mut self, timeout: std::time::Duration) -> &RankingStatus {
        if self.status.is_pending() {
            match self.rx.recv_timeout(timeout) {
                Ok(result) => self.status = Self::settle(result),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.status = RankingStatus::Unavailable
                }
            }
        }
        &self.status
    }

    fn settle(result: RankingResult) -> RankingStatus {
        match result {
            Ok(ranking) => {
                log::info!("Ranking loaded ({} entries)", ranking.entries.len());
                RankingStatus::Ready(ranking)
            }
            Err(e) => {
                log::warn!("Ranking unavailable: {}", e);
                RankingStatus::Unavailable
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn start_job(job: impl FnOnce() + Send + 'static) {
    if let Err(e) = std::thread::Builder::new()
        .name("leaderboard".into())
        .spawn(job)
    {
        // The dropped sender turns into `Unavailable` on the next poll
        log::warn!("Could not start leaderboard request: {}", e);
    }
}

/// No threads in the browser; defer to the event loop so `frame()` returns first
#[cfg(target_arch = "wasm32")]
fn start_job(job: impl FnOnce() + Send + 'static) {
    wasm_bindgen_futures::spawn_local(async move { job() });
}

fn run_request<S: LeaderboardService + ?Sized>(
    service: &S,
    submission: Option<&LeaderboardEntry>,
) -> RankingResult {
    if let Some(entry) = submission {
        // A failed submit still shows whatever ranking exists
        if let Err(e) = service.submit(entry) {
            log::warn!("Score submission failed: {}", e);
        }
    }
    let entries = service.fetch_all()?;
    Ok(Ranking::from_entries(entries))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_decode_firebase_object() {
        let body = json!({
            "-Nabc": {"name": "ana", "score": 120},
            "-Nabd": {"name": "bo", "score": 300},
            "-Nabe": {"oops": true}
        });
        let mut entries = decode_entries(body).unwrap();
        entries.sort_by_key(|e| e.score);
        assert_eq!(
            entries,
            vec![LeaderboardEntry::new("ana", 120), LeaderboardEntry::new("bo", 300)]
        );
    }

    #[test]
    fn test_decode_null_and_bad_shapes() {
        assert!(decode_entries(serde_json::Value::Null).unwrap().is_empty());
        assert!(matches!(
            decode_entries(json!("nope")),
            Err(LeaderboardError::Decode(_))
        ));
    }

    #[test]
    fn test_request_submits_then_ranks() {
        let service = Arc::new(MemoryLeaderboard::with_entries(vec![
            LeaderboardEntry::new("a", 50),
            LeaderboardEntry::new("b", 700),
        ]));
        let mut request =
            RankingRequest::spawn(service.clone(), Some(LeaderboardEntry::new("me", 400)));

        let ranking = request.wait(WAIT).ranking().cloned().unwrap();
        assert_eq!(ranking.lines(), vec!["1. b - 700", "2. me - 400", "3. a - 50"]);
        assert_eq!(service.fetch_all().unwrap().len(), 3);
        // settled status is sticky
        assert!(request.poll().ranking().is_some());
    }

    #[test]
    fn test_offline_is_unavailable() {
        let mut request = RankingRequest::spawn(
            Arc::new(OfflineLeaderboard),
            Some(LeaderboardEntry::new("me", 10)),
        );
        assert_eq!(request.wait(WAIT), &RankingStatus::Unavailable);
    }

    /// Answers only when the test releases it
    #[derive(Default)]
    struct HeldLeaderboard {
        held: Mutex<Option<(Option<LeaderboardEntry>, Sender<RankingResult>)>>,
    }

    impl HeldLeaderboard {
        fn release(&self, entries: Vec<LeaderboardEntry>) {
            let (submission, done) = self.held.lock().unwrap().take().unwrap();
            let ranking = Ranking::from_entries(entries.into_iter().chain(submission));
            done.send(Ok(ranking)).unwrap();
        }
    }

    impl LeaderboardService for HeldLeaderboard {
        fn submit(&self, _entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
            unreachable!("requests go through start")
        }

        fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            unreachable!("requests go through start")
        }

        fn start(
            self: Arc<Self>,
            submission: Option<LeaderboardEntry>,
            done: Sender<RankingResult>,
        ) {
            *self.held.lock().unwrap() = Some((submission, done));
        }
    }

    #[test]
    fn test_async_service_reports_through_poll() {
        let service = Arc::new(HeldLeaderboard::default());
        let mut request =
            RankingRequest::spawn(service.clone(), Some(LeaderboardEntry::new("me", 80)));

        // spawn returns before the service answers
        assert!(request.poll().is_pending());
        assert!(request.poll().is_pending());

        service.release(vec![LeaderboardEntry::new("a", 200)]);
        let ranking = request.poll().ranking().cloned().unwrap();
        assert_eq!(ranking.lines(), vec!["1. a - 200", "2. me - 80"]);
    }

    #[test]
    fn test_dropped_service_is_unavailable() {
        let service = Arc::new(HeldLeaderboard::default());
        let mut request = RankingRequest::spawn(service.clone(), None);
        service.held.lock().unwrap().take();
        assert_eq!(request.poll(), &RankingStatus::Unavailable);
    }

    #[test]
    fn test_unreachable_server_is_unavailable() {
        let service = Arc::new(HttpLeaderboard::new("http://127.0.0.1:9/scores.json"));
        let mut request = RankingRequest::spawn(service, None);
        assert_eq!(request.wait(Duration::from_secs(15)), &RankingStatus::Unavailable);
    }
}
