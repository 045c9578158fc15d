//! Action dispatcher.
//!
//! Sends toggle and vote actions to the site without blocking the caller.
//! Each action runs on its own worker thread; outcomes come back as
//! `DispatchEvent`s that the caller drains with `poll_events`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use url::Url;

use transparent_types::{ActionKind, ActionRequest, Bid};

use crate::config::Config;
use crate::csrf::CsrfToken;
use crate::error::DispatchError;
use crate::interceptor::{CsrfInterceptor, Pipeline};
use crate::request::{OutgoingRequest, Response};
use crate::transport::{HttpTransport, Transport};

/// Outcome of an action, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// A vote succeeded; the view should refresh.
    ReloadRequested { action: ActionKind, bid: Bid },
    /// A vote failed (non-2xx status or transport error).
    Failed {
        action: ActionKind,
        bid: Bid,
        reason: String,
    },
}

/// Absolute URLs of the three action endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub toggle: Url,
    pub upvote: Url,
    pub downvote: Url,
}

impl Endpoints {
    /// Resolve endpoint paths against the page URL.
    pub fn resolve(
        page: &Url,
        toggle: &str,
        upvote: &str,
        downvote: &str,
    ) -> Result<Self, DispatchError> {
        Ok(Self {
            toggle: page.join(toggle)?,
            upvote: page.join(upvote)?,
            downvote: page.join(downvote)?,
        })
    }

    pub fn for_kind(&self, kind: ActionKind) -> &Url {
        match kind {
            ActionKind::Toggle => &self.toggle,
            ActionKind::Upvote => &self.upvote,
            ActionKind::Downvote => &self.downvote,
        }
    }
}

/// Sends actions for one page.
pub struct RequestDispatcher {
    pipeline: Pipeline,
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    event_tx: Sender<DispatchEvent>,
    event_rx: Receiver<DispatchEvent>,
    in_flight: Arc<AtomicUsize>,
}

impl RequestDispatcher {
    pub fn new(pipeline: Pipeline, endpoints: Endpoints, transport: Arc<dyn Transport>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            pipeline,
            transport,
            endpoints,
            event_tx,
            event_rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build a dispatcher from configuration and the page's cookie string.
    ///
    /// The CSRF token is read from `cookies` once, here.
    pub fn from_config(config: &Config, cookies: &str) -> Result<Self, DispatchError> {
        let transport =
            HttpTransport::new(config.user_agent(), config.timeout(), config.use_proxy())?;
        Self::from_config_with_transport(config, cookies, Arc::new(transport))
    }

    pub fn from_config_with_transport(
        config: &Config,
        cookies: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, DispatchError> {
        let page = config.page_url()?;
        let token = CsrfToken::from_cookies(cookies, config.cookie_name());
        if token.is_none() {
            warn!(
                "No '{}' cookie found; state-changing requests will not carry {}",
                config.cookie_name(),
                config.header_name()
            );
        }

        let endpoints = Endpoints::resolve(
            &page,
            config.endpoint(ActionKind::Toggle),
            config.endpoint(ActionKind::Upvote),
            config.endpoint(ActionKind::Downvote),
        )?;
        let csrf = CsrfInterceptor::with_header(token, config.header_name());
        let pipeline = Pipeline::standard(page, csrf);

        info!("Dispatcher ready for {}", pipeline.page());
        Ok(Self::new(pipeline, endpoints, transport))
    }

    pub fn page(&self) -> &Url {
        self.pipeline.page()
    }

    /// Enable or disable a module. Fire-and-forget: no event is reported.
    pub fn toggle(&self, bid: impl Into<Bid>, enabled: bool) {
        self.dispatch(ActionRequest::toggle(bid, enabled));
    }

    /// Upvote a module. Reports `ReloadRequested` on success.
    pub fn upvote(&self, bid: impl Into<Bid>) {
        self.dispatch(ActionRequest::upvote(bid));
    }

    /// Downvote a module. Reports `ReloadRequested` on success.
    pub fn downvote(&self, bid: impl Into<Bid>) {
        self.dispatch(ActionRequest::downvote(bid));
    }

    /// Send an action on a worker thread and return immediately.
    pub fn dispatch(&self, action: ActionRequest) {
        let kind = action.kind();
        let bid = action.bid().clone();

        let url = self.endpoints.for_kind(kind).clone();
        let mut request = OutgoingRequest::post_form(url, &action.form_fields());
        self.pipeline.apply(&mut request);

        debug!("Dispatching {} for bid {} to {}", kind, bid, request.url);

        let transport = Arc::clone(&self.transport);
        let event_tx = self.event_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);

        thread::spawn(move || {
            let _guard = InFlightGuard(in_flight);
            let result = transport.send(&request);
            if let Some(event) = outcome_event(kind, bid, result) {
                // Receiver lives as long as the dispatcher; a send error only
                // means the caller has gone away.
                let _ = event_tx.send(event);
            }
        });
    }

    /// Re-fetch the page itself. Goes through the same pipeline as actions.
    pub fn reload(&self) -> Result<Response, DispatchError> {
        let mut request = OutgoingRequest::get(self.page().clone());
        self.pipeline.apply(&mut request);
        info!("Reloading {}", request.url);
        self.transport.send(&request)
    }

    /// Drain all events reported since the last poll.
    pub fn poll_events(&mut self) -> Vec<DispatchEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Number of requests still waiting for a response.
    pub fn pending(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Block until no requests are in flight or `timeout` elapses.
    /// Returns true if everything finished.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.pending() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

/// Releases one in-flight slot when the worker ends, including by panic.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Map a transport result to the event the caller should see, if any.
fn outcome_event(
    kind: ActionKind,
    bid: Bid,
    result: Result<Response, DispatchError>,
) -> Option<DispatchEvent> {
    match result {
        Ok(res) if res.is_success() => {
            debug!("{} for bid {} succeeded ({})", kind, bid, res.status);
            kind.reloads_on_success()
                .then_some(DispatchEvent::ReloadRequested { action: kind, bid })
        }
        Ok(res) => {
            warn!("{} for bid {} rejected with status {}", kind, bid, res.status);
            kind.reloads_on_success().then(|| DispatchEvent::Failed {
                action: kind,
                bid,
                reason: format!("HTTP status {}", res.status),
            })
        }
        Err(e) => {
            warn!("{} for bid {} failed: {}", kind, bid, e);
            kind.reloads_on_success().then(|| DispatchEvent::Failed {
                action: kind,
                bid,
                reason: e.to_string(),
            })
        }
    }
}
