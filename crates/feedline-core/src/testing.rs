// In-memory fetchers for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::watch;

use feedline_api::{Request, ResponseEnvelope};

use crate::cache::Fetch;

// ── GatedFetcher ────────────────────────────────────────────────────

/// Every fetch blocks until the gate is opened. Tracks call count and
/// whether an in-flight fetch was dropped before finishing.
pub(crate) struct GatedFetcher {
    gate: watch::Sender<bool>,
    calls: AtomicUsize,
    cancelled: Arc<AtomicBool>,
    fail: bool,
}

struct CancelGuard {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

impl GatedFetcher {
    pub(crate) fn new() -> Self {
        Self {
            gate: watch::Sender::new(false),
            calls: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
            fail: false,
        }
    }

    pub(crate) fn opened() -> Self {
        let f = Self::new();
        f.open();
        f
    }

    /// Closed gate; every fetch fails with a 503 once released.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub(crate) fn open(&self) {
        self.gate.send_replace(true);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Fetch for GatedFetcher {
    fn fetch(
        &self,
        request: Request,
    ) -> BoxFuture<'static, Result<ResponseEnvelope, feedline_api::Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        let flag = Arc::clone(&self.cancelled);
        let fail = self.fail;

        async move {
            let mut guard = CancelGuard { flag, armed: true };
            let _ = gate.wait_for(|open| *open).await;
            guard.armed = false;

            if fail {
                Err(feedline_api::Error::Status {
                    status: 503,
                    url: request.endpoint().to_owned(),
                })
            } else {
                Ok(ResponseEnvelope::new(200, format!("\"{}\"", request.identity())))
            }
        }
        .boxed()
    }
}

// ── StaticFetcher ───────────────────────────────────────────────────

#[derive(Clone)]
enum Reply {
    Envelope(ResponseEnvelope),
    Unavailable,
    Rejected,
}

/// Answers from a fixed routing table keyed by request identity.
/// Unknown identities get an empty 404.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<HashMap<String, usize>>,
    markers_seen: Mutex<Vec<Option<String>>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, identity: &str, envelope: ResponseEnvelope) -> &Self {
        self.insert(identity, Reply::Envelope(envelope))
    }

    pub(crate) fn json(&self, identity: &str, body: &str) -> &Self {
        self.route(identity, ResponseEnvelope::new(200, body.to_owned()))
    }

    /// Transport-level failure (recoverable).
    pub(crate) fn unavailable(&self, identity: &str) -> &Self {
        self.insert(identity, Reply::Unavailable)
    }

    /// Request-construction failure (not recoverable).
    pub(crate) fn rejected(&self, identity: &str) -> &Self {
        self.insert(identity, Reply::Rejected)
    }

    pub(crate) fn calls(&self, identity: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(identity)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// `If-Modified-Since` values in call order.
    pub(crate) fn markers_seen(&self) -> Vec<Option<String>> {
        self.markers_seen.lock().unwrap().clone()
    }

    fn insert(&self, identity: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(identity.to_owned(), reply);
        self
    }
}

impl Fetch for StaticFetcher {
    fn fetch(
        &self,
        request: Request,
    ) -> BoxFuture<'static, Result<ResponseEnvelope, feedline_api::Error>> {
        let identity = request.identity().to_string();
        *self
            .calls
            .lock()
            .unwrap()
            .entry(identity.clone())
            .or_default() += 1;
        self.markers_seen
            .lock()
            .unwrap()
            .push(request.if_modified_since().map(str::to_owned));

        let reply = self.routes.lock().unwrap().get(&identity).cloned();
        let result = match reply {
            Some(Reply::Envelope(envelope)) => Ok(envelope),
            Some(Reply::Unavailable) => Err(feedline_api::Error::Status {
                status: 503,
                url: identity,
            }),
            Some(Reply::Rejected) => Err(feedline_api::Error::InvalidParameter {
                name: "endpoint".into(),
                reason: format!("rejected {identity}"),
            }),
            None => Ok(ResponseEnvelope::new(404, "")),
        };
        futures_util::future::ready(result).boxed()
    }
}
