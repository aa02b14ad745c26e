// ── Shared response cache ──
//
// At most one in-flight fetch per request identity. Every caller for the
// same identity gets a handle onto one join-once cell (`Shared` future)
// and receives the same `Arc<ResponseEnvelope>`. Handles are reference
// counted: when the last one is dropped a pending fetch is cancelled and
// the entry released; completed entries are kept according to the
// retention scope.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, ready};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_core::Stream;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use futures_util::stream;
use tracing::{debug, trace};

use feedline_api::{HttpClient, Request, RequestIdentity, ResponseEnvelope};

/// What every subscriber of one fetch receives.
pub type SharedResult = Result<Arc<ResponseEnvelope>, Arc<feedline_api::Error>>;

type SharedFetch = Shared<BoxFuture<'static, SharedResult>>;

// ── Fetch ───────────────────────────────────────────────────────────

/// Anything that can turn a [`Request`] into a [`ResponseEnvelope`].
///
/// The returned future must own everything it needs: the cache may keep
/// it alive after the caller is gone, and drops it to cancel.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(
        &self,
        request: Request,
    ) -> BoxFuture<'static, Result<ResponseEnvelope, feedline_api::Error>>;
}

impl Fetch for HttpClient {
    fn fetch(
        &self,
        request: Request,
    ) -> BoxFuture<'static, Result<ResponseEnvelope, feedline_api::Error>> {
        let client = self.clone();
        async move { client.get(&request).await }.boxed()
    }
}

// ── RetentionScope ──────────────────────────────────────────────────

/// How long a completed response is replayed to new subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionScope {
    /// Only while at least one handle to it is still alive.
    #[default]
    WhileReferenced,
    /// Until explicitly invalidated. Failed fetches are never retained.
    Forever,
}

// ── ResponseCache ───────────────────────────────────────────────────

struct Slot {
    generation: u64,
    future: SharedFetch,
    subscribers: usize,
}

struct CacheInner {
    slots: DashMap<RequestIdentity, Slot>,
    scope: RetentionScope,
    next_generation: AtomicU64,
}

/// De-duplicating, replaying cache in front of a [`Fetch`] implementation.
///
/// Cheaply cloneable; clones share entries.
pub struct ResponseCache<F> {
    fetcher: Arc<F>,
    inner: Arc<CacheInner>,
}

impl<F> Clone for ResponseCache<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Fetch> ResponseCache<F> {
    pub fn new(fetcher: Arc<F>, scope: RetentionScope) -> Self {
        Self {
            fetcher,
            inner: Arc::new(CacheInner {
                slots: DashMap::new(),
                scope,
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn scope(&self) -> RetentionScope {
        self.inner.scope
    }

    /// Subscribe to the response for `request`.
    ///
    /// Joins the pending or retained fetch for the same identity if there
    /// is one, otherwise starts a new fetch. Nothing is sent until some
    /// handle is polled.
    pub fn fetch(&self, request: Request) -> SharedResponse {
        let identity = request.identity();

        let (generation, future) = match self.inner.slots.entry(identity.clone()) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.subscribers += 1;
                trace!(%identity, subscribers = slot.subscribers, "joining shared fetch");
                (slot.generation, slot.future.clone())
            }
            Entry::Vacant(vacant) => {
                let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                debug!(%identity, generation, "starting fetch");
                let future = self
                    .fetcher
                    .fetch(request)
                    .map(|res| res.map(Arc::new).map_err(Arc::new))
                    .boxed()
                    .shared();
                vacant.insert(Slot {
                    generation,
                    future: future.clone(),
                    subscribers: 1,
                });
                (generation, future)
            }
        };

        SharedResponse {
            future,
            identity,
            generation,
            cache: Arc::clone(&self.inner),
        }
    }

    /// Drop any retained or pending entry for `identity`.
    ///
    /// Existing handles keep their fetch; the next `fetch` starts over.
    pub fn invalidate(&self, identity: &RequestIdentity) {
        if self.inner.slots.remove(identity).is_some() {
            debug!(%identity, "cache entry invalidated");
        }
    }

    /// Number of live entries (pending or retained).
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }
}

impl CacheInner {
    /// A handle went away. Release the entry once nobody holds it, unless
    /// it completed successfully under `Forever` retention.
    fn release(&self, identity: &RequestIdentity, generation: u64) {
        let Entry::Occupied(mut occupied) = self.slots.entry(identity.clone()) else {
            return;
        };

        let slot = occupied.get_mut();
        if slot.generation != generation {
            return;
        }
        slot.subscribers = slot.subscribers.saturating_sub(1);
        if slot.subscribers > 0 {
            return;
        }

        let completed_ok = matches!(slot.future.peek(), Some(Ok(_)));
        if completed_ok && self.scope == RetentionScope::Forever {
            return;
        }

        if !completed_ok {
            debug!(%identity, "last subscriber gone, cancelling fetch");
        }
        occupied.remove();
    }

    /// A fetch failed: clear the entry so the next caller retries.
    fn evict(&self, identity: &RequestIdentity, generation: u64) {
        if self
            .slots
            .remove_if(identity, |_, slot| slot.generation == generation)
            .is_some()
        {
            debug!(%identity, "fetch failed, entry cleared");
        }
    }
}

// ── SharedResponse ──────────────────────────────────────────────────

/// A subscription to one cached fetch. Resolves to the shared result.
///
/// Dropping it detaches the subscriber; dropping every subscriber of a
/// pending fetch cancels the fetch.
#[must_use = "a SharedResponse does nothing unless polled"]
pub struct SharedResponse {
    future: SharedFetch,
    identity: RequestIdentity,
    generation: u64,
    cache: Arc<CacheInner>,
}

impl SharedResponse {
    pub fn identity(&self) -> &RequestIdentity {
        &self.identity
    }

    /// One-element stream form of this subscription.
    pub fn into_stream(self) -> impl Stream<Item = SharedResult> + Send {
        stream::once(self)
    }
}

impl Future for SharedResponse {
    type Output = SharedResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let result = ready!(Pin::new(&mut self.future).poll(cx));
        if result.is_err() {
            self.cache.evict(&self.identity, self.generation);
        }
        Poll::Ready(result)
    }
}

impl Drop for SharedResponse {
    fn drop(&mut self) {
        self.cache.release(&self.identity, self.generation);
    }
}
