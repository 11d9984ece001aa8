//! Async HTTP fetching for list views.
//!
//! [`HttpNetworkClient`] implements [`NetworkClient`] on top of
//! [`HttpClient`]. Each `get` spawns a task on the tokio runtime that fetches
//! the URL and decodes the body as JSON. How the completion reaches the list
//! view is decided by [`DeliveryMode`]:
//!
//! - [`DeliveryMode::Queued`] (default): completions are parked in a channel
//!   until the UI thread calls [`HttpNetworkClient::dispatch_pending`], so
//!   list state is only ever touched from the UI event loop.
//! - [`DeliveryMode::Immediate`]: completions run on the runtime's worker
//!   thread as soon as the response is decoded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use trellis_core::logging::targets;

use super::client::HttpClient;
use crate::error::Result;
use crate::fetch::{Cancelable, FetchCompletion, FetchResult, NetworkClient, QueryParams};

const TARGET: &str = targets::HTTP;

/// Unique identifier for an async request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handle to a pending HTTP request that can be cancelled.
#[derive(Clone)]
pub struct RequestHandle {
    id: RequestId,
    cancel_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl RequestHandle {
    /// The unique ID of this request.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Mark the request as resolved. Returns `false` if it was cancelled first.
    fn finish(&self) -> bool {
        self.cancel_tx.lock().take().is_some()
    }
}

impl Cancelable for RequestHandle {
    fn cancel(&self) -> bool {
        match self.cancel_tx.lock().take() {
            Some(tx) => {
                tracing::debug!(target: TARGET, id = %self.id, "cancelling request");
                tx.send(()).is_ok()
            }
            None => false,
        }
    }

    fn is_pending(&self) -> bool {
        self.cancel_tx.lock().is_some()
    }
}

impl std::fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.id)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Where fetch completions are invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Invoke completions on the runtime worker thread.
    Immediate,
    /// Queue completions until [`HttpNetworkClient::dispatch_pending`] is called.
    #[default]
    Queued,
}

struct PendingCompletion {
    id: RequestId,
    completion: FetchCompletion,
    result: FetchResult,
}

/// A [`NetworkClient`] that fetches JSON pages over HTTP.
///
/// # Example
///
/// ```ignore
/// use trellis_net::http::HttpNetworkClient;
///
/// let network = HttpNetworkClient::new()?;
///
/// // In the host's event loop, once per frame:
/// network.dispatch_pending();
/// ```
pub struct HttpNetworkClient {
    client: HttpClient,
    runtime: tokio::runtime::Handle,
    mode: DeliveryMode,
    queue_tx: Sender<PendingCompletion>,
    queue_rx: Receiver<PendingCompletion>,
}

impl HttpNetworkClient {
    /// Create a client with default HTTP configuration and queued delivery.
    pub fn new() -> Result<Self> {
        Self::from_client(HttpClient::new()?)
    }

    /// Create from an existing HTTP client.
    ///
    /// Requests run on the ambient tokio runtime if there is one, otherwise
    /// on the lazily created global runtime.
    pub fn from_client(client: HttpClient) -> Result<Self> {
        let (queue_tx, queue_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            client,
            runtime: runtime::handle()?,
            mode: DeliveryMode::default(),
            queue_tx,
            queue_rx,
        })
    }

    /// Set the delivery mode.
    pub fn with_delivery(mut self, mode: DeliveryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Get the delivery mode.
    pub fn delivery(&self) -> DeliveryMode {
        self.mode
    }

    /// Get a reference to the underlying HTTP client.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Number of queued completions waiting for [`dispatch_pending`](Self::dispatch_pending).
    pub fn pending_deliveries(&self) -> usize {
        self.queue_rx.len()
    }

    /// Invoke every queued completion on the calling thread.
    ///
    /// Returns the number of completions invoked. A no-op in
    /// [`DeliveryMode::Immediate`].
    pub fn dispatch_pending(&self) -> usize {
        let mut dispatched = 0;
        while let Ok(pending) = self.queue_rx.try_recv() {
            tracing::trace!(target: TARGET, id = %pending.id, "dispatching queued completion");
            (pending.completion)(pending.result);
            dispatched += 1;
        }
        dispatched
    }
}

impl NetworkClient for HttpNetworkClient {
    fn get(
        &self,
        url: &str,
        params: QueryParams,
        completion: FetchCompletion,
    ) -> Box<dyn Cancelable> {
        let request_id = RequestId::new();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = RequestHandle {
            id: request_id,
            cancel_tx: Arc::new(Mutex::new(Some(cancel_tx))),
        };

        let client = self.client.clone();
        let url = url.to_string();
        let task_handle = handle.clone();
        let mode = self.mode;
        let queue_tx = self.queue_tx.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                result = client.fetch_page(&url, &params) => {
                    if !task_handle.finish() {
                        tracing::trace!(target: TARGET, id = %request_id, "request cancelled before delivery");
                        return;
                    }
                    match mode {
                        DeliveryMode::Immediate => completion(result),
                        DeliveryMode::Queued => {
                            let pending = PendingCompletion { id: request_id, completion, result };
                            if queue_tx.send(pending).is_err() {
                                tracing::debug!(target: TARGET, id = %request_id, "client dropped, discarding completion");
                            }
                        }
                    }
                }
                _ = cancel_rx => {
                    tracing::trace!(target: TARGET, id = %request_id, "request cancelled");
                }
            }
        });

        Box::new(handle)
    }
}

impl std::fmt::Debug for HttpNetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNetworkClient")
            .field("client", &self.client)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Runtime management for async operations.
pub mod runtime {
    use std::sync::OnceLock;
    use tokio::runtime::{Handle, Runtime};

    use crate::error::{NetworkError, Result};

    static RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();

    /// Get the global runtime, creating it on first use.
    fn get() -> Result<&'static Runtime> {
        RUNTIME
            .get_or_init(|| {
                tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .thread_name("trellis-net")
                    .enable_all()
                    .build()
                    .map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|msg| NetworkError::Runtime(msg.clone()))
    }

    /// Handle to the ambient runtime, falling back to the global one.
    pub fn handle() -> Result<Handle> {
        match Handle::try_current() {
            Ok(handle) => Ok(handle),
            Err(_) => get().map(|runtime| runtime.handle().clone()),
        }
    }
}
