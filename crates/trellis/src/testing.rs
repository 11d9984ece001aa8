//! Test doubles for the network and listener collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use trellis_net::{Cancelable, FetchCompletion, FetchResult, NetworkClient, NetworkError, QueryParams};

use crate::listener::ListViewListener;
use crate::model::{IndexPath, SectionedDataModel};
use crate::renderer::CellView;
use crate::view::ScrollMetrics;

pub(crate) struct FakeRequest {
    pub url: String,
    pub params: QueryParams,
    completion: Mutex<Option<FetchCompletion>>,
    cancelled: AtomicBool,
}

impl FakeRequest {
    pub fn is_pending(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst) && self.completion.lock().is_some()
    }
}

struct FakeHandle(Arc<FakeRequest>);

impl Cancelable for FakeHandle {
    fn cancel(&self) -> bool {
        !self.0.cancelled.swap(true, Ordering::SeqCst)
    }

    fn is_pending(&self) -> bool {
        self.0.is_pending()
    }
}

/// Records every request and completes them when the test says so.
///
/// Cancelling a request only flags it: the test can still complete it to
/// simulate a response racing the cancellation.
#[derive(Default)]
pub(crate) struct FakeNetwork {
    requests: Mutex<Vec<Arc<FakeRequest>>>,
    respond_with: Mutex<Option<FetchResult>>,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Complete every future request synchronously, inside `get`.
    pub fn respond_immediately(&self, result: FetchResult) {
        *self.respond_with.lock() = Some(result);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn request(&self, index: usize) -> Arc<FakeRequest> {
        self.requests.lock()[index].clone()
    }

    pub fn params(&self, index: usize) -> QueryParams {
        self.request(index).params.clone()
    }

    pub fn last_params(&self) -> QueryParams {
        let count = self.request_count();
        self.params(count - 1)
    }

    pub fn is_cancelled(&self, index: usize) -> bool {
        self.request(index).cancelled.load(Ordering::SeqCst)
    }

    /// Invoke the completion of request `index`. Returns `false` if it was
    /// already completed.
    pub fn complete(&self, index: usize, result: FetchResult) -> bool {
        let request = self.request(index);
        let completion = request.completion.lock().take();
        match completion {
            Some(completion) => {
                completion(result);
                true
            }
            None => false,
        }
    }

    pub fn succeed(&self, index: usize, payload: Value) -> bool {
        self.complete(index, FetchResult::success(payload).with_status(200))
    }

    pub fn fail(&self, index: usize, error: NetworkError) -> bool {
        self.complete(index, FetchResult::failure(error))
    }

    /// Complete the most recent request with `payload`.
    pub fn succeed_last(&self, payload: Value) -> bool {
        let count = self.request_count();
        self.succeed(count - 1, payload)
    }
}

impl NetworkClient for FakeNetwork {
    fn get(&self, url: &str, params: QueryParams, completion: FetchCompletion) -> Box<dyn Cancelable> {
        let request = Arc::new(FakeRequest {
            url: url.to_string(),
            params,
            completion: Mutex::new(Some(completion)),
            cancelled: AtomicBool::new(false),
        });
        self.requests.lock().push(request.clone());

        let immediate = self.respond_with.lock().clone();
        if let Some(result) = immediate {
            let completion = request.completion.lock().take();
            if let Some(completion) = completion {
                completion(result);
            }
        }
        Box::new(FakeHandle(request))
    }
}

/// A listener call, as recorded by [`RecordingListener`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    PrepareParams(usize),
    Reload,
    LoadStart,
    LoadSuccess(Value),
    LoadError(NetworkError),
    CellConfigured(IndexPath),
    RowSelected(IndexPath),
    Scroll(ScrollMetrics),
}

/// Records every callback and appends the `items` of each page to the model.
#[derive(Default)]
pub(crate) struct RecordingListener {
    events: Mutex<Vec<Event>>,
    extra_params: Mutex<QueryParams>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Parameters returned from every `prepare_params` call.
    pub fn set_params(&self, params: QueryParams) {
        *self.extra_params.lock() = params;
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ListViewListener for RecordingListener {
    fn prepare_params(&self, page: usize) -> QueryParams {
        self.events.lock().push(Event::PrepareParams(page));
        self.extra_params.lock().clone()
    }

    fn on_reload(&self) {
        self.events.lock().push(Event::Reload);
    }

    fn on_load_start(&self) {
        self.events.lock().push(Event::LoadStart);
    }

    fn on_load_success(&self, model: &SectionedDataModel, result: &FetchResult) {
        let payload = result.payload().cloned().unwrap_or(Value::Null);
        if let Some(items) = payload.get("items").and_then(Value::as_array) {
            for item in items {
                model.add_cell(item.clone(), "item");
            }
        }
        self.events.lock().push(Event::LoadSuccess(payload));
    }

    fn on_load_error(&self, result: &FetchResult) {
        let error = result.error().cloned().unwrap_or(NetworkError::Cancelled);
        self.events.lock().push(Event::LoadError(error));
    }

    fn on_cell_configured(&self, _view: &mut CellView, index: IndexPath) {
        self.events.lock().push(Event::CellConfigured(index));
    }

    fn on_row_selected(&self, index: IndexPath) {
        self.events.lock().push(Event::RowSelected(index));
    }

    fn on_scroll(&self, metrics: &ScrollMetrics) {
        self.events.lock().push(Event::Scroll(*metrics));
    }
}
