//! Mock backend for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{BackendFuture, DashboardBackend};
use crate::{CoreError, CorrectionDataset, CorrectionRecord, Service, TitleNumber, TitleRecord};

/// A scripted failure for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockFailure {
    /// Simulate a non-success HTTP status.
    Status(u16),
    /// Simulate a connection-level error.
    Transport(String),
    /// Simulate a payload that fails boundary validation.
    Schema(String),
}

impl MockFailure {
    fn into_error(self, service: Service) -> CoreError {
        match self {
            MockFailure::Status(status) => CoreError::Status { service, status },
            MockFailure::Transport(msg) => CoreError::Transport(msg),
            MockFailure::Schema(msg) => CoreError::schema(service, msg),
        }
    }
}

type Script<T> = Vec<Result<T, MockFailure>>;

/// A hand-rolled mock implementing [`DashboardBackend`] for tests.
///
/// Responses are scripted per title number. A script is consumed one entry
/// per call and its last entry repeats once exhausted. Unscripted titles
/// acquire successfully and have no corrections.
pub struct MockBackend {
    titles: Result<Vec<TitleRecord>, MockFailure>,
    acquisitions: Mutex<HashMap<TitleNumber, Script<()>>>,
    corrections: Mutex<HashMap<TitleNumber, Script<Vec<CorrectionRecord>>>>,
    delays: HashMap<TitleNumber, Duration>,
    default_delay: Option<Duration>,
    list_calls: AtomicUsize,
    acquire_calls: AtomicUsize,
    correction_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(titles: Vec<TitleRecord>) -> Self {
        Self {
            titles: Ok(titles),
            acquisitions: Mutex::new(HashMap::new()),
            corrections: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            default_delay: None,
            list_calls: AtomicUsize::new(0),
            acquire_calls: AtomicUsize::new(0),
            correction_calls: AtomicUsize::new(0),
        }
    }

    /// A backend whose registry call always fails.
    pub fn failing_registry(failure: MockFailure) -> Self {
        Self {
            titles: Err(failure),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_corrections(self, number: u32, records: Vec<CorrectionRecord>) -> Self {
        self.with_correction_script(number, vec![Ok(records)])
    }

    pub fn with_correction_script(
        self,
        number: u32,
        script: Vec<Result<Vec<CorrectionRecord>, MockFailure>>,
    ) -> Self {
        lock(&self.corrections).insert(TitleNumber(number), script);
        self
    }

    pub fn with_acquisition_script(self, number: u32, script: Vec<Result<(), MockFailure>>) -> Self {
        lock(&self.acquisitions).insert(TitleNumber(number), script);
        self
    }

    /// Simulated latency for calls keyed by `number`.
    pub fn with_delay(mut self, number: u32, delay: Duration) -> Self {
        self.delays.insert(TitleNumber(number), delay);
        self
    }

    /// Simulated latency for every call without a per-title delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn acquire_calls(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    pub fn correction_calls(&self) -> usize {
        self.correction_calls.load(Ordering::SeqCst)
    }

    fn delay_for(&self, number: Option<TitleNumber>) -> Option<Duration> {
        number
            .and_then(|n| self.delays.get(&n).copied())
            .or(self.default_delay)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn next_in<T: Clone>(script: &mut Script<T>) -> Option<Result<T, MockFailure>> {
    if script.len() > 1 {
        Some(script.remove(0))
    } else {
        script.first().cloned()
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
}

impl DashboardBackend for MockBackend {
    fn list_titles(&self) -> BackendFuture<'_, Vec<TitleRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.titles.clone();
        let delay = self.delay_for(None);

        Box::pin(async move {
            pause(delay).await;
            response.map_err(|f| f.into_error(Service::Registry))
        })
    }

    fn acquire(&self, number: TitleNumber) -> BackendFuture<'_, ()> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        let response = lock(&self.acquisitions)
            .get_mut(&number)
            .and_then(next_in)
            .unwrap_or(Ok(()));
        let delay = self.delay_for(Some(number));

        Box::pin(async move {
            pause(delay).await;
            response.map_err(|f| f.into_error(Service::Acquisition))
        })
    }

    fn corrections(&self, number: TitleNumber) -> BackendFuture<'_, CorrectionDataset> {
        self.correction_calls.fetch_add(1, Ordering::SeqCst);
        let response = lock(&self.corrections)
            .get_mut(&number)
            .and_then(next_in)
            .unwrap_or_else(|| Ok(Vec::new()));
        let delay = self.delay_for(Some(number));

        Box::pin(async move {
            pause(delay).await;
            response
                .map(|records| CorrectionDataset::new(number, records))
                .map_err(|f| f.into_error(Service::Corrections))
        })
    }
}
