//! Asynchronous model loading.
//!
//! Loads run on tokio's blocking pool and never touch garden state. Each
//! result is queued on a channel and only applied when the owner drains it
//! with [`ModelLoader::poll_results`]. Every request carries the scene
//! generation it was issued under so the owner can drop completions that
//! arrive after a teardown.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;

use crate::core::{Error, Result};
use super::library::{ModelAsset, ModelSource};

/// Request to load a model
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: u64,
    pub generation: u64,
    pub name: String,
}

/// Result of a model load, tagged with its request.
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: u64,
    pub generation: u64,
    pub name: String,
    pub result: Result<ModelAsset>,
}

enum Backend {
    /// Worker loop on a tokio runtime.
    Worker {
        request_tx: mpsc::UnboundedSender<LoadRequest>,
        /// Owned runtime, if the loader created one
        _runtime: Option<Runtime>,
    },
    /// Loads synchronously on the caller's thread. Results are still only
    /// observed through `poll_results`.
    Inline,
}

pub struct ModelLoader {
    source: Arc<dyn ModelSource>,
    backend: Backend,
    result_tx: mpsc::UnboundedSender<LoadCompletion>,
    result_rx: mpsc::UnboundedReceiver<LoadCompletion>,
    pending: HashSet<u64>,
    next_ticket: u64,
}

impl ModelLoader {
    /// Create a loader with its own multi-threaded runtime
    pub fn new(source: Arc<dyn ModelSource>, max_concurrent: usize) -> Result<Self> {
        let runtime = Runtime::new()?;
        let handle = runtime.handle().clone();
        Ok(Self::spawn(source, max_concurrent, &handle, Some(runtime)))
    }

    /// Create a loader on an existing runtime
    pub fn with_handle(source: Arc<dyn ModelSource>, max_concurrent: usize, handle: &Handle) -> Self {
        Self::spawn(source, max_concurrent, handle, None)
    }

    /// Create a loader that resolves requests immediately on the caller.
    pub fn inline(source: Arc<dyn ModelSource>) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            source,
            backend: Backend::Inline,
            result_tx,
            result_rx,
            pending: HashSet::new(),
            next_ticket: 0,
        }
    }

    fn spawn(
        source: Arc<dyn ModelSource>,
        max_concurrent: usize,
        handle: &Handle,
        runtime: Option<Runtime>,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<LoadCompletion>();

        let worker_source = Arc::clone(&source);
        let worker_tx = result_tx.clone();
        handle.spawn(async move {
            Self::worker_loop(worker_source, max_concurrent.max(1), request_rx, worker_tx).await;
        });

        Self {
            source,
            backend: Backend::Worker { request_tx, _runtime: runtime },
            result_tx,
            result_rx,
            pending: HashSet::new(),
            next_ticket: 0,
        }
    }

    /// Worker loop that runs loads with bounded concurrency, in request order
    async fn worker_loop(
        source: Arc<dyn ModelSource>,
        max_concurrent: usize,
        mut request_rx: mpsc::UnboundedReceiver<LoadRequest>,
        result_tx: mpsc::UnboundedSender<LoadCompletion>,
    ) {
        use tokio::task::JoinSet;

        let mut active = JoinSet::new();
        let mut queued: VecDeque<LoadRequest> = VecDeque::new();
        let mut closed = false;

        loop {
            tokio::select! {
                request = request_rx.recv(), if !closed => {
                    match request {
                        Some(request) => queued.push_back(request),
                        None => closed = true,
                    }
                }

                Some(joined) = active.join_next(), if !active.is_empty() => {
                    match joined {
                        Ok(completion) => {
                            // receiver gone means the loader was dropped
                            let _ = result_tx.send(completion);
                        }
                        Err(e) => log::error!("model load task panicked: {e}"),
                    }
                }

                // request channel closed and nothing in flight
                else => break,
            }

            while active.len() < max_concurrent {
                let Some(request) = queued.pop_front() else { break };
                let source = Arc::clone(&source);
                active.spawn_blocking(move || LoadCompletion {
                    result: source.load(&request.name),
                    ticket: request.ticket,
                    generation: request.generation,
                    name: request.name,
                });
            }
        }
        log::debug!("model loader worker stopped");
    }

    /// Queue a model load. Returns the ticket identifying its completion.
    pub fn request(&mut self, name: &str, generation: u64) -> Result<u64> {
        self.next_ticket += 1;
        let request = LoadRequest {
            ticket: self.next_ticket,
            generation,
            name: name.to_string(),
        };

        match &self.backend {
            Backend::Worker { request_tx, .. } => {
                request_tx
                    .send(request)
                    .map_err(|_| Error::AssetLoad("model loader worker stopped".into()))?;
            }
            Backend::Inline => {
                let completion = LoadCompletion {
                    result: self.source.load(&request.name),
                    ticket: request.ticket,
                    generation: request.generation,
                    name: request.name,
                };
                self.result_tx
                    .send(completion)
                    .map_err(|_| Error::AssetLoad("model loader closed".into()))?;
            }
        }

        self.pending.insert(self.next_ticket);
        Ok(self.next_ticket)
    }

    /// Drain completed loads (non-blocking)
    pub fn poll_results(&mut self) -> Vec<LoadCompletion> {
        let mut results = Vec::new();
        while let Ok(completion) = self.result_rx.try_recv() {
            self.pending.remove(&completion.ticket);
            results.push(completion);
        }
        results
    }

    /// Block until every pending load completed or `timeout` passed, then
    /// drain. Must not be called from inside an async task.
    pub fn wait_for_results(&mut self, timeout: Duration) -> Vec<LoadCompletion> {
        let deadline = Instant::now() + timeout;
        let mut results = self.poll_results();
        while !self.pending.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
            results.extend(self.poll_results());
        }
        results
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, ticket: u64) -> bool {
        self.pending.contains(&ticket)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.backend, Backend::Inline)
    }
}
