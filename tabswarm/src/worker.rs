//! The worker pool circulating participant sessions.
//!
//! Automation handles are expensive, so the pool never creates one per
//! simulated user. A fixed set of workers each own one handle for their
//! whole life and interleave sessions pulled from a shared queue: restore
//! cookies and location, run a bounded burst of steps, snapshot the state
//! back and requeue it. The queue hands a session to exactly one worker at
//! a time, which is the entire concurrency story; workers share nothing
//! else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::Mutex;

use crate::automation::{self, Automation};
use crate::behavior;
use crate::configuration::{Configuration, WorkerMode};
use crate::participants::Participant;
use crate::session::{self, SessionState, UserMemory};
use crate::utils;

/// Queue payload: a suspended session, or the stop sentinel.
pub(crate) type QueueItem = Option<SessionState>;

/// Unbounded multi-producer queue with a shared consumer end. A dequeued
/// session is owned by exactly one worker until it is pushed back.
#[derive(Clone)]
pub(crate) struct WorkQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<QueueItem>>>,
}

impl WorkQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Enqueue an item. Dropped silently once every worker is gone.
    pub(crate) fn push(&self, item: QueueItem) {
        if self.tx.send(item).is_err() {
            log::debug!("work queue closed, item dropped");
        }
    }

    /// Dequeue the next item, waiting for one to arrive.
    pub(crate) async fn pull(&self) -> Option<QueueItem> {
        self.rx.lock().await.recv().await
    }

    /// Non-blocking dequeue for inspection.
    #[cfg(test)]
    pub(crate) fn try_pull(&self) -> Option<QueueItem> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

/// Load a session's cookies and location into the handle. Failures are
/// logged and skipped; a stale cookie must not take the worker down.
async fn restore_session<A: Automation>(handle: &A, state: &SessionState) {
    for cookie in &state.cookies {
        if let Err(e) = handle.add_cookie(cookie.clone()).await {
            log::warn!("could not restore cookie {}: {e}", cookie.name);
        }
    }
    if let Err(e) = handle.goto(&state.current_url).await {
        log::warn!("could not resume session at {}: {e}", state.current_url);
    }
}

/// Snapshot the handle's cookies and location back into the session.
async fn capture_session<A: Automation>(handle: &A, state: &mut SessionState) {
    match handle.cookies().await {
        Ok(cookies) => state.cookies = cookies,
        Err(e) => log::warn!("could not snapshot cookies: {e}"),
    }
    match handle.current_url().await {
        Ok(url) => state.current_url = url,
        Err(e) => log::warn!("could not snapshot current url: {e}"),
    }
}

/// One worker: resume sessions from the queue, run a bounded burst of
/// steps each, suspend and requeue, until the stop sentinel arrives. Every
/// step failure is swallowed so one misbehaving session never kills the
/// worker.
pub(crate) async fn worker_loop<A: Automation>(
    id: usize,
    queue: WorkQueue,
    draining: Arc<AtomicBool>,
    handle: A,
    configuration: Configuration,
) {
    loop {
        let mut state = match queue.pull().await {
            Some(Some(state)) => state,
            _ => break,
        };
        if draining.load(Ordering::Relaxed) {
            // retire sessions unprocessed so the sentinel is reached promptly
            continue;
        }

        state.visits += 1;
        utils::log("worker resuming session", &state.memory.registration_url);
        restore_session(&handle, &state).await;

        for _ in 0..configuration.steps_per_visit {
            if let Err(e) = behavior::run_step(&mut state.memory, &handle, &configuration).await {
                log::warn!("worker {id}: step failed: {e}");
            }
        }

        capture_session(&handle, &mut state).await;
        queue.push(Some(state));
    }

    if let Err(e) = handle.quit().await {
        log::warn!("worker {id}: could not release automation handle: {e}");
    }
    log::info!("worker {id} stopped");
}

/// Launch a handle and run the worker loop on it.
async fn run_worker(
    id: usize,
    queue: WorkQueue,
    draining: Arc<AtomicBool>,
    configuration: Configuration,
) {
    match automation::launch_handle(&configuration).await {
        Some(handle) => worker_loop(id, queue, draining, handle, configuration).await,
        None => log::error!("worker {id}: no automation handle, giving up"),
    }
}

/// Handle onto a spawned worker.
enum WorkerHandle {
    /// Worker running as a tokio task.
    Task(tokio::task::JoinHandle<()>),
    /// Worker running on its own thread with a dedicated runtime.
    Thread(std::thread::JoinHandle<()>),
}

/// A pool of workers interleaving many participant sessions over a bounded
/// set of automation handles.
pub struct Swarm {
    /// Runtime configuration for the swarm.
    pub configuration: Configuration,
    queue: WorkQueue,
    draining: Arc<AtomicBool>,
    workers: Vec<WorkerHandle>,
}

impl Swarm {
    /// A swarm over the given configuration with an empty queue.
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            queue: WorkQueue::new(),
            draining: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
        }
    }

    /// Seed one fresh session per participant, in randomized order.
    /// Returns the number of sessions enqueued.
    pub fn seed<I>(&self, participants: I) -> usize
    where
        I: IntoIterator<Item = Participant>,
    {
        let mut sessions: Vec<SessionState> = participants
            .into_iter()
            .map(|participant| {
                let url = session::registration_url(
                    &self.configuration.server_url,
                    &participant.identity,
                    &participant.registration_key,
                );
                SessionState::new(UserMemory::new(url))
            })
            .collect();
        fastrand::shuffle(&mut sessions);

        let seeded = sessions.len();
        for state in sessions {
            self.queue.push(Some(state));
        }
        seeded
    }

    /// Spawn the worker pool. Each worker launches one WebDriver handle and
    /// keeps it until the swarm stops.
    pub fn launch(&mut self) {
        for id in 0..self.configuration.workers {
            let queue = self.queue.clone();
            let draining = self.draining.clone();
            let configuration = self.configuration.clone();
            let worker = match self.configuration.worker_mode {
                WorkerMode::Tasks => WorkerHandle::Task(tokio::spawn(async move {
                    run_worker(id, queue, draining, configuration).await;
                })),
                WorkerMode::Threads => WorkerHandle::Thread(std::thread::spawn(move || {
                    match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(runtime) => {
                            runtime.block_on(run_worker(id, queue, draining, configuration))
                        }
                        Err(e) => log::error!("worker {id}: could not build runtime: {e}"),
                    }
                })),
            };
            self.workers.push(worker);
        }
    }

    /// Ask every worker to stop: sessions dequeued from here on are retired
    /// unprocessed, and one sentinel per worker is queued behind them.
    pub fn stop(&self) {
        self.draining.store(true, Ordering::Relaxed);
        for _ in 0..self.workers.len() {
            self.queue.push(None);
        }
    }

    /// Wait for every worker to terminate.
    pub async fn wait(&mut self) {
        for worker in self.workers.drain(..) {
            match worker {
                WorkerHandle::Task(task) => {
                    if let Err(e) = task.await {
                        log::warn!("worker task failed: {e}");
                    }
                }
                WorkerHandle::Thread(thread) => {
                    let joined = tokio::task::spawn_blocking(move || thread.join()).await;
                    if !matches!(joined, Ok(Ok(()))) {
                        log::warn!("worker thread failed");
                    }
                }
            }
        }
    }
}
