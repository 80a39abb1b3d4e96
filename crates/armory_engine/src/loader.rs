//! Throttled image loader with exponential-backoff retries.
//!
//! All queue, counter and retry bookkeeping lives in one actor task. Fetch
//! attempts, backoff waits and the inter-batch delay run in spawned tasks that
//! report back to the actor over its command channel, so the actor itself
//! never awaits anything but the next command.
//!
//! A task keeps its concurrency slot while it waits to retry; the slot is
//! released only on success or after the retry budget is spent.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::assets::strip_cache_buster;
use crate::fetch::Fetcher;
use crate::types::{ConsumerId, FetchError, FetchOutput, LoadEvent, LoadStage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleSettings {
    pub max_concurrent: usize,
    /// Pause between a task finishing and the next queue advancement.
    pub batch_delay: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 6,
            batch_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// `min(initial * multiplier^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_multiplier
            .checked_pow(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// The UI element a load is aimed at.
///
/// Implementations must tolerate calls after the element went away.
pub trait ImageHandle: Send + Sync {
    fn set_source(&self, url: &str);
    fn on_success(&self, url: &str, image: &FetchOutput);
    fn on_failure(&self, url: &str);
}

pub trait LoadEventSink: Send + Sync {
    fn emit(&self, event: LoadEvent);
}

impl LoadEventSink for mpsc::UnboundedSender<LoadEvent> {
    fn emit(&self, event: LoadEvent) {
        let _ = self.send(event);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub active: usize,
    pub queued: usize,
    pub pending_retries: usize,
    pub peak_active: usize,
    pub started: u64,
    pub attempts: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Handle to the loader actor. Dropping it stops the actor.
pub struct AssetLoader {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
}

impl AssetLoader {
    /// Spawns the actor on the current tokio runtime.
    pub fn spawn(
        fetcher: Arc<dyn Fetcher>,
        throttle: ThrottleSettings,
        policy: RetryPolicy,
        sink: Option<Arc<dyn LoadEventSink>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let actor = LoaderActor {
            fetcher,
            max_concurrent: throttle.max_concurrent.max(1),
            batch_delay: throttle.batch_delay,
            policy,
            sink,
            queue: VecDeque::new(),
            next_task: 0,
            retries: HashMap::new(),
            stats: LoaderStats::default(),
            cmd_tx: cmd_tx.clone(),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(actor.run(cmd_rx));
        Self { cmd_tx, shutdown }
    }

    /// Queues a load of `url` into `handle`. Never blocks.
    pub fn enqueue(&self, consumer: ConsumerId, url: impl Into<String>, handle: Arc<dyn ImageHandle>) {
        let _ = self.cmd_tx.send(Command::Enqueue(LoadTask {
            id: 0,
            consumer,
            url: url.into(),
            handle,
        }));
    }

    /// Snapshot of the actor's counters; `None` once the actor has stopped.
    pub async fn stats(&self) -> Option<LoaderStats> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx.send(Command::Stats(reply_tx)).ok()?;
        reply_rx.await.ok()
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct LoadTask {
    /// Assigned by the actor on enqueue; unique per loader.
    id: TaskId,
    consumer: ConsumerId,
    /// As enqueued; also the retry bookkeeping key.
    url: String,
    handle: Arc<dyn ImageHandle>,
}

type TaskId = u64;

/// Per task, so repeated loads of one URL into one consumer keep separate budgets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RetryKey {
    task: TaskId,
    url: String,
}

#[derive(Debug, Clone, Copy)]
struct RetryState {
    attempt_count: u32,
    next_delay: Duration,
}

enum Command {
    Enqueue(LoadTask),
    AttemptFinished {
        task: LoadTask,
        result: Result<FetchOutput, FetchError>,
    },
    RetryDue(LoadTask),
    Advance,
    Stats(oneshot::Sender<LoaderStats>),
}

struct LoaderActor {
    fetcher: Arc<dyn Fetcher>,
    max_concurrent: usize,
    batch_delay: Duration,
    policy: RetryPolicy,
    sink: Option<Arc<dyn LoadEventSink>>,
    queue: VecDeque<LoadTask>,
    next_task: TaskId,
    retries: HashMap<RetryKey, RetryState>,
    stats: LoaderStats,
    cmd_tx: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
}

impl LoaderActor {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                command = cmd_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }
        engine_debug!(
            "image loader stopped with {} queued and {} active",
            self.queue.len(),
            self.stats.active
        );
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Enqueue(mut task) => {
                self.next_task += 1;
                task.id = self.next_task;
                self.queue.push_back(task);
                self.process_queue();
            }
            Command::AttemptFinished { task, result } => self.attempt_finished(task, result),
            Command::RetryDue(task) => {
                let canonical = strip_cache_buster(&task.url);
                if let Some(state) = self.retries.get(&RetryKey {
                    task: task.id,
                    url: task.url.clone(),
                }) {
                    engine_debug!(
                        "retry {} for consumer {} after {:?}: {}",
                        state.attempt_count,
                        task.consumer,
                        state.next_delay,
                        canonical
                    );
                }
                self.start_attempt(task, canonical);
            }
            Command::Advance => self.process_queue(),
            Command::Stats(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn process_queue(&mut self) {
        while self.stats.active < self.max_concurrent {
            let Some(task) = self.queue.pop_front() else {
                break;
            };
            self.stats.active += 1;
            self.stats.peak_active = self.stats.peak_active.max(self.stats.active);
            self.stats.started += 1;
            self.emit(&task, LoadStage::Started);
            let url = task.url.clone();
            self.start_attempt(task, url);
        }
    }

    fn start_attempt(&mut self, task: LoadTask, attempt_url: String) {
        self.stats.attempts += 1;
        task.handle.set_source(&attempt_url);
        let fetcher = Arc::clone(&self.fetcher);
        let cmd_tx = self.cmd_tx.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = shutdown.cancelled() => return,
                result = fetcher.fetch(&attempt_url) => result,
            };
            let _ = cmd_tx.send(Command::AttemptFinished { task, result });
        });
    }

    fn attempt_finished(&mut self, task: LoadTask, result: Result<FetchOutput, FetchError>) {
        let key = RetryKey {
            task: task.id,
            url: task.url.clone(),
        };
        match result {
            Ok(image) => {
                self.retries.remove(&key);
                self.stats.succeeded += 1;
                self.release_slot();
                task.handle.on_success(&task.url, &image);
                self.emit(&task, LoadStage::Succeeded);
            }
            Err(err) => {
                let attempt_count = self.retries.get(&key).map_or(0, |state| state.attempt_count);
                if attempt_count < self.policy.max_retries {
                    let delay = self.policy.delay_for(attempt_count);
                    self.retries.insert(
                        key,
                        RetryState {
                            attempt_count: attempt_count + 1,
                            next_delay: delay,
                        },
                    );
                    engine_info!(
                        "Retrying image load ({}/{}) for {} after {:?}: {}",
                        attempt_count + 1,
                        self.policy.max_retries,
                        task.url,
                        delay,
                        err
                    );
                    self.emit(
                        &task,
                        LoadStage::Retrying {
                            attempt: attempt_count + 1,
                            delay,
                        },
                    );
                    self.schedule(delay, Command::RetryDue(task));
                } else {
                    self.retries.remove(&key);
                    engine_warn!(
                        "Failed to load image after {} retries: {} ({})",
                        self.policy.max_retries,
                        task.url,
                        err
                    );
                    self.stats.failed += 1;
                    self.release_slot();
                    task.handle.on_failure(&task.url);
                    self.emit(&task, LoadStage::Failed);
                }
            }
        }
    }

    fn release_slot(&mut self) {
        self.stats.active = self.stats.active.saturating_sub(1);
        self.schedule(self.batch_delay, Command::Advance);
    }

    fn schedule(&self, delay: Duration, command: Command) {
        let cmd_tx = self.cmd_tx.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = cmd_tx.send(command);
                }
            }
        });
    }

    fn emit(&self, task: &LoadTask, stage: LoadStage) {
        if let Some(sink) = &self.sink {
            sink.emit(LoadEvent {
                consumer: task.consumer,
                url: task.url.clone(),
                stage,
            });
        }
    }

    fn snapshot(&self) -> LoaderStats {
        LoaderStats {
            queued: self.queue.len(),
            pending_retries: self.retries.len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetryPolicy;

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..6).map(|attempt| policy.delay_for(attempt)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000),
                Duration::from_millis(8000),
                Duration::from_millis(10_000),
                Duration::from_millis(10_000),
            ]
        );
    }

    #[test]
    fn huge_attempts_saturate_at_max_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(200), Duration::from_millis(10_000));
    }
}
