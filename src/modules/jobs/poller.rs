//! Drives a job's progress forward until it reaches a terminal state.
//!
//! [`ProgressPoller::start`] spawns one task per job. The task asks a
//! [`ProgressSource`] for the job's progress on a fixed interval and
//! forwards every observed value as a [`PollEvent`] over an mpsc channel.
//! The returned [`PollTask`] is the only way to stop it early: call
//! [`PollTask::cancel`] or drop it. Dropping the event receiver stops the
//! task too.
//!
//! [`JobWatch`] holds at most one running task and cancels it before
//! starting the next, so an owner never observes two jobs at once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::error::{JobError, JobResult};
use super::model::{JobHandle, JobProgress};

/// Where the poller reads progress from. Implemented by the HTTP client.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn fetch_progress(&self, job: &JobHandle) -> JobResult<JobProgress>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Consecutive failed ticks tolerated before giving up.
    pub max_consecutive_failures: u32,
}

impl PollerConfig {
    const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Zero interval or failure budget would panic or never poll.
    pub fn normalized(self) -> Self {
        Self {
            interval: self.interval.max(Self::MIN_INTERVAL),
            max_consecutive_failures: self.max_consecutive_failures.max(1),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_consecutive_failures: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Idle,
    Polling,
    Completed,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollOutcome {
    Completed(JobProgress),
    Failed(JobProgress),
    Aborted { attempts: u32, last_error: String },
    /// Torn down by the owner before reaching a terminal state.
    Cancelled,
}

impl PollOutcome {
    pub fn state(&self) -> PollState {
        match self {
            PollOutcome::Completed(_) => PollState::Completed,
            PollOutcome::Failed(_) => PollState::Failed,
            PollOutcome::Aborted { .. } => PollState::Aborted,
            PollOutcome::Cancelled => PollState::Idle,
        }
    }

    pub fn into_result(self) -> JobResult<JobProgress> {
        match self {
            PollOutcome::Completed(progress) => Ok(progress),
            PollOutcome::Failed(progress) => Err(JobError::ServerReportedFailure(
                progress
                    .message
                    .unwrap_or_else(|| "job failed without a message".to_string()),
            )),
            PollOutcome::Aborted {
                attempts,
                last_error,
            } => Err(JobError::PollingAborted {
                attempts,
                last_error,
            }),
            PollOutcome::Cancelled => Err(JobError::Cancelled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PollEvent {
    Progress {
        job_id: String,
        progress: JobProgress,
    },
    Finished {
        job_id: String,
        outcome: PollOutcome,
    },
}

impl PollEvent {
    pub fn job_id(&self) -> &str {
        match self {
            PollEvent::Progress { job_id, .. } | PollEvent::Finished { job_id, .. } => job_id,
        }
    }
}

/// Latest known state of one poll task.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot {
    pub state: PollState,
    pub progress: JobProgress,
    pub consecutive_failures: u32,
}

impl Default for PollSnapshot {
    fn default() -> Self {
        Self {
            state: PollState::Idle,
            progress: JobProgress::default(),
            consecutive_failures: 0,
        }
    }
}

#[derive(Clone)]
pub struct ProgressPoller {
    source: Arc<dyn ProgressSource>,
    config: PollerConfig,
}

impl ProgressPoller {
    pub fn new(source: Arc<dyn ProgressSource>, config: PollerConfig) -> Self {
        Self {
            source,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// Starts polling `job` right away. The first request goes out
    /// immediately, the next ones every `interval`.
    pub fn start(&self, job: JobHandle, events: mpsc::UnboundedSender<PollEvent>) -> PollTask {
        let cancel = CancellationToken::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(PollSnapshot::default());

        let poll_loop = PollLoop {
            source: self.source.clone(),
            config: self.config,
            job: job.clone(),
            cancel: cancel.clone(),
            events,
            snapshot: snapshot_tx,
        };

        let span = info_span!("poll", job_id = %job);
        let handle = tokio::spawn(poll_loop.run().instrument(span));

        PollTask {
            job,
            cancel,
            handle: Some(handle),
            snapshot: snapshot_rx,
        }
    }
}

/// Handle to a running poll. Dropping it cancels the poll.
pub struct PollTask {
    job: JobHandle,
    cancel: CancellationToken,
    handle: Option<JoinHandle<PollOutcome>>,
    snapshot: watch::Receiver<PollSnapshot>,
}

impl PollTask {
    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    pub fn snapshot(&self) -> PollSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Waits for the poll to end on its own (or through [`PollTask::cancel`]).
    pub async fn wait(mut self) -> PollOutcome {
        let Some(handle) = self.handle.take() else {
            return PollOutcome::Cancelled;
        };

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(job_id = %self.job, "Poll task ended abnormally: {}", e);
                PollOutcome::Cancelled
            }
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct PollLoop {
    source: Arc<dyn ProgressSource>,
    config: PollerConfig,
    job: JobHandle,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<PollEvent>,
    snapshot: watch::Sender<PollSnapshot>,
}

impl PollLoop {
    async fn run(self) -> PollOutcome {
        self.snapshot.send_modify(|s| s.state = PollState::Polling);
        debug!("Polling started");

        let mut ticker = time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = 0u32;

        let outcome = 'poll: loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break 'poll PollOutcome::Cancelled,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break 'poll PollOutcome::Cancelled,
                result = self.source.fetch_progress(&self.job) => result,
            };

            match result {
                Ok(progress) => {
                    failures = 0;
                    if !self.publish(&progress) {
                        break 'poll PollOutcome::Cancelled;
                    }
                    if progress.is_failed() {
                        break 'poll PollOutcome::Failed(progress);
                    }
                    if progress.is_complete() {
                        break 'poll PollOutcome::Completed(progress);
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        attempt = failures,
                        max = self.config.max_consecutive_failures,
                        "Progress request failed: {}",
                        e
                    );
                    self.snapshot.send_modify(|s| s.consecutive_failures = failures);

                    if failures >= self.config.max_consecutive_failures {
                        break 'poll PollOutcome::Aborted {
                            attempts: failures,
                            last_error: e.to_string(),
                        };
                    }
                }
            }
        };

        self.finish(&outcome);
        outcome
    }

    /// Returns false once nobody is listening any more.
    fn publish(&self, progress: &JobProgress) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        self.snapshot.send_modify(|s| {
            s.progress = progress.clone();
            s.consecutive_failures = 0;
        });

        let event = PollEvent::Progress {
            job_id: self.job.job_id.clone(),
            progress: progress.clone(),
        };
        self.events.send(event).is_ok()
    }

    fn finish(&self, outcome: &PollOutcome) {
        self.snapshot.send_modify(|s| s.state = outcome.state());

        match outcome {
            PollOutcome::Cancelled => {
                debug!("Polling cancelled");
                return;
            }
            PollOutcome::Completed(progress) => {
                info!(output_url = ?progress.output_url, "Job completed");
            }
            PollOutcome::Failed(progress) => {
                warn!(message = ?progress.message, "Job reported failure");
            }
            PollOutcome::Aborted { attempts, .. } => {
                warn!(attempts, "Polling aborted");
            }
        }

        let _ = self.events.send(PollEvent::Finished {
            job_id: self.job.job_id.clone(),
            outcome: outcome.clone(),
        });
    }
}

/// Owns at most one running poll. Starting a new job cancels the old one
/// first; dropping the watch cancels whatever is running.
pub struct JobWatch {
    poller: ProgressPoller,
    active: Option<PollTask>,
}

impl JobWatch {
    pub fn new(poller: ProgressPoller) -> Self {
        Self {
            poller,
            active: None,
        }
    }

    pub fn start(&mut self, job: JobHandle, events: mpsc::UnboundedSender<PollEvent>) -> &PollTask {
        self.stop();
        debug!(job_id = %job, "Watching job");
        self.active.insert(self.poller.start(job, events))
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.active.take() {
            debug!(job_id = %task.job(), "Stopped watching job");
            task.cancel();
        }
    }

    pub fn current(&self) -> Option<&PollTask> {
        self.active.as_ref()
    }

    /// True when `job_id` is the job currently being watched.
    pub fn is_watching(&self, job_id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|task| task.job().job_id == job_id)
    }
}
