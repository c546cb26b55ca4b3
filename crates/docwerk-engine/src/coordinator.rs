// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job coordinator: the host-facing half of the engine.
//
// The coordinator lives on the tokio runtime. It owns the single background
// context handle (spawned lazily, reused across jobs), assigns job ids, and
// routes the context's messages back to the one job in flight. State is kept
// behind an `Arc<Mutex<>>`; every critical section is short and never spans
// an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{
    EngineConfig, ErrorCode, Job, JobFailure, JobId, JobOutput, JobRequest, JobStatus,
    MessageBody, Operation, ProgressEvent, WorkerMessage,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::context::{self, ContextHandle};
use crate::registry::HandlerRegistry;

type Completion = std::result::Result<JobOutput, JobFailure>;

// ---------------------------------------------------------------------------
// JobTicket
// ---------------------------------------------------------------------------

/// Returned by [`JobCoordinator::submit`]: the job's id, its progress
/// stream, and the eventual result.
pub struct JobTicket {
    id: JobId,
    progress: Option<mpsc::UnboundedReceiver<ProgressEvent>>,
    completion: oneshot::Receiver<Completion>,
}

impl JobTicket {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Take the progress stream. Events arrive in non-decreasing percent
    /// order; the stream ends once the job resolves. Returns `None` after
    /// the first call.
    pub fn take_progress(&mut self) -> Option<mpsc::UnboundedReceiver<ProgressEvent>> {
        self.progress.take()
    }

    /// Wait for the job's result.
    pub async fn wait(self) -> Completion {
        match self.completion.await {
            Ok(result) => result,
            Err(_) => Err(JobFailure::new(
                ErrorCode::ContextFailed,
                format!("job {} was dropped without a result", self.id),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator state
// ---------------------------------------------------------------------------

struct InFlight {
    job: Job,
    completion: oneshot::Sender<Completion>,
    progress: mpsc::UnboundedSender<ProgressEvent>,
    last_percent: u8,
}

impl InFlight {
    fn resolve(mut self, status: JobStatus, result: Completion) {
        self.job.transition(status);
        debug!(job_id = %self.job.id, ?status, "Job resolved");
        // The host may have dropped its ticket.
        let _ = self.completion.send(result);
    }
}

#[derive(Default)]
struct CoordinatorState {
    context: Option<ContextHandle>,
    in_flight: Option<InFlight>,
    contexts_spawned: u64,
}

impl CoordinatorState {
    /// Deliver one message from the context of `generation`.
    fn route(&mut self, generation: u64, incoming: WorkerMessage) {
        let current = self.context.as_ref().map(ContextHandle::generation);
        let matches = current == Some(generation)
            && self
                .in_flight
                .as_ref()
                .is_some_and(|entry| entry.job.id == incoming.id);
        if !matches {
            debug!(job_id = %incoming.id, "Ignoring message for a job no longer in flight");
            return;
        }

        match incoming.body {
            MessageBody::Progress { percent, message } => {
                let Some(entry) = self.in_flight.as_mut() else {
                    return;
                };
                let percent = percent.min(100).max(entry.last_percent);
                entry.last_percent = percent;
                let _ = entry.progress.send(ProgressEvent {
                    job_id: entry.job.id,
                    percent,
                    message,
                });
            }
            MessageBody::Success(output) => {
                if let Some(entry) = self.in_flight.take() {
                    entry.resolve(JobStatus::Succeeded, Ok(output));
                }
            }
            MessageBody::Error(failure) => {
                if let Some(entry) = self.in_flight.take() {
                    entry.resolve(JobStatus::Failed, Err(failure));
                }
            }
        }
    }

    /// The context of `generation` stopped sending. If it is still the
    /// current one, drop it and fail whatever it was running.
    fn context_closed(&mut self, generation: u64) {
        if self.context.as_ref().map(ContextHandle::generation) != Some(generation) {
            return;
        }
        warn!(generation, "Background context exited unexpectedly");
        self.context = None;
        if let Some(entry) = self.in_flight.take() {
            let failure = JobFailure::new(
                ErrorCode::ContextFailed,
                format!("background context exited while running job {}", entry.job.id),
            );
            entry.resolve(JobStatus::Failed, Err(failure));
        }
    }
}

// ---------------------------------------------------------------------------
// JobCoordinator
// ---------------------------------------------------------------------------

/// Accepts jobs from the host and runs them, one at a time, on a background
/// context.
///
/// Must be used from within a tokio runtime.
pub struct JobCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    registry: Arc<HandlerRegistry>,
    config: EngineConfig,
}

impl JobCoordinator {
    /// A coordinator serving every operation kind.
    pub fn new(config: EngineConfig) -> Self {
        let registry = HandlerRegistry::with_defaults(&config);
        Self::with_registry(config, registry)
    }

    /// A coordinator dispatching through a caller-supplied registry.
    pub fn with_registry(config: EngineConfig, registry: HandlerRegistry) -> Self {
        Self {
            state: Arc::new(Mutex::new(CoordinatorState::default())),
            registry: Arc::new(registry),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        lock_state(&self.state)
    }

    /// Submit `operation`. Fails immediately with
    /// [`DocwerkError::AlreadyInProgress`] if a job is running; the running
    /// job is not disturbed.
    #[instrument(skip(self), fields(kind = %operation.kind()))]
    pub fn submit(&self, operation: Operation) -> Result<JobTicket> {
        let mut state = self.lock();
        if let Some(entry) = &state.in_flight {
            return Err(DocwerkError::AlreadyInProgress {
                running: entry.job.id,
            });
        }

        if state.context.is_none() {
            let handle = self.spawn_context(state.contexts_spawned + 1)?;
            state.contexts_spawned += 1;
            state.context = Some(handle);
        }

        let mut job = Job::new(operation.kind());
        let id = job.id;
        let (completion_tx, completion_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();

        let request = JobRequest { id, operation };
        let posted = match &state.context {
            Some(context) => context.post(request),
            None => Err(DocwerkError::ContextFailed("no background context".into())),
        };
        if let Err(err) = posted {
            // A dead context is replaced on the next submit.
            state.context = None;
            return Err(err);
        }

        job.transition(JobStatus::Running);
        info!(job_id = %id, kind = %job.kind, "Job submitted");
        state.in_flight = Some(InFlight {
            job,
            completion: completion_tx,
            progress: progress_tx,
            last_percent: 0,
        });

        Ok(JobTicket {
            id,
            progress: Some(progress_rx),
            completion: completion_rx,
        })
    }

    /// Submit `operation` and wait for its result.
    pub async fn run(&self, operation: Operation) -> Completion {
        let kind = operation.kind();
        let ticket = self.submit(operation).map_err(|err| err.into_failure(kind))?;
        ticket.wait().await
    }

    /// Cancel `job_id` if it is the job in flight: the context is torn down
    /// and the ticket resolves with `CANCELLED`. Returns whether anything
    /// was cancelled.
    #[instrument(skip(self))]
    pub fn cancel(&self, job_id: JobId) -> bool {
        let mut state = self.lock();
        if !state
            .in_flight
            .as_ref()
            .is_some_and(|entry| entry.job.id == job_id)
        {
            debug!("No matching job in flight");
            return false;
        }

        // Dropping the handle tears the context down.
        state.context = None;
        if let Some(entry) = state.in_flight.take() {
            let failure = JobFailure::new(
                ErrorCode::Cancelled,
                DocwerkError::Cancelled(job_id).to_string(),
            );
            entry.resolve(JobStatus::Cancelled, Err(failure));
        }
        info!(%job_id, "Job cancelled");
        true
    }

    /// Cancel whatever job is in flight, returning its id.
    pub fn cancel_current(&self) -> Option<JobId> {
        let running = self.lock().in_flight.as_ref().map(|entry| entry.job.id)?;
        self.cancel(running).then_some(running)
    }

    /// Snapshot of the job in flight, if any.
    pub fn status(&self) -> Option<Job> {
        self.lock().in_flight.as_ref().map(|entry| entry.job.clone())
    }

    /// How many background contexts have been started so far.
    pub fn contexts_spawned(&self) -> u64 {
        self.lock().contexts_spawned
    }

    fn spawn_context(&self, generation: u64) -> Result<ContextHandle> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            DocwerkError::ContextFailed(format!("no tokio runtime available: {err}"))
        })?;

        let (outbound, inbound) = mpsc::unbounded_channel();
        let mut handle = context::spawn(
            &self.config.context_thread_name,
            generation,
            Arc::clone(&self.registry),
            outbound,
        )?;
        let router = runtime.spawn(route_messages(
            Arc::downgrade(&self.state),
            generation,
            inbound,
        ));
        handle.attach_router(router);
        Ok(handle)
    }
}

impl Drop for JobCoordinator {
    fn drop(&mut self) {
        let mut state = self.lock();
        if let Some(entry) = state.in_flight.take() {
            let id = entry.job.id;
            let failure =
                JobFailure::new(ErrorCode::Cancelled, DocwerkError::Cancelled(id).to_string());
            entry.resolve(JobStatus::Cancelled, Err(failure));
        }
        state.context = None;
    }
}

fn lock_state(state: &Mutex<CoordinatorState>) -> MutexGuard<'_, CoordinatorState> {
    // Critical sections never panic midway, so a poisoned lock is still
    // consistent.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Router task: forwards the context's messages into coordinator state
/// until the context's channel closes.
async fn route_messages(
    state: Weak<Mutex<CoordinatorState>>,
    generation: u64,
    mut inbound: mpsc::UnboundedReceiver<WorkerMessage>,
) {
    while let Some(message) = inbound.recv().await {
        let Some(state) = state.upgrade() else {
            return;
        };
        lock_state(&state).route(generation, message);
    }
    if let Some(state) = state.upgrade() {
        lock_state(&state).context_closed(generation);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::progress::ProgressReporter;
    use crate::registry::OperationHandler;
    use docwerk_core::{
        DocumentResult, MergeOptions, OperationDetails, OperationKind, ResultMetadata,
        RotateOptions,
    };

    fn merge_op() -> Operation {
        Operation::Merge {
            documents: vec![vec![1, 2, 3]],
            options: MergeOptions::default(),
        }
    }

    fn rotate_op() -> Operation {
        Operation::Rotate {
            document: Vec::new(),
            options: RotateOptions {
                angle: 90,
                pages: None,
            },
        }
    }

    fn output(bytes: Vec<u8>) -> JobOutput {
        JobOutput::Document(DocumentResult {
            metadata: ResultMetadata {
                original_size: 0,
                processed_size: bytes.len(),
                page_count: 0,
                details: OperationDetails::Merge { file_count: 1 },
            },
            bytes,
        })
    }

    /// Echoes the first input back after reporting a few progress steps.
    struct EchoHandler;

    impl OperationHandler for EchoHandler {
        fn kind(&self) -> OperationKind {
            OperationKind::Merge
        }

        fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
            let Operation::Merge { mut documents, .. } = operation else {
                return Err(DocwerkError::MergeFailed("wrong operation".into()));
            };
            for percent in [10, 50, 30, 90] {
                progress.report(percent, None)?;
            }
            Ok(output(documents.pop().unwrap_or_default()))
        }
    }

    /// Reports progress forever until its context is torn down.
    struct EndlessHandler {
        exits: Arc<AtomicUsize>,
    }

    impl OperationHandler for EndlessHandler {
        fn kind(&self) -> OperationKind {
            OperationKind::Merge
        }

        fn run(&self, _: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
            loop {
                if let Err(err) = progress.report(1, None) {
                    self.exits.fetch_add(1, Ordering::SeqCst);
                    return Err(err);
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }

    /// Reports once, then blocks until the test releases it and echoes the
    /// first input.
    struct GatedHandler {
        gate: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl OperationHandler for GatedHandler {
        fn kind(&self) -> OperationKind {
            OperationKind::Merge
        }

        fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
            let Operation::Merge { mut documents, .. } = operation else {
                return Err(DocwerkError::MergeFailed("wrong operation".into()));
            };
            progress.report(20, Some("Waiting"))?;
            let released = self
                .gate
                .lock()
                .map_err(|_| DocwerkError::MergeFailed("gate poisoned".into()))?
                .recv();
            if released.is_err() {
                return Err(DocwerkError::MergeFailed("gate dropped".into()));
            }
            progress.report(80, None)?;
            Ok(output(documents.pop().unwrap_or_default()))
        }
    }

    fn coordinator(handler: impl OperationHandler + 'static) -> JobCoordinator {
        let mut registry = HandlerRegistry::new();
        registry.register(handler);
        JobCoordinator::with_registry(EngineConfig::default(), registry)
    }

    #[tokio::test]
    async fn job_resolves_with_monotonic_progress() {
        let coordinator = coordinator(EchoHandler);
        let mut ticket = coordinator.submit(merge_op()).expect("submit");
        let mut progress = ticket.take_progress().expect("progress stream");
        let id = ticket.id();

        let result = ticket.wait().await.expect("job succeeds");
        let document = result.into_document().expect("document output");
        assert_eq!(document.bytes, vec![1, 2, 3]);

        let mut seen = Vec::new();
        while let Some(event) = progress.recv().await {
            assert_eq!(event.job_id, id);
            seen.push(event.percent);
        }
        assert_eq!(seen, vec![10, 50, 50, 90]);
        assert!(coordinator.status().is_none());
    }

    #[tokio::test]
    async fn second_submit_is_rejected_while_running() {
        let exits = Arc::new(AtomicUsize::new(0));
        let coordinator = coordinator(EndlessHandler {
            exits: Arc::clone(&exits),
        });
        let first = coordinator.submit(merge_op()).expect("submit");

        let err = coordinator
            .submit(merge_op())
            .err()
            .expect("second submit must fail");
        assert!(matches!(err, DocwerkError::AlreadyInProgress { running } if running == first.id()));
        assert_eq!(
            coordinator.status().map(|job| (job.id, job.status)),
            Some((first.id(), JobStatus::Running))
        );
        assert!(coordinator.cancel(first.id()));
    }

    #[tokio::test]
    async fn rejected_submit_leaves_the_running_job_untouched() {
        let (release, gate) = std::sync::mpsc::channel();
        let coordinator = coordinator(GatedHandler {
            gate: Mutex::new(gate),
        });
        let mut first = coordinator.submit(merge_op()).expect("submit");
        let mut progress = first.take_progress().expect("progress stream");
        let started = progress.recv().await.expect("first progress event");
        assert_eq!(started.percent, 20);

        let err = coordinator
            .submit(merge_op())
            .err()
            .expect("second submit must fail");
        assert!(matches!(err, DocwerkError::AlreadyInProgress { running } if running == first.id()));

        release.send(()).expect("release gate");
        let document = first
            .wait()
            .await
            .expect("first job succeeds")
            .into_document()
            .expect("document output");
        assert_eq!(document.bytes, vec![1, 2, 3]);
        assert!(coordinator.status().is_none());
        assert_eq!(coordinator.contexts_spawned(), 1);
    }

    #[tokio::test]
    async fn cancel_resolves_ticket_and_next_submit_respawns() {
        let exits = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(EndlessHandler {
            exits: Arc::clone(&exits),
        });
        let coordinator = JobCoordinator::with_registry(EngineConfig::default(), registry);

        let mut ticket = coordinator.submit(merge_op()).expect("submit");
        assert_eq!(coordinator.contexts_spawned(), 1);
        // Cancel only once the handler is running inside the context.
        let mut progress = ticket.take_progress().expect("progress stream");
        progress.recv().await.expect("handler started");
        assert_eq!(coordinator.cancel_current(), Some(ticket.id()));

        let failure = ticket.wait().await.err().expect("cancelled");
        assert_eq!(failure.code, ErrorCode::Cancelled);
        assert!(coordinator.status().is_none());

        // The orphaned handler stops at its next progress report.
        for _ in 0..200 {
            if exits.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(exits.load(Ordering::SeqCst), 1);

        let second = coordinator.submit(merge_op()).expect("resubmit");
        assert_eq!(coordinator.contexts_spawned(), 2);
        assert!(coordinator.cancel(second.id()));
    }

    #[tokio::test]
    async fn context_is_reused_between_jobs() {
        let coordinator = coordinator(EchoHandler);
        for _ in 0..3 {
            coordinator.run(merge_op()).await.expect("job succeeds");
        }
        assert_eq!(coordinator.contexts_spawned(), 1);
    }

    #[tokio::test]
    async fn cancelling_an_unknown_job_is_a_no_op() {
        let coordinator = coordinator(EchoHandler);
        assert!(!coordinator.cancel(JobId::new()));
        assert_eq!(coordinator.cancel_current(), None);
        assert_eq!(coordinator.contexts_spawned(), 0);
    }

    #[tokio::test]
    async fn unregistered_kind_fails_with_unknown_operation() {
        let coordinator = coordinator(EchoHandler);
        let failure = coordinator.run(rotate_op()).await.err().expect("fails");
        assert_eq!(failure.code, ErrorCode::UnknownOperation);

        // The context survives and serves the next job.
        coordinator.run(merge_op()).await.expect("merge succeeds");
        assert_eq!(coordinator.contexts_spawned(), 1);
    }

    #[tokio::test]
    async fn stale_messages_are_ignored() {
        let coordinator = coordinator(EndlessHandler {
            exits: Arc::new(AtomicUsize::new(0)),
        });
        let mut ticket = coordinator.submit(merge_op()).expect("submit");
        let mut progress = ticket.take_progress().expect("progress stream");

        {
            let mut state = coordinator.lock();
            let generation = state
                .context
                .as_ref()
                .map(ContextHandle::generation)
                .expect("context");
            // Unknown id: dropped.
            state.route(
                generation,
                WorkerMessage {
                    id: JobId::new(),
                    body: MessageBody::Success(output(Vec::new())),
                },
            );
            assert!(state.in_flight.is_some());
            // Right id, old context: dropped.
            state.route(
                generation + 1,
                WorkerMessage {
                    id: ticket.id(),
                    body: MessageBody::Success(output(Vec::new())),
                },
            );
            assert!(state.in_flight.is_some());
        }

        assert!(coordinator.cancel(ticket.id()));
        let failure = ticket.wait().await.err().expect("cancelled");
        assert_eq!(failure.code, ErrorCode::Cancelled);
        while progress.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn closed_context_fails_the_job_in_flight() {
        let coordinator = coordinator(EndlessHandler {
            exits: Arc::new(AtomicUsize::new(0)),
        });
        let ticket = coordinator.submit(merge_op()).expect("submit");
        {
            let mut state = coordinator.lock();
            let generation = state
                .context
                .as_ref()
                .map(ContextHandle::generation)
                .expect("context");
            state.context_closed(generation);
            assert!(state.context.is_none());
        }
        let failure = ticket.wait().await.err().expect("fails");
        assert_eq!(failure.code, ErrorCode::ContextFailed);
    }

    #[test]
    fn submit_outside_a_runtime_fails_cleanly() {
        let coordinator = coordinator(EchoHandler);
        assert!(matches!(
            coordinator.submit(merge_op()),
            Err(DocwerkError::ContextFailed(_))
        ));
        assert!(coordinator.status().is_none());
    }
}
