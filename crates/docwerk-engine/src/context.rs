// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background execution context: a dedicated OS thread that owns all
// document work.
//
// The thread receives `JobRequest`s over a std channel, runs one job at a
// time through the handler registry, and posts `WorkerMessage`s to a tokio
// channel read by the coordinator's router task. Handler errors and panics
// alike are turned into a single `Error` message; nothing escapes the thread.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{JobFailure, JobRequest, MessageBody, WorkerMessage};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::progress::ProgressReporter;
use crate::registry::HandlerRegistry;

/// The coordinator's handle on one running context.
///
/// Dropping the handle tears the context down: the request channel closes,
/// the router task is aborted, and the termination flag makes a handler
/// still running on the orphaned thread stop at its next progress report.
pub(crate) struct ContextHandle {
    generation: u64,
    requests: mpsc::Sender<JobRequest>,
    terminated: Arc<AtomicBool>,
    router: Option<JoinHandle<()>>,
}

impl ContextHandle {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Post a request to the context thread.
    pub(crate) fn post(&self, request: JobRequest) -> Result<()> {
        self.requests.send(request).map_err(|err| {
            DocwerkError::ContextFailed(format!(
                "background context is not accepting requests (job {})",
                err.0.id
            ))
        })
    }

    pub(crate) fn attach_router(&mut self, router: JoinHandle<()>) {
        self.router = Some(router);
    }
}

impl Drop for ContextHandle {
    fn drop(&mut self) {
        self.terminated.store(true, Ordering::Release);
        if let Some(router) = self.router.take() {
            router.abort();
        }
        debug!(generation = self.generation, "Background context torn down");
    }
}

/// Start a context thread. Its messages are posted to `outbound`.
pub(crate) fn spawn(
    thread_name: &str,
    generation: u64,
    registry: Arc<HandlerRegistry>,
    outbound: UnboundedSender<WorkerMessage>,
) -> Result<ContextHandle> {
    let (requests, inbox) = mpsc::channel::<JobRequest>();
    let terminated = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&terminated);

    std::thread::Builder::new()
        .name(format!("{thread_name}-{generation}"))
        .spawn(move || run_loop(inbox, &registry, &outbound, &flag))
        .map_err(|err| {
            DocwerkError::ContextFailed(format!("failed to start background thread: {err}"))
        })?;

    info!(generation, "Background context started");
    Ok(ContextHandle {
        generation,
        requests,
        terminated,
        router: None,
    })
}

fn run_loop(
    inbox: mpsc::Receiver<JobRequest>,
    registry: &HandlerRegistry,
    outbound: &UnboundedSender<WorkerMessage>,
    terminated: &Arc<AtomicBool>,
) {
    while let Ok(request) = inbox.recv() {
        if terminated.load(Ordering::Acquire) {
            break;
        }
        let id = request.id;
        let body = dispatch(registry, request, outbound, terminated);
        if terminated.load(Ordering::Acquire) {
            debug!(job_id = %id, "Context terminated, dropping result");
            break;
        }
        // Send failures mean the router is gone; the loop ends when the
        // request channel closes.
        let _ = outbound.send(WorkerMessage { id, body });
    }
    debug!("Background context thread exiting");
}

/// Run one request through its handler and produce the terminal message.
pub(crate) fn dispatch(
    registry: &HandlerRegistry,
    request: JobRequest,
    outbound: &UnboundedSender<WorkerMessage>,
    terminated: &Arc<AtomicBool>,
) -> MessageBody {
    let JobRequest { id, operation } = request;
    let kind = operation.kind();

    let Some(handler) = registry.get(kind) else {
        warn!(job_id = %id, %kind, "No handler registered");
        return MessageBody::Error(DocwerkError::UnknownOperation(kind).into_failure(kind));
    };

    info!(job_id = %id, %kind, input_bytes = operation.input_size(), "Job started");
    let mut progress = ProgressReporter::new(id, outbound.clone(), Arc::clone(terminated));
    let outcome = catch_unwind(AssertUnwindSafe(|| handler.run(operation, &mut progress)));

    match outcome {
        Ok(Ok(output)) => {
            info!(job_id = %id, %kind, "Job succeeded");
            MessageBody::Success(output)
        }
        Ok(Err(err)) => {
            let failure = err.into_failure(kind);
            warn!(job_id = %id, %kind, code = %failure.code, "Job failed: {}", failure.message);
            MessageBody::Error(failure)
        }
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(job_id = %id, %kind, "Handler panicked: {detail}");
            MessageBody::Error(JobFailure::new(
                kind.failure_code(),
                format!("{kind} handler panicked: {detail}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwerk_core::{ErrorCode, JobId, JobOutput, MergeOptions, Operation, OperationKind};

    use crate::registry::OperationHandler;

    struct PanickingHandler;

    impl OperationHandler for PanickingHandler {
        fn kind(&self) -> OperationKind {
            OperationKind::Merge
        }

        fn run(&self, _: Operation, _: &mut ProgressReporter) -> Result<JobOutput> {
            panic!("boom");
        }
    }

    struct FailingHandler;

    impl OperationHandler for FailingHandler {
        fn kind(&self) -> OperationKind {
            OperationKind::Merge
        }

        fn run(&self, _: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
            progress.report(40, None)?;
            Err(DocwerkError::PdfError("broken xref".into()))
        }
    }

    fn merge_request() -> JobRequest {
        JobRequest {
            id: JobId::new(),
            operation: Operation::Merge {
                documents: Vec::new(),
                options: MergeOptions::default(),
            },
        }
    }

    fn run(registry: &HandlerRegistry) -> (MessageBody, Vec<WorkerMessage>) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let flag = Arc::new(AtomicBool::new(false));
        let body = dispatch(registry, merge_request(), &tx, &flag);
        let mut progress = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            progress.push(msg);
        }
        (body, progress)
    }

    #[test]
    fn missing_handler_is_unknown_operation() {
        let (body, _) = run(&HandlerRegistry::new());
        let MessageBody::Error(failure) = body else {
            panic!("expected an error");
        };
        assert_eq!(failure.code, ErrorCode::UnknownOperation);
        assert!(failure.message.contains("unknown operation"));
    }

    #[test]
    fn panics_become_kind_failures() {
        let mut registry = HandlerRegistry::new();
        registry.register(PanickingHandler);
        let (body, _) = run(&registry);
        let MessageBody::Error(failure) = body else {
            panic!("expected an error");
        };
        assert_eq!(failure.code, ErrorCode::MergeFailed);
        assert!(failure.message.contains("boom"));
    }

    #[test]
    fn generic_errors_map_to_the_kind_code() {
        let mut registry = HandlerRegistry::new();
        registry.register(FailingHandler);
        let (body, progress) = run(&registry);
        let MessageBody::Error(failure) = body else {
            panic!("expected an error");
        };
        assert_eq!(failure.code, ErrorCode::MergeFailed);
        assert!(failure.message.contains("broken xref"));
        assert_eq!(progress.len(), 1);
    }
}
