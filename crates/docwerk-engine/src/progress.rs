// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting from inside a running handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{JobId, MessageBody, WorkerMessage};
use tokio::sync::mpsc::UnboundedSender;

/// Handle a handler uses to report progress for the job it is running.
///
/// Reported percentages are clamped to 0..=100 and never go backwards.
/// Once the owning context has been torn down every report fails with
/// [`DocwerkError::Cancelled`], so an orphaned handler stops at its next
/// report instead of running to completion.
pub struct ProgressReporter {
    job_id: JobId,
    outbound: UnboundedSender<WorkerMessage>,
    terminated: Arc<AtomicBool>,
    last_percent: u8,
}

impl ProgressReporter {
    pub(crate) fn new(
        job_id: JobId,
        outbound: UnboundedSender<WorkerMessage>,
        terminated: Arc<AtomicBool>,
    ) -> Self {
        Self {
            job_id,
            outbound,
            terminated,
            last_percent: 0,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Report `percent` complete with an optional status line.
    pub fn report(&mut self, percent: u8, message: Option<&str>) -> Result<()> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(DocwerkError::Cancelled(self.job_id));
        }
        let percent = percent.min(100).max(self.last_percent);
        self.last_percent = percent;
        // The coordinator may already have stopped listening.
        let _ = self.outbound.send(WorkerMessage {
            id: self.job_id,
            body: MessageBody::Progress {
                percent,
                message: message.map(str::to_string),
            },
        });
        Ok(())
    }

    /// Report the `done`-th of `total` steps mapped linearly onto `from..=to`.
    pub fn report_step(&mut self, from: u8, to: u8, done: usize, total: usize) -> Result<()> {
        let span = to.saturating_sub(from) as usize;
        let percent = if total == 0 {
            to
        } else {
            from + (span * done.min(total) / total) as u8
        };
        self.report(percent, None)
    }
}

#[cfg(test)]
pub(crate) fn test_reporter() -> (ProgressReporter, tokio::sync::mpsc::UnboundedReceiver<WorkerMessage>) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    (
        ProgressReporter::new(JobId::new(), tx, Arc::new(AtomicBool::new(false))),
        rx,
    )
}
