// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Submit a planned job, follow its progress, and write what it produces.
// Ctrl-C cancels the job in flight.

use std::path::PathBuf;

use docwerk_core::{ItemFailure, JobId, JobOutput, OperationKind, ResultMetadata};
use docwerk_engine::JobCoordinator;
use serde::Serialize;
use tracing::{info, warn};

use crate::commands::{Destination, Plan};
use crate::error::CliError;

/// Printed to stdout as JSON once a job succeeds.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub job_id: JobId,
    pub operation: OperationKind,
    pub outputs: Vec<WrittenOutput>,
    /// Batch items that failed without failing the job.
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Serialize)]
pub struct WrittenOutput {
    pub path: PathBuf,
    pub metadata: ResultMetadata,
}

pub async fn execute(coordinator: &JobCoordinator, plan: Plan) -> Result<Summary, CliError> {
    let kind = plan.operation.kind();
    let mut ticket = coordinator
        .submit(plan.operation)
        .map_err(|err| CliError::Job(err.into_failure(kind)))?;
    let job_id = ticket.id();

    if let Some(mut progress) = ticket.take_progress() {
        tokio::spawn(async move {
            while let Some(event) = progress.recv().await {
                info!(
                    percent = event.percent,
                    message = event.message.as_deref().unwrap_or_default(),
                    "Progress"
                );
            }
        });
    }

    let completion = ticket.wait();
    tokio::pin!(completion);
    let result = tokio::select! {
        result = &mut completion => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!(%job_id, "Interrupted, cancelling job");
            coordinator.cancel(job_id);
            completion.await
        }
    };
    let output = result.map_err(CliError::Job)?;
    write_outputs(job_id, kind, output, &plan.destination)
}

/// Write every produced document and collect the summary.
pub fn write_outputs(
    job_id: JobId,
    operation: OperationKind,
    output: JobOutput,
    destination: &Destination,
) -> Result<Summary, CliError> {
    let mut summary = Summary {
        job_id,
        operation,
        outputs: Vec::new(),
        failures: Vec::new(),
    };
    match output {
        JobOutput::Document(document) => {
            let path = destination.path_for(None);
            write_file(&path, &document.bytes)?;
            summary.outputs.push(WrittenOutput {
                path,
                metadata: document.metadata,
            });
        }
        JobOutput::Batch(items) => {
            for item in items {
                match item.outcome {
                    Ok(document) => {
                        let path = destination.path_for(Some(item.index));
                        write_file(&path, &document.bytes)?;
                        summary.outputs.push(WrittenOutput {
                            path,
                            metadata: document.metadata,
                        });
                    }
                    Err(failure) => {
                        warn!(index = item.index, reason = %failure.message, "Item failed");
                        summary.failures.push(failure);
                    }
                }
            }
        }
    }
    info!(
        %job_id,
        written = summary.outputs.len(),
        failed = summary.failures.len(),
        "Outputs written"
    );
    Ok(summary)
}

fn write_file(path: &std::path::Path, bytes: &[u8]) -> Result<(), CliError> {
    let write = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write)?;
    }
    std::fs::write(path, bytes).map_err(write)
}
