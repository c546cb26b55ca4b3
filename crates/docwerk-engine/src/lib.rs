// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docwerk-engine: Moves document transformations off the caller's thread.
//
// A `JobCoordinator` on the tokio runtime owns one background execution
// context (a dedicated OS thread). Jobs are posted to it as typed requests,
// dispatched through a kind-keyed handler registry, and their progress and
// results are routed back by job id.

mod context;
pub mod coordinator;
pub mod handlers;
pub mod progress;
pub mod registry;

pub use coordinator::{JobCoordinator, JobTicket};
pub use progress::ProgressReporter;
pub use registry::{HandlerRegistry, OperationHandler};
