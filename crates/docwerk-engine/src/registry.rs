// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kind-keyed dispatch table consulted by the background context.

use std::collections::HashMap;

use docwerk_core::error::Result;
use docwerk_core::{EngineConfig, JobOutput, Operation, OperationKind};

use crate::handlers;
use crate::progress::ProgressReporter;

/// One transformation the background context knows how to run.
///
/// Handlers run on the context thread and may block for as long as the work
/// takes. They are only ever handed operations of their own [`kind`].
///
/// [`kind`]: OperationHandler::kind
pub trait OperationHandler: Send + Sync {
    fn kind(&self) -> OperationKind;

    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput>;
}

/// Handlers keyed by the operation kind they serve.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<OperationKind, Box<dyn OperationHandler>>,
}

impl HandlerRegistry {
    /// A registry with no handlers. Every request fails with
    /// `UNKNOWN_OPERATION` until handlers are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry serving every operation kind.
    pub fn with_defaults(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        registry.register(handlers::merge::MergeHandler);
        registry.register(handlers::split::SplitHandler);
        registry.register(handlers::rotate::RotateHandler);
        registry.register(handlers::watermark::WatermarkHandler::new(
            config.watermark_corner_inset,
        ));
        registry.register(handlers::image_to_document::ImageToDocumentHandler::new(
            config.auto_page_base_width,
        ));
        registry.register(handlers::compress::CompressHandler);
        registry.register(handlers::password::PasswordWrapHandler::new(
            config.wrapper_fragment_len,
            config.producer.clone(),
        ));
        registry.register(handlers::password::PasswordUnwrapHandler::new(
            config.producer.clone(),
        ));
        registry
    }

    /// Register `handler` for its kind, replacing any previous handler.
    pub fn register(&mut self, handler: impl OperationHandler + 'static) -> &mut Self {
        self.handlers.insert(handler.kind(), Box::new(handler));
        self
    }

    pub fn get(&self, kind: OperationKind) -> Option<&dyn OperationHandler> {
        self.handlers.get(&kind).map(|handler| handler.as_ref())
    }

    /// Kinds with a registered handler.
    pub fn kinds(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| self.handlers.contains_key(kind))
            .collect()
    }
}
