// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use faultline_core::{ErrorContext, ResolverFailure};
use thiserror::Error;
use tracing::error;

// ---------------------------------------------------------------------------
// ErrorReporter
// ---------------------------------------------------------------------------

/// Fire-and-forget notification of a resolver failure to an observability
/// channel.
///
/// Reporters run independently of translation: whatever the translator chain
/// decides to show the caller, every registered reporter still sees the
/// failure. The return value is `()` by contract; a reporter that performs
/// I/O owns its own timeouts, the chain imposes no deadline and performs no
/// retries.
pub trait ErrorReporter: Send + Sync {
    /// Report `failure` with a human-readable `message` and the context
    /// record of the failure site.
    fn report(&self, failure: &ResolverFailure, message: &str, context: &ErrorContext);
}

impl<F> ErrorReporter for F
where
    F: Fn(&ResolverFailure, &str, &ErrorContext) + Send + Sync,
{
    fn report(&self, failure: &ResolverFailure, message: &str, context: &ErrorContext) {
        self(failure, message, context);
    }
}

/// Reporter that does nothing and cannot fail. Safe default when no
/// observability channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl ErrorReporter for NoOpReporter {
    fn report(&self, _failure: &ResolverFailure, _message: &str, _context: &ErrorContext) {}
}

/// Reporter that emits one structured `tracing` event per failure, carrying
/// the context record's backward-compatible projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, failure: &ResolverFailure, message: &str, context: &ErrorContext) {
        error!(failure = %failure, context = %context, "{}", message);
    }
}

// ---------------------------------------------------------------------------
// ReporterPanic
// ---------------------------------------------------------------------------

/// A failure raised inside a reporter implementation, captured at the chain
/// boundary instead of propagating into the resolution path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error reporter {index} panicked: {message}")]
pub struct ReporterPanic {
    /// Registration index of the reporter that panicked.
    pub index: usize,
    /// Rendered panic payload.
    pub message: String,
}

fn panic_payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// ReporterChain
// ---------------------------------------------------------------------------

/// Ordered composition of reporters, each invoked unconditionally.
///
/// Reporting is fan-out, not short-circuit: every registered reporter is
/// invoked for every failure, in registration order, regardless of whether
/// earlier reporters succeeded. A panic inside one reporter is captured as a
/// [`ReporterPanic`], handed to the last-resort `tracing` sink, and never
/// re-raised; it does not delay or cancel the reporters after it.
///
/// Assemble at startup, then share freely: the chain is read-only after
/// construction and `Clone` shares the registered reporters.
#[derive(Clone, Default)]
pub struct ReporterChain {
    reporters: Vec<Arc<dyn ErrorReporter>>,
}

impl ReporterChain {
    /// Chain with no reporters registered; reporting through it is a no-op.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reporter at the end of the chain.
    #[must_use]
    pub fn with(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporters.push(Arc::new(reporter));
        self
    }

    /// Register an already-shared reporter at the end of the chain.
    #[must_use]
    pub fn with_shared(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Number of registered reporters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    /// Whether the chain has no reporters registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    fn dispatch(
        &self,
        failure: &ResolverFailure,
        message: &str,
        context: &ErrorContext,
    ) -> Vec<ReporterPanic> {
        let mut panics = Vec::new();
        for (index, reporter) in self.reporters.iter().enumerate() {
            let outcome =
                catch_unwind(AssertUnwindSafe(|| reporter.report(failure, message, context)));
            if let Err(payload) = outcome {
                panics.push(ReporterPanic {
                    index,
                    message: panic_payload_message(payload.as_ref()),
                });
            }
        }
        panics
    }
}

impl ErrorReporter for ReporterChain {
    fn report(&self, failure: &ResolverFailure, message: &str, context: &ErrorContext) {
        for captured in self.dispatch(failure, message, context) {
            error!(
                reporter = captured.index,
                panic = %captured.message,
                "error reporter panicked; continuing with remaining reporters"
            );
        }
    }
}

impl fmt::Debug for ReporterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterChain")
            .field("reporters", &self.reporters.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
