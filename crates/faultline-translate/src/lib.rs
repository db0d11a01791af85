// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use std::sync::Arc;

use faultline_core::{ErrorContext, FieldError, ResolverFailure};
use tracing::debug;

// ── ErrorTranslator ─────────────────────────────────────────────────

/// Maps a raw resolver failure into client-facing errors.
///
/// The return value is a tri-state:
///
/// - `None` — this translator does not recognise the failure; defer to the
///   next translator or the engine default.
/// - `Some(vec![])` — the failure is recognised and any client-visible
///   error is deliberately suppressed.
/// - `Some(errors)` — these are the client-visible errors for the failure.
///
/// Translators must be side-effect-free with respect to the response; any
/// monitoring goes through the reporter protocol instead. Registration order
/// in a [`TranslatorChain`] is the only precedence signal, so an
/// implementation is responsible for its own discrimination, typically via
/// `downcast_ref`:
///
/// ```
/// use faultline_core::{ErrorContext, FieldError, ResolverFailure};
/// use faultline_translate::ErrorTranslator;
///
/// #[derive(Debug)]
/// struct Unauthorized;
///
/// impl std::fmt::Display for Unauthorized {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("unauthorized")
///     }
/// }
/// impl std::error::Error for Unauthorized {}
///
/// struct AuthTranslator;
///
/// impl ErrorTranslator for AuthTranslator {
///     fn translate(
///         &self,
///         failure: &ResolverFailure,
///         context: &ErrorContext,
///     ) -> Option<Vec<FieldError>> {
///         failure.downcast_ref::<Unauthorized>().map(|_| {
///             vec![
///                 FieldError::from_context(context)
///                     .message("Not authorized")
///                     .error_type("UNAUTHORIZED")
///                     .build(),
///             ]
///         })
///     }
/// }
/// ```
pub trait ErrorTranslator: Send + Sync {
    /// Translate `failure` into client-facing errors, or defer with `None`.
    fn translate(
        &self,
        failure: &ResolverFailure,
        context: &ErrorContext,
    ) -> Option<Vec<FieldError>>;
}

impl<F> ErrorTranslator for F
where
    F: Fn(&ResolverFailure, &ErrorContext) -> Option<Vec<FieldError>> + Send + Sync,
{
    fn translate(
        &self,
        failure: &ResolverFailure,
        context: &ErrorContext,
    ) -> Option<Vec<FieldError>> {
        self(failure, context)
    }
}

/// Translator that recognises nothing and always defers. Safe default when
/// no custom handling is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTranslator;

impl ErrorTranslator for NoOpTranslator {
    fn translate(
        &self,
        _failure: &ResolverFailure,
        _context: &ErrorContext,
    ) -> Option<Vec<FieldError>> {
        None
    }
}

// ── TranslatorChain ─────────────────────────────────────────────────

/// Ordered composition of translators with first-match-wins resolution.
///
/// Translators are evaluated in registration order; the chain stops at the
/// first result that is not `None` — an empty list is a definitive
/// "suppress", distinct from "defer". When every translator defers the
/// chain itself defers, signalling the engine to apply its built-in default
/// error shape. No translator is invoked more than once per failure.
///
/// Assemble at startup, then share freely: the chain is read-only after
/// construction and `Clone` shares the registered translators.
#[derive(Clone, Default)]
pub struct TranslatorChain {
    translators: Vec<Arc<dyn ErrorTranslator>>,
}

impl TranslatorChain {
    /// Chain with no translators registered; it defers on every failure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a translator at the end of the chain.
    #[must_use]
    pub fn with(mut self, translator: impl ErrorTranslator + 'static) -> Self {
        self.translators.push(Arc::new(translator));
        self
    }

    /// Register an already-shared translator at the end of the chain.
    #[must_use]
    pub fn with_shared(mut self, translator: Arc<dyn ErrorTranslator>) -> Self {
        self.translators.push(translator);
        self
    }

    /// Number of registered translators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.translators.len()
    }

    /// Whether the chain has no translators registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}

impl ErrorTranslator for TranslatorChain {
    fn translate(
        &self,
        failure: &ResolverFailure,
        context: &ErrorContext,
    ) -> Option<Vec<FieldError>> {
        for (index, translator) in self.translators.iter().enumerate() {
            if let Some(errors) = translator.translate(failure, context) {
                debug!(
                    translator = index,
                    produced = errors.len(),
                    "translator handled resolver failure"
                );
                return Some(errors);
            }
        }
        None
    }
}

impl fmt::Debug for TranslatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorChain")
            .field("translators", &self.translators.len())
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
