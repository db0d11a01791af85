// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

use std::fmt;

use faultline_core::{
    ErrorContext, FieldError, OpaqueRef, PathSegment, ResolverFailure, SourceLocation,
};
use faultline_report::{ErrorReporter, ReporterChain};
use faultline_translate::{ErrorTranslator, TranslatorChain};

// ---------------------------------------------------------------------------
// Engine-native boundary types
// ---------------------------------------------------------------------------

/// Engine-native description of the failing field, as handed to legacy
/// callbacks.
#[derive(Debug, Clone, Default)]
pub struct FieldDefinition {
    /// Field name.
    pub name: String,
    /// Name of the type the field is declared on.
    pub parent_type: Option<String>,
    /// Component that owns the field definition.
    pub component_name: Option<String>,
}

impl FieldDefinition {
    /// Definition with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_type: None,
            component_name: None,
        }
    }
}

/// Engine-native per-field resolution environment, as handed to legacy
/// callbacks.
#[derive(Clone, Default)]
pub struct ResolutionEnvironment {
    /// Name of the operation being executed.
    pub operation_name: Option<String>,
    /// Path segments from the query root to the failing field.
    pub execution_path: Option<Vec<PathSegment>>,
    /// Where in the query document the failing field was requested.
    pub source_location: Option<SourceLocation>,
    /// Resolver identifiers on the failing path, outermost first.
    pub resolver_trail: Option<Vec<String>>,
    /// The parent object being resolved.
    pub source: Option<OpaqueRef>,
    /// Request-scoped context carrier.
    pub context: Option<OpaqueRef>,
    /// Field-scoped local context carrier.
    pub local_context: Option<OpaqueRef>,
}

impl fmt::Debug for ResolutionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionEnvironment")
            .field("operation_name", &self.operation_name)
            .field("execution_path", &self.execution_path)
            .field("source_location", &self.source_location)
            .field("resolver_trail", &self.resolver_trail)
            .field("source", &self.source.as_ref().map(|_| "<opaque>"))
            .field("context", &self.context.as_ref().map(|_| "<opaque>"))
            .field(
                "local_context",
                &self.local_context.as_ref().map(|_| "<opaque>"),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Context adaptation
// ---------------------------------------------------------------------------

/// Merge an engine-native environment into a context record.
///
/// Fields already present on `base` win; the environment only fills what the
/// legacy caller left absent, so a caller-supplied record passes through
/// unchanged.
#[must_use]
pub fn context_from_environment(
    environment: &ResolutionEnvironment,
    base: &ErrorContext,
) -> ErrorContext {
    let mut merged = base.clone();
    if merged.operation_name.is_none() {
        merged.operation_name = environment.operation_name.clone();
    }
    if merged.resolvers.is_none() {
        merged.resolvers = environment.resolver_trail.clone();
    }
    if merged.execution_path.is_none() {
        merged.execution_path = environment.execution_path.clone();
    }
    if merged.source_location.is_none() {
        merged.source_location = environment.source_location.clone();
    }
    if merged.source.is_none() {
        merged.source = environment.source.clone();
    }
    if merged.context.is_none() {
        merged.context = environment.context.clone();
    }
    if merged.local_context.is_none() {
        merged.local_context = environment.local_context.clone();
    }
    merged
}

/// Merge an engine-native field definition and environment into a context
/// record. Same precedence as [`context_from_environment`]: `base` wins.
#[must_use]
pub fn context_from_parts(
    field: &FieldDefinition,
    environment: &ResolutionEnvironment,
    base: &ErrorContext,
) -> ErrorContext {
    let mut merged = context_from_environment(environment, base);
    if merged.field_name.is_none() {
        merged.field_name = Some(field.name.clone());
    }
    if merged.parent_type.is_none() {
        merged.parent_type = field.parent_type.clone();
    }
    if merged.component_name.is_none() {
        merged.component_name = field.component_name.clone();
    }
    merged
}

// ---------------------------------------------------------------------------
// Legacy protocols
// ---------------------------------------------------------------------------

/// Legacy reporter signature carrying the engine's native types.
#[deprecated(
    since = "0.1.0",
    note = "implement `faultline_report::ErrorReporter`; this trait exposes engine-native types"
)]
pub trait LegacyErrorReporter: Send + Sync {
    /// Report a resolver failure with the engine-native five-tuple.
    fn report_error(
        &self,
        failure: &ResolverFailure,
        field: &FieldDefinition,
        environment: &ResolutionEnvironment,
        message: &str,
        context: &ErrorContext,
    );
}

#[allow(deprecated)]
impl<F> LegacyErrorReporter for F
where
    F: Fn(&ResolverFailure, &FieldDefinition, &ResolutionEnvironment, &str, &ErrorContext)
        + Send
        + Sync,
{
    fn report_error(
        &self,
        failure: &ResolverFailure,
        field: &FieldDefinition,
        environment: &ResolutionEnvironment,
        message: &str,
        context: &ErrorContext,
    ) {
        self(failure, field, environment, message, context);
    }
}

/// Legacy reporter that does nothing and cannot fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLegacyReporter;

#[allow(deprecated)]
impl LegacyErrorReporter for NoOpLegacyReporter {
    fn report_error(
        &self,
        _failure: &ResolverFailure,
        _field: &FieldDefinition,
        _environment: &ResolutionEnvironment,
        _message: &str,
        _context: &ErrorContext,
    ) {
    }
}

/// Legacy translator signature carrying the engine's native environment.
#[deprecated(
    since = "0.1.0",
    note = "implement `faultline_translate::ErrorTranslator`; this trait exposes engine-native types"
)]
pub trait LegacyErrorTranslator: Send + Sync {
    /// Translate a resolver failure, or defer with `None`.
    fn translate_error(
        &self,
        failure: &ResolverFailure,
        environment: &ResolutionEnvironment,
        context: &ErrorContext,
    ) -> Option<Vec<FieldError>>;
}

#[allow(deprecated)]
impl<F> LegacyErrorTranslator for F
where
    F: Fn(&ResolverFailure, &ResolutionEnvironment, &ErrorContext) -> Option<Vec<FieldError>>
        + Send
        + Sync,
{
    fn translate_error(
        &self,
        failure: &ResolverFailure,
        environment: &ResolutionEnvironment,
        context: &ErrorContext,
    ) -> Option<Vec<FieldError>> {
        self(failure, environment, context)
    }
}

/// Legacy translator that recognises nothing and always defers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLegacyTranslator;

#[allow(deprecated)]
impl LegacyErrorTranslator for NoOpLegacyTranslator {
    fn translate_error(
        &self,
        _failure: &ResolverFailure,
        _environment: &ResolutionEnvironment,
        _context: &ErrorContext,
    ) -> Option<Vec<FieldError>> {
        None
    }
}

// ---------------------------------------------------------------------------
// Bridges onto the modern chains
// ---------------------------------------------------------------------------

/// Adapts legacy reporter calls onto a modern [`ReporterChain`].
///
/// The bridge carries no logic of its own: it builds a context record from
/// the native types via [`context_from_parts`] and forwards, so its output
/// is behaviorally identical to calling the chain directly with an
/// equivalent record.
#[derive(Debug, Clone, Default)]
pub struct LegacyReporterBridge {
    chain: ReporterChain,
}

impl LegacyReporterBridge {
    /// Bridge forwarding to the given chain.
    #[must_use]
    pub fn new(chain: ReporterChain) -> Self {
        Self { chain }
    }
}

#[allow(deprecated)]
impl LegacyErrorReporter for LegacyReporterBridge {
    fn report_error(
        &self,
        failure: &ResolverFailure,
        field: &FieldDefinition,
        environment: &ResolutionEnvironment,
        message: &str,
        context: &ErrorContext,
    ) {
        let merged = context_from_parts(field, environment, context);
        self.chain.report(failure, message, &merged);
    }
}

/// Adapts legacy translator calls onto a modern [`TranslatorChain`].
#[derive(Debug, Clone, Default)]
pub struct LegacyTranslatorBridge {
    chain: TranslatorChain,
}

impl LegacyTranslatorBridge {
    /// Bridge forwarding to the given chain.
    #[must_use]
    pub fn new(chain: TranslatorChain) -> Self {
        Self { chain }
    }
}

#[allow(deprecated)]
impl LegacyErrorTranslator for LegacyTranslatorBridge {
    fn translate_error(
        &self,
        failure: &ResolverFailure,
        environment: &ResolutionEnvironment,
        context: &ErrorContext,
    ) -> Option<Vec<FieldError>> {
        let merged = context_from_environment(environment, context);
        self.chain.translate(failure, &merged)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("entity not found")]
    struct NotFound;

    fn field() -> FieldDefinition {
        FieldDefinition {
            name: "name".to_string(),
            parent_type: Some("User".to_string()),
            component_name: Some("user-service".to_string()),
        }
    }

    fn environment() -> ResolutionEnvironment {
        ResolutionEnvironment {
            operation_name: Some("GetUser".to_string()),
            execution_path: Some(vec![PathSegment::field("user"), PathSegment::field("name")]),
            source_location: Some(SourceLocation::new(5, 10)),
            resolver_trail: Some(vec!["UserResolver".to_string()]),
            source: Some(Arc::new("parent-object".to_string())),
            context: Some(Arc::new(42_u64)),
            local_context: None,
        }
    }

    #[test]
    fn context_from_parts_extracts_native_fields() {
        let context = context_from_parts(&field(), &environment(), &ErrorContext::EMPTY);

        assert_eq!(context.field_name.as_deref(), Some("name"));
        assert_eq!(context.parent_type.as_deref(), Some("User"));
        assert_eq!(context.component_name.as_deref(), Some("user-service"));
        assert_eq!(context.operation_name.as_deref(), Some("GetUser"));
        assert_eq!(
            context.execution_path,
            Some(vec![PathSegment::field("user"), PathSegment::field("name")])
        );
        assert_eq!(context.source_location, Some(SourceLocation::new(5, 10)));
        assert_eq!(context.resolvers, Some(vec!["UserResolver".to_string()]));
        assert_eq!(context.source_as::<String>().map(String::as_str), Some("parent-object"));
        assert_eq!(context.context_as::<u64>(), Some(&42));
        assert!(context.local_context.is_none());
    }

    #[test]
    fn caller_supplied_record_wins_over_native_types() {
        let base = ErrorContext::EMPTY
            .with_field_name("overridden")
            .with_operation_name("CallerOp")
            .with_error_type("CALLER_ERROR");

        let context = context_from_parts(&field(), &environment(), &base);

        assert_eq!(context.field_name.as_deref(), Some("overridden"));
        assert_eq!(context.operation_name.as_deref(), Some("CallerOp"));
        assert_eq!(context.error_type.as_deref(), Some("CALLER_ERROR"));
        // Fields the caller left absent are still filled from the engine.
        assert_eq!(context.parent_type.as_deref(), Some("User"));
    }

    #[test]
    fn reporter_bridge_matches_the_direct_modern_path() {
        let direct_calls: Arc<Mutex<Vec<String>>> = Arc::default();
        let bridged_calls: Arc<Mutex<Vec<String>>> = Arc::default();

        let record = |sink: Arc<Mutex<Vec<String>>>| {
            move |failure: &ResolverFailure, message: &str, context: &ErrorContext| {
                sink.lock()
                    .unwrap()
                    .push(format!("{failure}|{message}|{context}"));
            }
        };

        let direct_chain = ReporterChain::new().with(record(Arc::clone(&direct_calls)));
        let bridged_chain = ReporterChain::new().with(record(Arc::clone(&bridged_calls)));

        let base = ErrorContext::EMPTY.with_error_type("NOT_FOUND");
        let merged = context_from_parts(&field(), &environment(), &base);
        direct_chain.report(&NotFound, "field failed", &merged);

        let bridge = LegacyReporterBridge::new(bridged_chain);
        bridge.report_error(&NotFound, &field(), &environment(), "field failed", &base);

        assert_eq!(*direct_calls.lock().unwrap(), *bridged_calls.lock().unwrap());
    }

    #[test]
    fn translator_bridge_forwards_the_merged_record() {
        let translator = |failure: &ResolverFailure, context: &ErrorContext| {
            failure.downcast_ref::<NotFound>().map(|_| {
                vec![
                    FieldError::from_context(context)
                        .message("Not found")
                        .error_type("NOT_FOUND")
                        .build(),
                ]
            })
        };
        let bridge = LegacyTranslatorBridge::new(TranslatorChain::new().with(translator));

        let errors = bridge
            .translate_error(&NotFound, &environment(), &ErrorContext::EMPTY)
            .unwrap();

        // The seeded path proves the environment reached the translator.
        assert_eq!(
            errors[0].path,
            Some(vec![PathSegment::field("user"), PathSegment::field("name")])
        );
        assert_eq!(errors[0].locations, Some(vec![SourceLocation::new(5, 10)]));
    }

    #[test]
    fn translator_bridge_defers_when_the_chain_defers() {
        let bridge = LegacyTranslatorBridge::new(TranslatorChain::new());
        assert!(
            bridge
                .translate_error(&NotFound, &environment(), &ErrorContext::EMPTY)
                .is_none()
        );
    }

    #[test]
    fn legacy_noops_behave_like_modern_ones() {
        NoOpLegacyReporter.report_error(
            &NotFound,
            &field(),
            &environment(),
            "message",
            &ErrorContext::EMPTY,
        );
        assert!(
            NoOpLegacyTranslator
                .translate_error(&NotFound, &environment(), &ErrorContext::EMPTY)
                .is_none()
        );
    }

    #[test]
    fn closures_implement_the_legacy_protocols() {
        let seen = Arc::new(Mutex::new(None::<String>));
        let sink = Arc::clone(&seen);
        let reporter = move |_: &ResolverFailure,
                             field: &FieldDefinition,
                             _: &ResolutionEnvironment,
                             message: &str,
                             _: &ErrorContext| {
            *sink.lock().unwrap() = Some(format!("{}:{message}", field.name));
        };

        reporter.report_error(
            &NotFound,
            &field(),
            &environment(),
            "failed",
            &ErrorContext::EMPTY,
        );

        assert_eq!(seen.lock().unwrap().as_deref(), Some("name:failed"));
    }
}
