// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable snapshot of everything known about a failure site.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OpaqueRef
// ---------------------------------------------------------------------------

/// Shared reference to an engine-owned value: the parent object being
/// resolved, the request-scoped context, or the field-scoped local context.
///
/// The core never inspects the contents. Consumers that know the concrete
/// type supplied by the embedding engine retrieve it with
/// [`ErrorContext::source_as`], [`ErrorContext::context_as`], or
/// [`ErrorContext::local_context_as`].
pub type OpaqueRef = Arc<dyn Any + Send + Sync>;

// ---------------------------------------------------------------------------
// PathSegment
// ---------------------------------------------------------------------------

/// Segment of an execution path: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PathSegment {
    /// A named field.
    Field(String),
    /// An index into a list value.
    Index(usize),
}

impl PathSegment {
    /// Segment for a named field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Segment for a list index.
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceLocation
// ---------------------------------------------------------------------------

/// A location in the original query document where the failing field was
/// requested. Lines and columns are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Line in the source document.
    pub line: u32,
    /// Column in the source document.
    pub column: u32,
    /// Name of the source document, when the engine tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl SourceLocation {
    /// Location with no source name.
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            source_name: None,
        }
    }

    /// Attach the name of the source document.
    #[must_use]
    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)?;
        if let Some(name) = &self.source_name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ErrorContext
// ---------------------------------------------------------------------------

/// Immutable snapshot of everything known about a failure site, carried
/// across the translator/reporter handoff.
///
/// Every field is optional. Records are shared by reference (or cheap
/// `Clone`, the opaque handles are `Arc`s); no component mutates a record it
/// did not create. Construction is either a struct literal over
/// [`ErrorContext::EMPTY`] / `Default` or the fluent `with_*` methods:
///
/// ```
/// use faultline_core::ErrorContext;
///
/// let context = ErrorContext::EMPTY
///     .with_field_name("name")
///     .with_parent_type("User")
///     .with_operation_name("GetUser");
/// assert_eq!(context.field_name.as_deref(), Some("name"));
/// ```
#[derive(Clone, Default)]
pub struct ErrorContext {
    /// Name of the field whose resolution failed.
    pub field_name: Option<String>,
    /// Type of the parent object the field was resolved on.
    pub parent_type: Option<String>,
    /// Name of the operation being executed.
    pub operation_name: Option<String>,
    /// Component that owns the failing field definition.
    pub component_name: Option<String>,
    /// Whether the failure is a framework fault rather than a tenant fault.
    /// `None` means unknown.
    pub is_framework_error: Option<bool>,
    /// Resolver identifiers on the path that produced the failure,
    /// outermost first.
    pub resolvers: Option<Vec<String>>,
    /// Free-form classification of the failure.
    pub error_type: Option<String>,
    /// Path segments from the query root to the failing field.
    pub execution_path: Option<Vec<PathSegment>>,
    /// Where in the query document the failing field was requested.
    pub source_location: Option<SourceLocation>,
    /// The parent object being resolved. Opaque to the core.
    pub source: Option<OpaqueRef>,
    /// Request-scoped carrier (correlation ids and the like). Opaque to the
    /// core.
    pub context: Option<OpaqueRef>,
    /// Field-scoped carrier (synthetic/derived sub-operation markers and the
    /// like). Opaque to the core.
    pub local_context: Option<OpaqueRef>,
}

impl ErrorContext {
    /// The record with every field absent. Safe default for callers that
    /// have nothing to say about the failure site.
    pub const EMPTY: ErrorContext = ErrorContext {
        field_name: None,
        parent_type: None,
        operation_name: None,
        component_name: None,
        is_framework_error: None,
        resolvers: None,
        error_type: None,
        execution_path: None,
        source_location: None,
        source: None,
        context: None,
        local_context: None,
    };

    /// Set the failing field's name.
    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Set the parent type name.
    #[must_use]
    pub fn with_parent_type(mut self, parent_type: impl Into<String>) -> Self {
        self.parent_type = Some(parent_type.into());
        self
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    /// Set the owning component's name.
    #[must_use]
    pub fn with_component_name(mut self, component_name: impl Into<String>) -> Self {
        self.component_name = Some(component_name.into());
        self
    }

    /// Mark the failure as a framework fault (`true`) or tenant fault
    /// (`false`).
    #[must_use]
    pub fn with_framework_error(mut self, is_framework_error: bool) -> Self {
        self.is_framework_error = Some(is_framework_error);
        self
    }

    /// Set the resolver identifiers on the failing path, outermost first.
    #[must_use]
    pub fn with_resolvers(mut self, resolvers: Vec<String>) -> Self {
        self.resolvers = Some(resolvers);
        self
    }

    /// Set the failure classification.
    #[must_use]
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Set the execution path from the query root to the failing field.
    #[must_use]
    pub fn with_execution_path(mut self, execution_path: Vec<PathSegment>) -> Self {
        self.execution_path = Some(execution_path);
        self
    }

    /// Set the query-document location of the failing field.
    #[must_use]
    pub fn with_source_location(mut self, source_location: SourceLocation) -> Self {
        self.source_location = Some(source_location);
        self
    }

    /// Attach the parent object being resolved.
    #[must_use]
    pub fn with_source(mut self, source: OpaqueRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach the request-scoped context carrier.
    #[must_use]
    pub fn with_context(mut self, context: OpaqueRef) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach the field-scoped local context carrier.
    #[must_use]
    pub fn with_local_context(mut self, local_context: OpaqueRef) -> Self {
        self.local_context = Some(local_context);
        self
    }

    /// Downcast the parent object to the engine-supplied concrete type.
    #[must_use]
    pub fn source_as<T: Any>(&self) -> Option<&T> {
        self.source.as_deref().and_then(|v| v.downcast_ref())
    }

    /// Downcast the request-scoped context to the engine-supplied concrete
    /// type.
    #[must_use]
    pub fn context_as<T: Any>(&self) -> Option<&T> {
        self.context.as_deref().and_then(|v| v.downcast_ref())
    }

    /// Downcast the field-scoped local context to the engine-supplied
    /// concrete type.
    #[must_use]
    pub fn local_context_as<T: Any>(&self) -> Option<&T> {
        self.local_context.as_deref().and_then(|v| v.downcast_ref())
    }

    /// Flatten the record into the string map shape relied on by legacy
    /// logging pipelines.
    ///
    /// Only the original six keys ever appear: `fieldName`, `parentType`,
    /// `operationName`, `isFrameworkError`, `resolvers` (joined with
    /// `" > "`), and `errorType`. Newer fields are deliberately excluded so
    /// the projection stays stable. Absent fields are omitted, not rendered
    /// empty.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(v) = &self.field_name {
            map.insert("fieldName".to_string(), v.clone());
        }
        if let Some(v) = &self.parent_type {
            map.insert("parentType".to_string(), v.clone());
        }
        if let Some(v) = &self.operation_name {
            map.insert("operationName".to_string(), v.clone());
        }
        if let Some(v) = self.is_framework_error {
            map.insert("isFrameworkError".to_string(), v.to_string());
        }
        if let Some(v) = &self.resolvers {
            map.insert("resolvers".to_string(), v.join(" > "));
        }
        if let Some(v) = &self.error_type {
            map.insert("errorType".to_string(), v.clone());
        }
        map
    }
}

/// Renders the same six fields as [`ErrorContext::to_map`], in the fixed
/// order `fieldName, parentType, operationName, isFrameworkError, resolvers,
/// errorType`, comma-joined inside `{...}`. Absent fields are skipped.
impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = &self.field_name {
            parts.push(v.clone());
        }
        if let Some(v) = &self.parent_type {
            parts.push(v.clone());
        }
        if let Some(v) = &self.operation_name {
            parts.push(v.clone());
        }
        if let Some(v) = self.is_framework_error {
            parts.push(v.to_string());
        }
        if let Some(v) = &self.resolvers {
            parts.push(format!("[{}]", v.join(", ")));
        }
        if let Some(v) = &self.error_type {
            parts.push(v.clone());
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorContext")
            .field("field_name", &self.field_name)
            .field("parent_type", &self.parent_type)
            .field("operation_name", &self.operation_name)
            .field("component_name", &self.component_name)
            .field("is_framework_error", &self.is_framework_error)
            .field("resolvers", &self.resolvers)
            .field("error_type", &self.error_type)
            .field("execution_path", &self.execution_path)
            .field("source_location", &self.source_location)
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
// Tests
// ---------------------------------------------------------------------------
