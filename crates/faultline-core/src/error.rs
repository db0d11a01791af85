// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-facing structured errors and their fluent builder.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{ErrorContext, PathSegment, SourceLocation};

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// Immutable, client-facing structured error produced for a failed field.
///
/// Absent optional fields are skipped entirely when serializing, so "no
/// extensions" and "empty extensions" stay distinguishable on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Message shown to the caller. Empty is permitted but semantically
    /// void.
    pub message: String,
    /// Path from the query root to the failing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    /// Query-document locations where the failing field was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<SourceLocation>>,
    /// Classification of the error. First-class, never nested in
    /// `extensions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Whether the error should terminate the whole operation rather than
    /// null out a field. `None` means unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal: Option<bool>,
    /// Caller-defined metadata. `None` when no extensions were ever added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, Value>>,
}

impl FieldError {
    /// Start building an error from scratch.
    #[must_use]
    pub fn builder() -> FieldErrorBuilder {
        FieldErrorBuilder::new()
    }

    /// Start building an error pre-seeded from a context record.
    ///
    /// See [`FieldErrorBuilder::from_context`].
    #[must_use]
    pub fn from_context(context: &ErrorContext) -> FieldErrorBuilder {
        FieldErrorBuilder::from_context(context)
    }
}

// ---------------------------------------------------------------------------
// FieldErrorBuilder
// ---------------------------------------------------------------------------

/// Fluent, order-independent staging for one [`FieldError`].
///
/// Setters consume and return the builder, so a builder stays confined to
/// the single resolution that created it. `build()` is total: with nothing
/// set it produces an error with an empty message and every optional field
/// absent.
///
/// ```
/// use faultline_core::{FieldError, PathSegment};
///
/// let error = FieldError::builder()
///     .message("User not found")
///     .path(vec![PathSegment::field("user"), PathSegment::field("name")])
///     .error_type("NOT_FOUND")
///     .fatal(false)
///     .extension("customField", "customValue")
///     .build();
/// assert_eq!(error.error_type.as_deref(), Some("NOT_FOUND"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldErrorBuilder {
    message: String,
    path: Option<Vec<PathSegment>>,
    locations: Option<Vec<SourceLocation>>,
    error_type: Option<String>,
    fatal: Option<bool>,
    extensions: BTreeMap<String, Value>,
}

impl FieldErrorBuilder {
    /// Builder with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-seeded from a context record: `path` from the record's
    /// execution path and `locations` from its source location (as a
    /// singleton), when present. Later explicit calls to
    /// [`path`](Self::path) / [`location`](Self::location) /
    /// [`locations`](Self::locations) override the seeds.
    #[must_use]
    pub fn from_context(context: &ErrorContext) -> Self {
        let mut builder = Self::new();
        if let Some(path) = &context.execution_path {
            builder.path = Some(path.clone());
        }
        if let Some(location) = &context.source_location {
            builder.locations = Some(vec![location.clone()]);
        }
        builder
    }

    /// Set the client-visible message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the error path, replacing any previous or seeded value.
    #[must_use]
    pub fn path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    /// Replace the location list with a single location.
    #[must_use]
    pub fn location(mut self, location: SourceLocation) -> Self {
        self.locations = Some(vec![location]);
        self
    }

    /// Replace the location list wholesale.
    #[must_use]
    pub fn locations(mut self, locations: Vec<SourceLocation>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Set the first-class error classification.
    #[must_use]
    pub fn error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Set the first-class fatal marker.
    #[must_use]
    pub fn fatal(mut self, fatal: bool) -> Self {
        self.fatal = Some(fatal);
        self
    }

    /// Upsert one extension entry.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped. An extension keyed
    /// `"errorType"` or `"fatal"` lands in the extensions map and never
    /// touches the first-class fields.
    #[must_use]
    pub fn extension(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.extensions.insert(key.into(), v);
        }
        self
    }

    /// Merge many extension entries.
    #[must_use]
    pub fn extensions(mut self, entries: BTreeMap<String, Value>) -> Self {
        self.extensions.extend(entries);
        self
    }

    /// Produce the immutable error value.
    ///
    /// `extensions` is absent (not an empty map) when no extensions were
    /// ever added.
    #[must_use]
    pub fn build(self) -> FieldError {
        FieldError {
            message: self.message,
            path: self.path,
            locations: self.locations,
            error_type: self.error_type,
            fatal: self.fatal,
            extensions: if self.extensions.is_empty() {
                None
            } else {
                Some(self.extensions)
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_with_all_fields() {
        let error = FieldError::builder()
            .message("User not found")
            .path(vec![
                PathSegment::field("user"),
                PathSegment::field("profile"),
                PathSegment::field("name"),
            ])
            .location(SourceLocation::new(5, 10).with_source_name("query.graphql"))
            .error_type("NOT_FOUND")
            .fatal(false)
            .extension("customField", "customValue")
            .build();

        assert_eq!(error.message, "User not found");
        assert_eq!(error.path.as_ref().map(Vec::len), Some(3));
        let locations = error.locations.as_ref().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].line, 5);
        assert_eq!(error.error_type.as_deref(), Some("NOT_FOUND"));
        assert_eq!(error.fatal, Some(false));
        assert_eq!(
            error.extensions.as_ref().unwrap()["customField"],
            json!("customValue")
        );
    }

    #[test]
    fn build_with_only_message() {
        let error = FieldError::builder().message("Simple error").build();

        assert_eq!(error.message, "Simple error");
        assert!(error.path.is_none());
        assert!(error.locations.is_none());
        assert!(error.error_type.is_none());
        assert!(error.fatal.is_none());
        assert!(error.extensions.is_none());
    }

    #[test]
    fn build_with_nothing_set_is_well_defined() {
        let error = FieldError::builder().build();
        assert_eq!(error.message, "");
        assert!(error.path.is_none());
        assert!(error.locations.is_none());
        assert!(error.error_type.is_none());
        assert!(error.fatal.is_none());
        assert!(error.extensions.is_none());
    }

    #[test]
    fn from_context_seeds_path_and_location() {
        let context = ErrorContext::EMPTY
            .with_execution_path(vec![PathSegment::field("a"), PathSegment::field("b")])
            .with_source_location(SourceLocation::new(5, 1));

        let error = FieldError::from_context(&context).build();

        assert_eq!(
            error.path,
            Some(vec![PathSegment::field("a"), PathSegment::field("b")])
        );
        assert_eq!(error.locations, Some(vec![SourceLocation::new(5, 1)]));
        assert!(error.locations.as_ref().unwrap()[0].source_name.is_none());
    }

    #[test]
    fn from_context_with_empty_record_seeds_nothing() {
        let error = FieldError::from_context(&ErrorContext::EMPTY).build();
        assert!(error.path.is_none());
        assert!(error.locations.is_none());
    }

    #[test]
    fn explicit_calls_override_seeded_values() {
        let context = ErrorContext::EMPTY
            .with_execution_path(vec![PathSegment::field("seeded")])
            .with_source_location(SourceLocation::new(1, 1));

        let error = FieldError::from_context(&context)
            .path(vec![PathSegment::field("explicit")])
            .location(SourceLocation::new(9, 9))
            .build();

        assert_eq!(error.path, Some(vec![PathSegment::field("explicit")]));
        assert_eq!(error.locations, Some(vec![SourceLocation::new(9, 9)]));
    }

    #[test]
    fn location_replaces_location_list_with_singleton() {
        let error = FieldError::builder()
            .locations(vec![SourceLocation::new(1, 1), SourceLocation::new(2, 2)])
            .location(SourceLocation::new(3, 3))
            .build();
        assert_eq!(error.locations, Some(vec![SourceLocation::new(3, 3)]));
    }

    #[test]
    fn multiple_locations_kept_in_order() {
        let error = FieldError::builder()
            .message("Error with multiple locations")
            .locations(vec![SourceLocation::new(1, 1), SourceLocation::new(5, 10)])
            .build();
        let locations = error.locations.unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].line, 1);
        assert_eq!(locations[1].line, 5);
    }

    #[test]
    fn extensions_merge_then_upsert() {
        let mut entries = BTreeMap::new();
        entries.insert("errorType".to_string(), json!("VALIDATION"));
        entries.insert("code".to_string(), json!(400));

        let error = FieldError::builder()
            .message("Validation error")
            .extensions(entries)
            .extension("extra", "value")
            .extension("code", 401)
            .build();

        let extensions = error.extensions.unwrap();
        assert_eq!(extensions["errorType"], json!("VALIDATION"));
        assert_eq!(extensions["code"], json!(401));
        assert_eq!(extensions["extra"], json!("value"));
    }

    #[test]
    fn first_class_fields_never_collide_with_extensions() {
        let error = FieldError::builder()
            .message("Error")
            .error_type("X")
            .fatal(true)
            .extension("errorType", "Y")
            .build();

        assert_eq!(error.error_type.as_deref(), Some("X"));
        assert_eq!(error.fatal, Some(true));
        assert_eq!(error.extensions.as_ref().unwrap()["errorType"], json!("Y"));
        assert!(!error.extensions.as_ref().unwrap().contains_key("fatal"));
    }

    #[test]
    fn first_class_setters_never_leak_into_extensions() {
        let error = FieldError::builder()
            .message("Error")
            .error_type("TIMEOUT")
            .fatal(true)
            .extension("customField", "value")
            .build();

        let extensions = error.extensions.unwrap();
        assert!(!extensions.contains_key("errorType"));
        assert!(!extensions.contains_key("fatal"));
        assert_eq!(extensions["customField"], json!("value"));
    }

    #[test]
    fn merging_empty_extensions_still_builds_absent() {
        let error = FieldError::builder()
            .message("no extensions")
            .extensions(BTreeMap::new())
            .build();
        assert!(error.extensions.is_none());
    }

    #[test]
    fn last_setter_call_wins() {
        let error = FieldError::builder()
            .message("first")
            .message("second")
            .error_type("A")
            .error_type("B")
            .fatal(true)
            .fatal(false)
            .build();
        assert_eq!(error.message, "second");
        assert_eq!(error.error_type.as_deref(), Some("B"));
        assert_eq!(error.fatal, Some(false));
    }
}
