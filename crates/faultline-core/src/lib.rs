//! faultline-core
//!
//! The stable error contract for Faultline.
//!
//! If you only take one dependency, take this one.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;

pub use context::{ErrorContext, OpaqueRef, PathSegment, SourceLocation};
pub use error::{FieldError, FieldErrorBuilder};

/// A failure raised by a field resolver, borrowed across the error-handling
/// handoff.
///
/// The engine hands the failure to translators and reporters by reference and
/// keeps ownership; when every translator defers, the engine falls back to
/// its own default error shape for this same failure, untouched. Consumers
/// discriminate via `downcast_ref` or by inspecting the rendered message.
pub type ResolverFailure = dyn std::error::Error + Send + Sync;
