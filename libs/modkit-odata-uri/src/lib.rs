#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request-URI front end for `OData` services.
//!
//! Two concerns live here:
//! - [`PathSegmenter`] turns a request URI (relative to a service root) into the
//!   ordered raw path segments consumed by the path binder.
//! - Per-model extensibility registries ([`LiteralParserRegistry`],
//!   [`LiteralPrefixRegistry`]) let hosts plug custom literal parsing into
//!   [`DefaultLiteralParser`], which falls back to [`BuiltinLiteralParser`].
//!
//! # Example
//!
//! ```
//! use modkit_odata_uri::{segment_path, DefaultLiteralParser, EdmModel, EdmPrimitiveKind, TypeRef};
//!
//! let segments = segment_path(
//!     "http://host/svc/People('O''Neil')/Friends",
//!     "http://host/svc/",
//!     100,
//! )?;
//! assert_eq!(segments, ["People('O''Neil')", "Friends"]);
//!
//! let model = EdmModel::new("Demo");
//! let parser = DefaultLiteralParser::get_or_create(&model);
//! let value = parser.parse("42", &TypeRef::primitive(EdmPrimitiveKind::Int32, false));
//! assert!(matches!(value, Ok(Some(modkit_odata_uri::LiteralValue::Int32(42)))));
//! # Ok::<(), modkit_odata_uri::Error>(())
//! ```

pub mod config;
pub mod literal;
pub mod model;
pub mod path;
pub mod status_mapping;
pub mod types;
pub mod value;

pub use config::PathSegmenterConfig;
pub use literal::{
    BuiltinLiteralParser, DefaultLiteralParser, LiteralParser, LiteralParserRegistry,
    LiteralParsingError, LiteralPrefixRegistry, TypeBoundParser, release_model,
};
pub use model::{EdmModel, ModelId, ModelStores};
pub use path::{percent_decode_lenient, segment_path, PathSegmenter};
pub use types::{EdmPrimitiveKind, TypeKey, TypeRef};
pub use value::LiteralValue;

/// Unified error type for the request-URI front end.
///
/// Literal parsing failures are not part of this enum: they are an outcome of a
/// [`LiteralParser`] and are reported as [`LiteralParsingError`].
///
/// ## HTTP Mapping
///
/// See [`Error::status`]:
/// - `MalformedUri`, `TooManySegments` → 400
/// - `BaseUriMismatch` → 404
/// - `EmptyArgument`, `InvalidLiteralPrefix` → 500 (host configuration bugs)
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Argument validation
    #[error("argument `{0}` must not be empty")]
    EmptyArgument(&'static str),

    #[error(
        "invalid literal prefix `{0}`: must start with an ASCII letter and contain only ASCII letters, digits, '.' or '_'"
    )]
    InvalidLiteralPrefix(String),

    // URI syntax
    #[error("malformed URI `{uri}`: {reason}")]
    MalformedUri { uri: String, reason: String },

    #[error("request URI `{request}` is not under the service root `{base}`")]
    BaseUriMismatch { request: String, base: String },

    #[error("too many path segments: {count} exceeds the limit of {max}")]
    TooManySegments { count: usize, max: usize },
}

impl Error {
    /// Whether the error belongs to the URI syntax family raised by the segmenter.
    #[must_use]
    pub fn is_uri_syntax(&self) -> bool {
        matches!(
            self,
            Error::MalformedUri { .. } | Error::BaseUriMismatch { .. } | Error::TooManySegments { .. }
        )
    }
}
