//! Mapping from front-end errors to HTTP status codes (pure data)
//!
//! The HTTP layer turns these into problem responses; this module only decides
//! the status so the mapping stays next to the error definitions.

use http::StatusCode;

use crate::{Error, LiteralParsingError};

impl Error {
    /// HTTP status an error should surface as.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            // Bad request line → 400
            Error::MalformedUri { .. } | Error::TooManySegments { .. } => StatusCode::BAD_REQUEST,

            // Not addressed to this service → 404
            Error::BaseUriMismatch { .. } => StatusCode::NOT_FOUND,

            // Host misconfigured a registry → 500
            Error::EmptyArgument(_) | Error::InvalidLiteralPrefix(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl LiteralParsingError {
    /// A malformed literal is always the client's fault.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
