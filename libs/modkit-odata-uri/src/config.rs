//! Configuration and safety limits for request-URI segmentation
//!
//! Caps the work done per request and toggles compatibility behavior:
//! - Maximum number of path segments
//! - Dropping of raw (unencoded) control characters from the path

use serde::{Deserialize, Serialize};

use crate::Error;

/// Default limit on path segments per request.
pub const DEFAULT_MAX_SEGMENTS: usize = 100;

/// Settings consumed by [`crate::PathSegmenter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSegmenterConfig {
    /// Maximum number of segments a request path may produce (default: 100)
    pub max_segments: usize,
    /// Drop control characters that appear verbatim in the path (default: true).
    /// Percent-encoded control characters are always decoded and kept.
    pub drop_raw_control_chars: bool,
}

impl Default for PathSegmenterConfig {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            drop_raw_control_chars: true,
        }
    }
}

impl PathSegmenterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of path segments
    #[must_use]
    pub fn with_max_segments(mut self, max: usize) -> Self {
        self.max_segments = max;
        self
    }

    /// Keep or drop raw control characters
    #[must_use]
    pub fn with_drop_raw_control_chars(mut self, drop: bool) -> Self {
        self.drop_raw_control_chars = drop;
        self
    }

    /// Reject settings that would make every request fail.
    ///
    /// # Errors
    /// Returns `Error::EmptyArgument("max_segments")` when `max_segments` is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_segments == 0 {
            return Err(Error::EmptyArgument("max_segments"));
        }
        Ok(())
    }

    /// Check a segment count against the limit.
    ///
    /// # Errors
    /// Returns `Error::TooManySegments` if `count` exceeds `max_segments`.
    pub fn validate_segment_count(&self, count: usize) -> Result<(), Error> {
        if count > self.max_segments {
            return Err(Error::TooManySegments {
                count,
                max: self.max_segments,
            });
        }
        Ok(())
    }
}
