//! Request path segmentation.
//!
//! [`PathSegmenter::segment`] checks that a request URI lives under the service
//! root, strips the root's path, and splits the rest into raw segments:
//!
//! ```text
//! http://host/svc/People('O''Neil')/Friends?$top=1   base http://host/svc/
//!                 └──────────────┘ └─────┘
//!                 People('O''Neil')  Friends
//! ```
//!
//! Segments are percent-decoded leniently and never fail to decode; the only
//! failures are a malformed URI, a request outside the service root, and too
//! many segments.

mod decode;
mod split;

pub use decode::percent_decode_lenient;

use split::PathRules;
use url::Url;

use crate::config::PathSegmenterConfig;
use crate::Error;

/// Root against which relative references are resolved, so that relative
/// request and base URIs compare consistently.
const SYNTHETIC_ROOT: &str = "http://odata.invalid/";

/// Splits request URIs into raw path segments. Stateless and reentrant.
#[derive(Debug, Clone, Default)]
pub struct PathSegmenter {
    config: PathSegmenterConfig,
}

impl PathSegmenter {
    /// # Errors
    /// Returns an error if `config` does not validate.
    pub fn new(config: PathSegmenterConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &PathSegmenterConfig {
        &self.config
    }

    /// Split `full_uri` into the segments that follow `base_uri`'s path.
    ///
    /// Either URI may be relative. Query string and fragment are ignored.
    ///
    /// # Errors
    /// - `Error::MalformedUri` if either URI cannot be parsed
    /// - `Error::BaseUriMismatch` if scheme, host, port or path prefix differ
    /// - `Error::TooManySegments` if the path has more segments than allowed
    pub fn segment(&self, full_uri: &str, base_uri: &str) -> Result<Vec<String>, Error> {
        let (request, request_is_absolute) = resolve(full_uri)?;
        let (base, base_is_absolute) = resolve(base_uri)?;

        let mismatch = || Error::BaseUriMismatch {
            request: full_uri.to_owned(),
            base: base_uri.to_owned(),
        };

        if !same_origin(&request, &base) {
            return Err(mismatch());
        }

        let rules = PathRules {
            drop_raw_control_chars: self.config.drop_raw_control_chars,
            backslash_separates: is_special_scheme(request.scheme()),
        };
        let request_path = raw_path(full_uri, request_is_absolute.then(|| request.scheme()));
        let base_path = raw_path(base_uri, base_is_absolute.then(|| base.scheme()));
        let relative = strip_base_path(request_path, base_path, rules).ok_or_else(mismatch)?;

        let pieces = split::split_raw(relative, rules);
        let raw_segments = split::merge_raw_paths(pieces);
        self.config.validate_segment_count(raw_segments.len())?;

        let segments: Vec<String> = raw_segments
            .iter()
            .map(|raw| percent_decode_lenient(raw).into_owned())
            .collect();

        tracing::trace!(
            uri = full_uri,
            segment_count = segments.len(),
            "Segmented request path"
        );
        Ok(segments)
    }
}

/// Segment `full_uri` against `base_uri` with a custom segment limit.
///
/// # Errors
/// See [`PathSegmenter::segment`].
pub fn segment_path(full_uri: &str, base_uri: &str, max_segments: usize) -> Result<Vec<String>, Error> {
    let segmenter = PathSegmenter {
        config: PathSegmenterConfig::new().with_max_segments(max_segments),
    };
    segmenter.segment(full_uri, base_uri)
}

fn malformed(uri: &str, err: url::ParseError) -> Error {
    Error::MalformedUri {
        uri: uri.to_owned(),
        reason: err.to_string(),
    }
}

/// Parse `text`, resolving relative references against [`SYNTHETIC_ROOT`].
fn resolve(text: &str) -> Result<(Url, bool), Error> {
    match Url::parse(text) {
        Ok(url) => Ok((url, true)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let root = Url::parse(SYNTHETIC_ROOT).map_err(|e| malformed(SYNTHETIC_ROOT, e))?;
            let url = root.join(text).map_err(|e| malformed(text, e))?;
            Ok((url, false))
        }
        Err(e) => Err(malformed(text, e)),
    }
}

fn same_origin(request: &Url, base: &Url) -> bool {
    let hosts_match = match (request.host_str(), base.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    };
    request.scheme().eq_ignore_ascii_case(base.scheme())
        && hosts_match
        && request.port_or_known_default() == base.port_or_known_default()
}

/// Schemes for which `\\` is read as `/`, as `url` does.
fn is_special_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https" | "ws" | "wss" | "ftp" | "file")
}

/// The still-encoded path of `text`, without query or fragment.
///
/// Taken from the original text rather than from [`Url::path`], which would
/// re-encode raw characters and make them indistinguishable from escapes.
fn raw_path<'a>(text: &'a str, scheme: Option<&str>) -> &'a str {
    let special = scheme.is_none_or(is_special_scheme);
    let is_separator = |c: char| c == '/' || (special && c == '\\');

    let text = text.trim_matches(|c: char| c <= ' ');
    let text = text.find(['?', '#']).map_or(text, |end| &text[..end]);
    let hierarchical = match scheme {
        Some(_) => text.split_once(':').map_or(text, |(_, rest)| rest),
        None => text,
    };

    // Special schemes other than `file` take an authority after any number of
    // separators, including none. Others need exactly `//`.
    let authority_and_path = if matches!(scheme, Some(s) if special && s != "file") {
        hierarchical.trim_start_matches(is_separator)
    } else if hierarchical.chars().take(2).filter(|&c| is_separator(c)).count() == 2 {
        &hierarchical[2..]
    } else {
        return hierarchical;
    };
    authority_and_path
        .find(is_separator)
        .map_or("", |start| &authority_and_path[start..])
}

/// One byte of a path after normalization, with its span in the raw text.
#[derive(Clone, Copy, Debug)]
struct PathUnit {
    byte: u8,
    separator: bool,
    start: usize,
    end: usize,
}

impl PathUnit {
    fn matches(&self, other: &Self) -> bool {
        if self.separator || other.separator {
            return self.separator == other.separator;
        }
        self.byte.eq_ignore_ascii_case(&other.byte)
    }
}

/// Normalize `path` for comparison: escapes decode to their byte, raw
/// characters to their UTF-8 bytes, and raw control characters are skipped
/// when configured. Only unescaped separators count as separators.
fn path_units(path: &str, rules: PathRules) -> Vec<PathUnit> {
    let bytes = path.as_bytes();
    let mut units = Vec::with_capacity(path.len());
    let mut i = 0;
    while i < path.len() {
        if let Some(byte) = decode::escaped_byte(bytes, i) {
            units.push(PathUnit {
                byte,
                separator: false,
                start: i,
                end: i + 3,
            });
            i += 3;
            continue;
        }

        let Some(ch) = path[i..].chars().next() else {
            break;
        };
        let end = i + ch.len_utf8();
        if !(rules.drop_raw_control_chars && ch.is_control()) {
            let separator = ch == '/' || (rules.backslash_separates && ch == '\\');
            units.extend(path[i..end].bytes().map(|byte| PathUnit {
                byte,
                separator,
                start: i,
                end,
            }));
        }
        i = end;
    }
    units
}

/// Remove the base path from the request path.
///
/// Both paths are compared after normalization, ignoring ASCII case, so
/// spellings that denote the same path match. The returned rest is raw text.
fn strip_base_path<'a>(request_path: &'a str, base_path: &str, rules: PathRules) -> Option<&'a str> {
    let base = path_units(base_path, rules);
    let base_start = base.iter().position(|u| !u.separator).unwrap_or(base.len());
    let base_end = base.iter().rposition(|u| !u.separator).map_or(base_start, |last| last + 1);
    let base = &base[base_start..base_end];

    let request = path_units(request_path, rules);
    let request_start = request.iter().position(|u| !u.separator).unwrap_or(request.len());
    let request = &request[request_start..];

    if base.is_empty() {
        return Some(request.first().map_or("", |first| &request_path[first.start..]));
    }
    if request.len() < base.len() || !request.iter().zip(base).all(|(r, b)| r.matches(b)) {
        return None;
    }
    match request.get(base.len()) {
        None => Some(""),
        Some(next) if next.separator => Some(&request_path[next.end..]),
        Some(_) => None,
    }
}
