//! Lenient percent-decoding of path segments.
//!
//! Unlike a strict decoder this never fails:
//! - `%` not followed by two hex digits is copied as-is
//! - escapes whose bytes do not form valid UTF-8 are copied as-is, in their
//!   original spelling
//! - only one level is decoded, so `%2541` becomes `%41`

use std::borrow::Cow;

/// Decode `%XY` escapes, passing anything malformed through unchanged.
#[must_use]
pub fn percent_decode_lenient(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        let run_end = escape_run_end(bytes, i);
        if run_end > i {
            push_decoded_run(&input[i..run_end], &mut out);
            i = run_end;
            continue;
        }
        // Escapes are ASCII, so `i` always sits on a char boundary here.
        let Some(ch) = input[i..].chars().next() else {
            break;
        };
        out.push(ch);
        i += ch.len_utf8();
    }
    Cow::Owned(out)
}

/// The byte encoded by a `%XY` triplet at `at`.
pub fn escaped_byte(bytes: &[u8], at: usize) -> Option<u8> {
    if bytes.get(at) != Some(&b'%') {
        return None;
    }
    let hi = hex_value(*bytes.get(at + 1)?)?;
    let lo = hex_value(*bytes.get(at + 2)?)?;
    Some((hi << 4) | lo)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// End of the run of consecutive valid escapes starting at `start`.
fn escape_run_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while escaped_byte(bytes, end).is_some() {
        end += 3;
    }
    end
}

/// `run` is a sequence of `%XY` triplets; byte `n` of the decoded run maps to
/// `run[3n..3n + 3]`.
fn push_decoded_run(run: &str, out: &mut String) {
    let raw = run.as_bytes();
    let decoded: Vec<u8> = (0..raw.len())
        .step_by(3)
        .filter_map(|at| escaped_byte(raw, at))
        .collect();

    let mut offset = 0;
    for chunk in decoded.utf8_chunks() {
        out.push_str(chunk.valid());
        offset += chunk.valid().len();

        let invalid = chunk.invalid().len();
        if invalid > 0 {
            out.push_str(&run[offset * 3..(offset + invalid) * 3]);
            offset += invalid;
        }
    }
}
