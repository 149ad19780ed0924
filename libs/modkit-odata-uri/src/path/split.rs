//! Splitting of a service-relative raw path into raw segments.
//!
//! The splitter is a small state machine over the still-encoded path:
//!
//! - `Normal`: `/` separates segments.
//! - `InQuote`: entered on `'` or `%27` where a literal can start (at the start
//!   of a segment or inside parentheses) and a matching quote follows later in
//!   the path; `/` is literal until the next quote. A doubled quote leaves and
//!   re-enters the state, so `''` stays inside the literal.
//! - `InRawPath`: entered after a segment ending in a single unescaped `:`
//!   (item-by-path escape), when a later segment also ends that way. Every
//!   segment up to and including that terminator is joined verbatim.

const ENCODED_QUOTE: &str = "%27";

/// How raw path text is read. Shared by the splitter and the base-path check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathRules {
    pub drop_raw_control_chars: bool,
    /// `\` separates segments, as in `http` and the other special schemes.
    pub backslash_separates: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Normal,
    InQuote,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Quote,
    Open,
    Close,
}

/// Split on `/` outside quoted literals. Empty pieces are kept so raw paths can
/// be rebuilt verbatim.
#[must_use]
pub fn split_raw(path: &str, rules: PathRules) -> Vec<String> {
    let last_quote = last_quote_start(path);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut paren_depth = 0_usize;
    let mut closed_at = None;

    let mut i = 0;
    while i < path.len() {
        let tail = &path[i..];

        if let Some((token, len)) = structural_token(tail) {
            match (state, token) {
                (State::InQuote, Token::Quote) => {
                    state = State::Normal;
                    closed_at = Some(i + len);
                }
                (State::Normal, Token::Quote) => {
                    // An apostrophe inside a word, or without a partner, is just a character.
                    let literal_can_start =
                        paren_depth > 0 || current.is_empty() || closed_at == Some(i);
                    if literal_can_start && last_quote.is_some_and(|last| i < last) {
                        state = State::InQuote;
                    }
                }
                (State::Normal, Token::Open) => paren_depth += 1,
                (State::Normal, Token::Close) => paren_depth = paren_depth.saturating_sub(1),
                (State::InQuote, _) => {}
            }
            current.push_str(&tail[..len]);
            i += len;
            continue;
        }

        let Some(ch) = tail.chars().next() else {
            break;
        };
        let is_separator = ch == '/' || (rules.backslash_separates && ch == '\\');
        match ch {
            _ if is_separator && state == State::Normal => {
                pieces.push(std::mem::take(&mut current));
                paren_depth = 0;
            }
            c if rules.drop_raw_control_chars && c.is_control() => {}
            c => current.push(c),
        }
        i += ch.len_utf8();
    }
    pieces.push(current);
    pieces
}

/// Apply the item-by-path escape and drop empty pieces.
#[must_use]
pub fn merge_raw_paths(mut pieces: Vec<String>) -> Vec<String> {
    let mut segments = Vec::with_capacity(pieces.len());
    let mut i = 0;
    while i < pieces.len() {
        if pieces[i].is_empty() {
            i += 1;
            continue;
        }

        let opens_raw_path = is_raw_path_delimiter(&pieces[i]);
        segments.push(std::mem::take(&mut pieces[i]));
        i += 1;

        if opens_raw_path {
            let terminator = pieces[i..]
                .iter()
                .position(|p| is_raw_path_delimiter(p))
                .map(|offset| i + offset);
            if let Some(end) = terminator {
                segments.push(pieces[i..=end].join("/"));
                i = end + 1;
            }
        }
    }
    segments
}

/// `name:` opens or closes a raw sub-path; a bare `:`, `name::` or an encoded
/// `%3A` does not.
fn is_raw_path_delimiter(raw: &str) -> bool {
    raw.len() > 1 && raw.ends_with(':') && !raw.ends_with("::")
}

/// Quotes and parentheses, raw or percent-encoded, with their raw length.
fn structural_token(tail: &str) -> Option<(Token, usize)> {
    let token = match tail.as_bytes().first()? {
        b'\'' => return Some((Token::Quote, 1)),
        b'(' => return Some((Token::Open, 1)),
        b')' => return Some((Token::Close, 1)),
        b'%' => match tail.get(..3)? {
            ENCODED_QUOTE => Token::Quote,
            "%28" => Token::Open,
            "%29" => Token::Close,
            _ => return None,
        },
        _ => return None,
    };
    Some((token, 3))
}

fn last_quote_start(path: &str) -> Option<usize> {
    match (path.rfind('\''), path.rfind(ENCODED_QUOTE)) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
