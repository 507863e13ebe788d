//! Per-insertion-mode token handlers.
//!
//! Each mode is one `match` over the token with a shared fallback arm
//! ("anything else"); handlers return a [`ProcessResult`] instead of calling
//! each other so re-dispatch stays iterative.
//!
//! [`ProcessResult`]: super::ProcessResult

mod body;
mod frameset;
mod head;
mod initial;
mod select;
mod table;
mod text;

use crate::html5::shared::{Token, split_leading_whitespace};

/// Splits a text token into its leading whitespace and the remainder, the
/// latter rewrapped as a token when non-empty.
pub(crate) fn split_text(text: &str) -> (&str, Option<Token>) {
    let (whitespace, rest) = split_leading_whitespace(text);
    let rest = (!rest.is_empty()).then(|| Token::text(rest));
    (whitespace, rest)
}

/// Removes NUL characters, reporting whether any were present.
pub(crate) fn strip_nul(text: String) -> (String, bool) {
    if memchr::memchr(0, text.as_bytes()).is_some() {
        (text.replace('\0', ""), true)
    } else {
        (text, false)
    }
}
