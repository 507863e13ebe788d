//! Shared types for the HTML5 tree-construction path.
//!
//! This module is `pub(crate)`; downstream consumers must import these types via
//! `html5_tree::html5::{Token, ParseError, ...}` to preserve API flexibility.

mod counters;
mod error;
mod namespace;
mod token;

pub use counters::Counters;
pub use error::{ErrorPolicy, ParseError, ParseErrorCode};
pub use namespace::Namespace;
pub use token::{Attribute, Token, TokenizerState};

/// HTML "ASCII whitespace": tab, line feed, form feed, carriage return, space.
pub(crate) fn is_html_whitespace(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Splits `text` into its leading whitespace run and the remainder.
pub(crate) fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let end = text
        .char_indices()
        .find(|&(_, ch)| !is_html_whitespace(ch))
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text.split_at(end)
}

pub(crate) fn is_all_whitespace(text: &str) -> bool {
    text.chars().all(is_html_whitespace)
}

#[cfg(test)]
mod tests {
    use super::{is_all_whitespace, split_leading_whitespace};

    #[test]
    fn split_leading_whitespace_keeps_both_halves() {
        assert_eq!(split_leading_whitespace(" \n\tab c"), (" \n\t", "ab c"));
        assert_eq!(split_leading_whitespace("abc"), ("", "abc"));
        assert_eq!(split_leading_whitespace("  "), ("  ", ""));
        assert_eq!(split_leading_whitespace(""), ("", ""));
    }

    #[test]
    fn non_breaking_space_is_not_html_whitespace() {
        assert!(is_all_whitespace("\r\n\x0C "));
        assert!(!is_all_whitespace("\u{A0}"));
    }
}
