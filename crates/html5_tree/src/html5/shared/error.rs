//! Parse errors reported during tree construction.
//!
//! Every error is advisory: the tree builder always applies the recovery the
//! HTML parsing algorithm prescribes and keeps going.

use std::fmt;

macro_rules! parse_error_codes {
    ($($variant:ident => $code:literal,)*) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ParseErrorCode {
            $($variant,)*
        }

        impl ParseErrorCode {
            /// Stable kebab-case code, e.g. `"unexpected-end-tag"`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ParseErrorCode::$variant => $code,)*
                }
            }
        }
    };
}

parse_error_codes! {
    // Doctype anomalies.
    ExpectedDoctypeButGotChars => "expected-doctype-but-got-chars",
    ExpectedDoctypeButGotStartTag => "expected-doctype-but-got-start-tag",
    ExpectedDoctypeButGotEndTag => "expected-doctype-but-got-end-tag",
    ExpectedDoctypeButGotEof => "expected-doctype-but-got-eof",
    UnknownDoctype => "unknown-doctype",
    QuirkyDoctype => "quirky-doctype",
    AlmostStandardsDoctype => "almost-standards-doctype",
    ObsoleteDoctype => "obsolete-doctype",
    UnexpectedDoctype => "unexpected-doctype",

    // Structural mismatches.
    NonHtmlRoot => "non-html-root",
    EndTagAfterImpliedRoot => "end-tag-after-implied-root",
    TwoHeadsAreNotBetterThanOne => "two-heads-are-not-better-than-one",
    UnexpectedStartTagOutOfMyHead => "unexpected-start-tag-out-of-my-head",
    UnexpectedStartTag => "unexpected-start-tag",
    UnexpectedChar => "unexpected-char",
    UnexpectedStartTagIgnored => "unexpected-start-tag-ignored",
    UnexpectedStartTagImpliesEndTag => "unexpected-start-tag-implies-end-tag",
    UnexpectedStartTagTreatedAs => "unexpected-start-tag-treated-as",
    UnexpectedEndTag => "unexpected-end-tag",
    UnexpectedEndTagTreatedAs => "unexpected-end-tag-treated-as",
    UnexpectedImpliedEndTag => "unexpected-implied-end-tag",
    EndTagTooEarly => "end-tag-too-early",
    ExpectedOneEndTagButGotAnother => "expected-one-end-tag-but-got-another",
    ExpectedClosingTagButGotEof => "expected-closing-tag-but-got-eof",
    ExpectedNamedClosingTagButGotEof => "expected-named-closing-tag-but-got-eof",
    DeprecatedTag => "deprecated-tag",
    NonVoidElementWithTrailingSolidus => "non-void-element-with-trailing-solidus",

    // Tables.
    UnexpectedCharImpliesTableVoodoo => "unexpected-char-implies-table-voodoo",
    UnexpectedStartTagImpliesTableVoodoo => "unexpected-start-tag-implies-table-voodoo",
    UnexpectedEndTagImpliesTableVoodoo => "unexpected-end-tag-implies-table-voodoo",
    UnexpectedHiddenInputInTable => "unexpected-hidden-input-in-table",
    UnexpectedFormInTable => "unexpected-form-in-table",
    UnexpectedCellInTableBody => "unexpected-cell-in-table-body",
    UnexpectedCellEndTag => "unexpected-cell-end-tag",
    UnexpectedEndTableInCaption => "unexpected-end-table-in-caption",
    EofInTable => "eof-in-table",

    // Select.
    UnexpectedSelectInSelect => "unexpected-select-in-select",
    UnexpectedInputInSelect => "unexpected-input-in-select",
    UnexpectedStartTagInSelect => "unexpected-start-tag-in-select",
    UnexpectedEndTagInSelect => "unexpected-end-tag-in-select",
    UnexpectedTableElementStartTagInSelectInTable => "unexpected-table-element-start-tag-in-select-in-table",
    UnexpectedTableElementEndTagInSelectInTable => "unexpected-table-element-end-tag-in-select-in-table",

    // After body / frameset.
    UnexpectedCharAfterBody => "unexpected-char-after-body",
    UnexpectedStartTagAfterBody => "unexpected-start-tag-after-body",
    UnexpectedEndTagAfterBody => "unexpected-end-tag-after-body",
    UnexpectedCharInFrameset => "unexpected-char-in-frameset",
    UnexpectedStartTagInFrameset => "unexpected-start-tag-in-frameset",
    UnexpectedFramesetInFramesetInnerhtml => "unexpected-frameset-in-frameset-innerhtml",
    UnexpectedEndTagInFrameset => "unexpected-end-tag-in-frameset",
    UnexpectedCharAfterFrameset => "unexpected-char-after-frameset",
    UnexpectedStartTagAfterFrameset => "unexpected-start-tag-after-frameset",
    UnexpectedEndTagAfterFrameset => "unexpected-end-tag-after-frameset",
    EofInFrameset => "eof-in-frameset",
    ExpectedEofButGotChar => "expected-eof-but-got-char",
    ExpectedEofButGotStartTag => "expected-eof-but-got-start-tag",
    ExpectedEofButGotEndTag => "expected-eof-but-got-end-tag",
    EndHtmlInInnerhtml => "end-html-in-innerhtml",

    // Foreign content.
    UnexpectedHtmlElementInForeignContent => "unexpected-html-element-in-foreign-content",

    // Codepoint validity.
    InvalidCodepoint => "invalid-codepoint",

    // Adoption agency algorithm.
    AdoptionAgency1_1 => "adoption-agency-1.1",
    AdoptionAgency1_2 => "adoption-agency-1.2",
    AdoptionAgency1_3 => "adoption-agency-1.3",
    AdoptionAgency4_4 => "adoption-agency-4.4",
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tree-construction parse error.
///
/// `name` is the tag the error is about; `detail` carries the second tag name
/// for the two-name codes ("implies end tag", "treated as", "expected one end
/// tag but got another").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub name: Option<String>,
    pub detail: Option<String>,
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        match (&self.name, &self.detail) {
            (Some(name), Some(detail)) => write!(f, " ({name}, {detail})")?,
            (Some(name), None) => write!(f, " ({name})")?,
            (None, Some(detail)) => write!(f, " ({detail})")?,
            (None, None) => {}
        }
        write!(f, " at {}", self.position)
    }
}

/// Whether the tree builder keeps the errors it reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Collect errors so hosts can surface them (e.g. as lint warnings).
    #[default]
    Track,
    /// Only log and forward errors to the sink.
    Ignore,
}

#[cfg(test)]
mod tests {
    use super::{ParseError, ParseErrorCode};

    #[test]
    fn display_includes_code_names_and_position() {
        let error = ParseError {
            code: ParseErrorCode::UnexpectedStartTagImpliesEndTag,
            name: Some("a".to_string()),
            detail: Some("a".to_string()),
            position: 12,
        };
        assert_eq!(
            error.to_string(),
            "unexpected-start-tag-implies-end-tag (a, a) at 12"
        );
        assert_eq!(ParseErrorCode::AdoptionAgency4_4.as_str(), "adoption-agency-4.4");
    }
}
