//! HTML5 insertion modes used by the tree builder state machine.
//!
//! Foreign content is not a mode: it is a per-token dispatch override decided
//! from the current node (see `foreign.rs`).

/// HTML5 tree-construction insertion mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InsertionMode {
    #[default]
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

impl InsertionMode {
    /// Mode name as used by the HTML standard's prose (`"in table body"`).
    pub fn name(self) -> &'static str {
        match self {
            InsertionMode::Initial => "initial",
            InsertionMode::BeforeHtml => "before html",
            InsertionMode::BeforeHead => "before head",
            InsertionMode::InHead => "in head",
            InsertionMode::InHeadNoscript => "in head noscript",
            InsertionMode::AfterHead => "after head",
            InsertionMode::InBody => "in body",
            InsertionMode::Text => "text",
            InsertionMode::InTable => "in table",
            InsertionMode::InTableText => "in table text",
            InsertionMode::InCaption => "in caption",
            InsertionMode::InColumnGroup => "in column group",
            InsertionMode::InTableBody => "in table body",
            InsertionMode::InRow => "in row",
            InsertionMode::InCell => "in cell",
            InsertionMode::InSelect => "in select",
            InsertionMode::InSelectInTable => "in select in table",
            InsertionMode::AfterBody => "after body",
            InsertionMode::InFrameset => "in frameset",
            InsertionMode::AfterFrameset => "after frameset",
            InsertionMode::AfterAfterBody => "after after body",
            InsertionMode::AfterAfterFrameset => "after after frameset",
        }
    }
}

/// Document compatibility mode derived from the doctype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    Quirks,
    LimitedQuirks,
}

impl QuirksMode {
    /// Canonical string surfaced to hosts (`"no quirks"`, `"quirks"`,
    /// `"limited quirks"`).
    pub fn as_str(self) -> &'static str {
        match self {
            QuirksMode::NoQuirks => "no quirks",
            QuirksMode::Quirks => "quirks",
            QuirksMode::LimitedQuirks => "limited quirks",
        }
    }
}

impl std::fmt::Display for QuirksMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
