//! The table sub-machine: `in table`, `in table text`, `in caption`,
//! `in column group`, `in table body`, `in row` and `in cell`.

use super::{split_text, strip_nul};
use crate::html5::shared::{ParseErrorCode, Token, is_all_whitespace};
use crate::html5::tree_builder::{Html5TreeBuilder, InsertionMode, ProcessResult, TreeSink};

fn is_table_section(name: &str) -> bool {
    matches!(name, "tbody" | "tfoot" | "thead")
}

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn in_table_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { .. }
                if self.current_is_one_of(&["table", "tbody", "tfoot", "thead", "tr"]) =>
            {
                self.pending_table_characters.clear();
                self.original_mode = self.mode;
                self.set_insertion_mode(InsertionMode::InTableText);
                ProcessResult::Reprocess(token)
            }
            Token::Comment { text } => {
                self.insert_comment(&text);
                ProcessResult::Done
            }
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => match name.as_str() {
                "caption" => {
                    self.open_elements.pop_until_table_scope_marker();
                    self.active_formatting.push_marker();
                    self.insert_html_element(&name, attrs);
                    self.set_insertion_mode(InsertionMode::InCaption);
                    ProcessResult::Done
                }
                "colgroup" => {
                    self.open_elements.pop_until_table_scope_marker();
                    self.insert_html_element(&name, attrs);
                    self.set_insertion_mode(InsertionMode::InColumnGroup);
                    ProcessResult::Done
                }
                "col" => {
                    self.open_elements.pop_until_table_scope_marker();
                    self.insert_html_element("colgroup", Vec::new());
                    self.set_insertion_mode(InsertionMode::InColumnGroup);
                    ProcessResult::Reprocess(Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    })
                }
                "tbody" | "tfoot" | "thead" => {
                    self.open_elements.pop_until_table_scope_marker();
                    self.insert_html_element(&name, attrs);
                    self.set_insertion_mode(InsertionMode::InTableBody);
                    ProcessResult::Done
                }
                "td" | "th" | "tr" => {
                    self.open_elements.pop_until_table_scope_marker();
                    self.insert_html_element("tbody", Vec::new());
                    self.set_insertion_mode(InsertionMode::InTableBody);
                    ProcessResult::Reprocess(Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    })
                }
                "table" => {
                    self.error_detail(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        "table",
                        "table",
                    );
                    if !self.open_elements.in_table_scope("table") {
                        return ProcessResult::Done;
                    }
                    self.open_elements.pop_until_popped("table");
                    self.reset_insertion_mode();
                    ProcessResult::Reprocess(Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    })
                }
                "style" | "script" => ProcessResult::ReprocessIn(
                    InsertionMode::InHead,
                    Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    },
                ),
                "input"
                    if attrs.iter().any(|attr| {
                        attr.name == "type" && attr.value.eq_ignore_ascii_case("hidden")
                    }) =>
                {
                    self.error(ParseErrorCode::UnexpectedHiddenInputInTable);
                    self.insert_self_closing_element(&name, attrs);
                    ProcessResult::Done
                }
                "form" => {
                    self.error(ParseErrorCode::UnexpectedFormInTable);
                    if self.form.is_none() {
                        let form = self.insert_html_element(&name, attrs);
                        self.open_elements.pop();
                        self.form = Some(form);
                    }
                    ProcessResult::Done
                }
                _ => {
                    self.error_named(ParseErrorCode::UnexpectedStartTagImpliesTableVoodoo, &name);
                    self.process_with_foster_parenting(Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    })
                }
            },
            Token::EndTag { name } => match name.as_str() {
                "table" => {
                    if !self.open_elements.in_table_scope("table") {
                        self.error_named(ParseErrorCode::UnexpectedEndTag, "table");
                        return ProcessResult::Done;
                    }
                    self.open_elements.pop_until_popped("table");
                    self.reset_insertion_mode();
                    ProcessResult::Done
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                    ProcessResult::Done
                }
                _ => {
                    self.error_named(ParseErrorCode::UnexpectedEndTagImpliesTableVoodoo, &name);
                    self.process_with_foster_parenting(Token::EndTag { name })
                }
            },
            Token::Eof => {
                if !self.current_is("html") {
                    self.error(ParseErrorCode::EofInTable);
                }
                ProcessResult::Done
            }
            token @ Token::Text { .. } => {
                self.error(ParseErrorCode::UnexpectedCharImpliesTableVoodoo);
                self.process_with_foster_parenting(token)
            }
        }
    }

    /// Processes `token` with the `in body` rules while misplaced content is
    /// redirected in front of the table.
    fn process_with_foster_parenting(&mut self, token: Token) -> ProcessResult {
        self.redirect_attach_to_foster_parent = true;
        self.process_nested(InsertionMode::InBody, token);
        self.redirect_attach_to_foster_parent = false;
        ProcessResult::Done
    }

    pub(crate) fn in_table_text_mode(&mut self, token: Token) -> ProcessResult {
        if let Token::Text { text } = token {
            let (text, had_nul) = strip_nul(text);
            if had_nul {
                self.error(ParseErrorCode::InvalidCodepoint);
            }
            if !text.is_empty() {
                self.pending_table_characters.push(text);
            }
            return ProcessResult::Done;
        }

        let pending = std::mem::take(&mut self.pending_table_characters).concat();
        if !pending.is_empty() {
            if is_all_whitespace(&pending) {
                self.insert_text(&pending);
            } else {
                self.error(ParseErrorCode::UnexpectedCharImpliesTableVoodoo);
                self.process_with_foster_parenting(Token::text(pending));
            }
        }
        self.set_insertion_mode(self.original_mode);
        ProcessResult::Reprocess(token)
    }

    pub(crate) fn in_caption_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::EndTag { ref name } if name == "caption" => {
                self.close_caption();
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                self.error_named(ParseErrorCode::UnexpectedStartTag, name);
                if self.close_caption() {
                    ProcessResult::Reprocess(token)
                } else {
                    ProcessResult::Done
                }
            }
            Token::EndTag { ref name } if name == "table" => {
                self.error(ParseErrorCode::UnexpectedEndTableInCaption);
                if self.close_caption() {
                    ProcessResult::Reprocess(token)
                } else {
                    ProcessResult::Done
                }
            }
            Token::EndTag { ref name }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            token => ProcessResult::ReprocessIn(InsertionMode::InBody, token),
        }
    }

    /// Returns `false` when no caption is in table scope (fragment case).
    fn close_caption(&mut self) -> bool {
        if !self.open_elements.in_table_scope("caption") {
            self.error_named(ParseErrorCode::UnexpectedEndTag, "caption");
            return false;
        }
        self.generate_implied_end_tags(None);
        if !self.current_is("caption") {
            self.error_named(ParseErrorCode::ExpectedOneEndTagButGotAnother, "caption");
        }
        self.open_elements.pop_until_popped("caption");
        self.active_formatting.clear_to_last_marker();
        self.set_insertion_mode(InsertionMode::InTable);
        true
    }

    pub(crate) fn in_column_group_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (whitespace, rest) = split_text(&text);
                self.insert_text(whitespace);
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => self.leave_column_group(rest),
                }
            }
            Token::Comment { text } => {
                self.insert_comment(&text);
                ProcessResult::Done
            }
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::StartTag { name, attrs, .. } if name == "col" => {
                self.insert_self_closing_element(&name, attrs);
                ProcessResult::Done
            }
            Token::EndTag { ref name } if name == "colgroup" => {
                if self.current_is("html") {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                } else {
                    self.open_elements.pop();
                    self.set_insertion_mode(InsertionMode::InTable);
                }
                ProcessResult::Done
            }
            Token::EndTag { ref name } if name == "col" => {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            Token::Eof if self.current_is("html") => ProcessResult::Done,
            token => self.leave_column_group(token),
        }
    }

    /// Implied `</colgroup>`; ignored when only the fragment root is open.
    fn leave_column_group(&mut self, token: Token) -> ProcessResult {
        if self.current_is("html") {
            self.error_named(ParseErrorCode::UnexpectedEndTag, "colgroup");
            return ProcessResult::Done;
        }
        self.open_elements.pop();
        self.set_insertion_mode(InsertionMode::InTable);
        ProcessResult::Reprocess(token)
    }

    pub(crate) fn in_table_body_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::StartTag { name, attrs, .. } if name == "tr" => {
                self.open_elements.pop_until_table_body_scope_marker();
                self.insert_html_element(&name, attrs);
                self.set_insertion_mode(InsertionMode::InRow);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } if matches!(name.as_str(), "td" | "th") => {
                self.error_named(ParseErrorCode::UnexpectedCellInTableBody, name);
                self.open_elements.pop_until_table_body_scope_marker();
                self.insert_html_element("tr", Vec::new());
                self.set_insertion_mode(InsertionMode::InRow);
                ProcessResult::Reprocess(token)
            }
            Token::EndTag { ref name } if is_table_section(name) => {
                if !self.open_elements.in_table_scope(name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return ProcessResult::Done;
                }
                self.open_elements.pop_until_table_body_scope_marker();
                self.open_elements.pop();
                self.set_insertion_mode(InsertionMode::InTable);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.leave_table_body(token)
            }
            Token::EndTag { ref name } if name == "table" => self.leave_table_body(token),
            Token::EndTag { ref name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            token => ProcessResult::ReprocessIn(InsertionMode::InTable, token),
        }
    }

    /// Implied end of the open table section.
    fn leave_table_body(&mut self, token: Token) -> ProcessResult {
        let in_scope = ["tbody", "thead", "tfoot"]
            .iter()
            .any(|name| self.open_elements.in_table_scope(name));
        if !in_scope {
            if let Token::StartTag { name, .. } | Token::EndTag { name } = &token {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
            }
            return ProcessResult::Done;
        }
        self.open_elements.pop_until_table_body_scope_marker();
        self.open_elements.pop();
        self.set_insertion_mode(InsertionMode::InTable);
        ProcessResult::Reprocess(token)
    }

    pub(crate) fn in_row_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::StartTag { name, attrs, .. } if matches!(name.as_str(), "td" | "th") => {
                self.open_elements.pop_until_table_row_scope_marker();
                self.insert_html_element(&name, attrs);
                self.set_insertion_mode(InsertionMode::InCell);
                self.active_formatting.push_marker();
                ProcessResult::Done
            }
            Token::EndTag { ref name } if name == "tr" => {
                self.close_row();
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if self.close_row() {
                    ProcessResult::Reprocess(token)
                } else {
                    ProcessResult::Done
                }
            }
            Token::EndTag { ref name } if name == "table" => {
                if self.close_row() {
                    ProcessResult::Reprocess(token)
                } else {
                    ProcessResult::Done
                }
            }
            Token::EndTag { ref name } if is_table_section(name) => {
                if !self.open_elements.in_table_scope(name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return ProcessResult::Done;
                }
                if self.close_row() {
                    ProcessResult::Reprocess(token)
                } else {
                    ProcessResult::Done
                }
            }
            Token::EndTag { ref name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            token => ProcessResult::ReprocessIn(InsertionMode::InTable, token),
        }
    }

    /// Returns `false` when no row is in table scope (fragment case).
    fn close_row(&mut self) -> bool {
        if !self.open_elements.in_table_scope("tr") {
            self.error_named(ParseErrorCode::UnexpectedEndTag, "tr");
            return false;
        }
        self.open_elements.pop_until_table_row_scope_marker();
        self.open_elements.pop();
        self.set_insertion_mode(InsertionMode::InTableBody);
        true
    }

    pub(crate) fn in_cell_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::EndTag { ref name } if matches!(name.as_str(), "td" | "th") => {
                if !self.open_elements.in_table_scope(name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return ProcessResult::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is(name) {
                    self.error_named(ParseErrorCode::UnexpectedCellEndTag, name);
                }
                self.open_elements.pop_until_popped(name);
                self.active_formatting.clear_to_last_marker();
                self.set_insertion_mode(InsertionMode::InRow);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                if !self.open_elements.in_table_scope("td")
                    && !self.open_elements.in_table_scope("th")
                {
                    self.error_named(ParseErrorCode::UnexpectedStartTag, name);
                    return ProcessResult::Done;
                }
                self.close_cell();
                ProcessResult::Reprocess(token)
            }
            Token::EndTag { ref name }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            Token::EndTag { ref name }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if !self.open_elements.in_table_scope(name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                    return ProcessResult::Done;
                }
                self.close_cell();
                ProcessResult::Reprocess(token)
            }
            token => ProcessResult::ReprocessIn(InsertionMode::InBody, token),
        }
    }

    fn close_cell(&mut self) {
        self.generate_implied_end_tags(None);
        if !self.current_is_one_of(&["td", "th"]) {
            self.error(ParseErrorCode::UnexpectedCellEndTag);
        }
        self.open_elements
            .remove_open_elements_until(|popped| popped.is_html_one_of(&["td", "th"]));
        self.active_formatting.clear_to_last_marker();
        self.set_insertion_mode(InsertionMode::InRow);
    }
}
