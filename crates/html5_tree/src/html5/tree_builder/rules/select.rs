//! `in select` and `in select in table`.

use super::strip_nul;
use crate::html5::shared::{ParseErrorCode, Token};
use crate::html5::tree_builder::{Html5TreeBuilder, InsertionMode, ProcessResult, TreeSink};

const TABLE_ELEMENTS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn in_select_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (text, had_nul) = strip_nul(text);
                if had_nul {
                    self.error(ParseErrorCode::InvalidCodepoint);
                }
                self.insert_text(&text);
                ProcessResult::Done
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
                "html" | "script" => {
                    let mode = if name == "html" {
                        InsertionMode::InBody
                    } else {
                        InsertionMode::InHead
                    };
                    ProcessResult::ReprocessIn(
                        mode,
                        Token::StartTag {
                            name,
                            attrs,
                            self_closing,
                        },
                    )
                }
                "option" => {
                    if self.current_is("option") {
                        self.open_elements.pop();
                    }
                    self.insert_html_element(&name, attrs);
                    ProcessResult::Done
                }
                "optgroup" => {
                    if self.current_is("option") {
                        self.open_elements.pop();
                    }
                    if self.current_is("optgroup") {
                        self.open_elements.pop();
                    }
                    self.insert_html_element(&name, attrs);
                    ProcessResult::Done
                }
                "select" => {
                    self.error(ParseErrorCode::UnexpectedSelectInSelect);
                    self.close_select();
                    ProcessResult::Done
                }
                "input" | "keygen" | "textarea" => {
                    self.error_named(ParseErrorCode::UnexpectedInputInSelect, &name);
                    if !self.open_elements.in_select_scope("select") {
                        return ProcessResult::Done;
                    }
                    self.close_select();
                    ProcessResult::Reprocess(Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    })
                }
                _ => {
                    self.error_named(ParseErrorCode::UnexpectedStartTagInSelect, &name);
                    ProcessResult::Done
                }
            },
            Token::EndTag { name } => {
                match name.as_str() {
                    "optgroup" => {
                        let option_in_group = self.current_is("option")
                            && self
                                .open_elements
                                .len()
                                .checked_sub(2)
                                .and_then(|index| self.open_elements.item(index))
                                .is_some_and(|item| item.is_html("optgroup"));
                        if option_in_group {
                            self.open_elements.pop();
                        }
                        if self.current_is("optgroup") {
                            self.open_elements.pop();
                        } else {
                            self.error_named(ParseErrorCode::UnexpectedEndTagInSelect, &name);
                        }
                    }
                    "option" => {
                        if self.current_is("option") {
                            self.open_elements.pop();
                        } else {
                            self.error_named(ParseErrorCode::UnexpectedEndTagInSelect, &name);
                        }
                    }
                    "select" => {
                        if !self.open_elements.in_select_scope("select") {
                            self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                        } else {
                            self.close_select();
                        }
                    }
                    _ => self.error_named(ParseErrorCode::UnexpectedEndTagInSelect, &name),
                }
                ProcessResult::Done
            }
            Token::Eof => ProcessResult::ReprocessIn(InsertionMode::InBody, Token::Eof),
        }
    }

    fn close_select(&mut self) {
        if !self.open_elements.in_select_scope("select") {
            return;
        }
        self.open_elements.pop_until_popped("select");
        self.reset_insertion_mode();
    }

    pub(crate) fn in_select_in_table_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::StartTag { ref name, .. } if TABLE_ELEMENTS.contains(&name.as_str()) => {
                self.error_named(
                    ParseErrorCode::UnexpectedTableElementStartTagInSelectInTable,
                    name,
                );
                self.open_elements.pop_until_popped("select");
                self.reset_insertion_mode();
                ProcessResult::Reprocess(token)
            }
            Token::EndTag { ref name } if TABLE_ELEMENTS.contains(&name.as_str()) => {
                self.error_named(
                    ParseErrorCode::UnexpectedTableElementEndTagInSelectInTable,
                    name,
                );
                if !self.open_elements.in_table_scope(name) {
                    return ProcessResult::Done;
                }
                self.open_elements.pop_until_popped("select");
                self.reset_insertion_mode();
                ProcessResult::Reprocess(token)
            }
            token => ProcessResult::ReprocessIn(InsertionMode::InSelect, token),
        }
    }
}
