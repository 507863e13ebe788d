//! `in head`, `in head noscript` and `after head`.

use super::split_text;
use crate::html5::shared::{Attribute, Namespace, ParseErrorCode, Token, TokenizerState};
use crate::html5::tree_builder::{Html5TreeBuilder, InsertionMode, ProcessResult, TreeSink};
use std::sync::Arc;

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn in_head_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (whitespace, rest) = split_text(&text);
                self.insert_text(whitespace);
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => self.leave_head(rest),
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
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => match name.as_str() {
                "html" => ProcessResult::ReprocessIn(
                    InsertionMode::InBody,
                    Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    },
                ),
                "base" | "basefont" | "bgsound" | "command" | "link" | "meta" => {
                    self.insert_self_closing_element(&name, attrs);
                    ProcessResult::Done
                }
                "title" => {
                    self.parse_text_element(&name, attrs, TokenizerState::Rcdata);
                    ProcessResult::Done
                }
                "noscript" if !self.config.scripting_enabled => {
                    self.insert_html_element(&name, attrs);
                    self.set_insertion_mode(InsertionMode::InHeadNoscript);
                    ProcessResult::Done
                }
                "noscript" | "noframes" | "style" => {
                    self.parse_text_element(&name, attrs, TokenizerState::Rawtext);
                    ProcessResult::Done
                }
                "script" => {
                    self.parse_text_element(&name, attrs, TokenizerState::ScriptData);
                    ProcessResult::Done
                }
                "head" => {
                    self.error(ParseErrorCode::TwoHeadsAreNotBetterThanOne);
                    ProcessResult::Done
                }
                _ => self.leave_head(Token::StartTag {
                    name,
                    attrs,
                    self_closing,
                }),
            },
            Token::EndTag { name } => match name.as_str() {
                "head" => {
                    self.open_elements.pop();
                    self.set_insertion_mode(InsertionMode::AfterHead);
                    ProcessResult::Done
                }
                "body" | "html" | "br" => self.leave_head(Token::EndTag { name }),
                _ => {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                    ProcessResult::Done
                }
            },
            Token::Eof => self.leave_head(Token::Eof),
        }
    }

    /// Implied `</head>`.
    fn leave_head(&mut self, token: Token) -> ProcessResult {
        self.open_elements.pop();
        self.set_insertion_mode(InsertionMode::AfterHead);
        ProcessResult::Reprocess(token)
    }

    pub(crate) fn in_head_noscript_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::EndTag { ref name } if name == "noscript" => {
                self.open_elements.pop();
                self.set_insertion_mode(InsertionMode::InHead);
                ProcessResult::Done
            }
            Token::Comment { .. } => ProcessResult::ReprocessIn(InsertionMode::InHead, token),
            Token::Text { text } => {
                let (whitespace, rest) = split_text(&text);
                if !whitespace.is_empty() {
                    self.process_nested(InsertionMode::InHead, Token::text(whitespace));
                }
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => {
                        self.error(ParseErrorCode::UnexpectedChar);
                        self.leave_noscript(rest)
                    }
                }
            }
            Token::StartTag { ref name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                ProcessResult::ReprocessIn(InsertionMode::InHead, token)
            }
            Token::StartTag { ref name, .. } if matches!(name.as_str(), "head" | "noscript") => {
                self.error_named(ParseErrorCode::UnexpectedStartTag, name);
                ProcessResult::Done
            }
            Token::EndTag { ref name } if name != "br" => {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::UnexpectedStartTag, name);
                self.leave_noscript(token)
            }
            token => {
                if let Token::EndTag { name } = &token {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                }
                self.leave_noscript(token)
            }
        }
    }

    /// Implied `</noscript>`.
    fn leave_noscript(&mut self, token: Token) -> ProcessResult {
        self.open_elements.pop();
        self.set_insertion_mode(InsertionMode::InHead);
        ProcessResult::Reprocess(token)
    }

    pub(crate) fn after_head_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (whitespace, rest) = split_text(&text);
                self.insert_text(whitespace);
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => self.implied_body_element(rest),
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
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => match name.as_str() {
                "html" => ProcessResult::ReprocessIn(
                    InsertionMode::InBody,
                    Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    },
                ),
                "body" => {
                    self.insert_body_element(attrs);
                    self.frameset_ok = false;
                    self.set_insertion_mode(InsertionMode::InBody);
                    ProcessResult::Done
                }
                "frameset" => {
                    self.insert_html_element(&name, attrs);
                    self.set_insertion_mode(InsertionMode::InFrameset);
                    ProcessResult::Done
                }
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "title" => {
                    self.error_named(ParseErrorCode::UnexpectedStartTagOutOfMyHead, &name);
                    self.process_in_reopened_head(Token::StartTag {
                        name,
                        attrs,
                        self_closing,
                    });
                    ProcessResult::Done
                }
                "head" => {
                    self.error_named(ParseErrorCode::UnexpectedStartTag, &name);
                    ProcessResult::Done
                }
                _ => self.implied_body_element(Token::StartTag {
                    name,
                    attrs,
                    self_closing,
                }),
            },
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                ProcessResult::Done
            }
            token => self.implied_body_element(token),
        }
    }

    /// Temporarily pushes the head element back so head content that shows
    /// up after `</head>` still lands inside it.
    fn process_in_reopened_head(&mut self, token: Token) {
        let Some(head) = self.head.clone() else {
            self.process_nested(InsertionMode::InHead, token);
            return;
        };
        self.open_elements.push(head.clone());
        self.process_nested(InsertionMode::InHead, token);
        if self.open_elements.contains(&head) {
            self.open_elements.remove(&head);
        }
    }

    fn implied_body_element(&mut self, token: Token) -> ProcessResult {
        self.insert_body_element(Vec::new());
        self.set_insertion_mode(InsertionMode::InBody);
        ProcessResult::Reprocess(token)
    }

    fn insert_body_element(&mut self, attrs: Vec<Attribute>) {
        let body =
            self.insert_element_with(Namespace::Html, Arc::from("body"), Arc::from(attrs), false);
        self.open_elements.push(body);
    }
}
