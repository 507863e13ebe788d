//! `after body`, `in frameset`, `after frameset`, `after after body` and
//! `after after frameset`.

use super::split_text;
use crate::html5::shared::{ParseErrorCode, Token, is_html_whitespace};
use crate::html5::tree_builder::{Html5TreeBuilder, InsertionMode, ProcessResult, TreeSink};

/// Keeps only the whitespace of `text`; reports whether anything else was
/// dropped.
fn whitespace_only(text: &str) -> (String, bool) {
    let whitespace: String = text.chars().filter(|&ch| is_html_whitespace(ch)).collect();
    let dropped = whitespace.len() != text.len();
    (whitespace, dropped)
}

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn after_body_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (whitespace, rest) = split_text(&text);
                if !whitespace.is_empty() {
                    self.process_nested(InsertionMode::InBody, Token::text(whitespace));
                }
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => {
                        self.error(ParseErrorCode::UnexpectedCharAfterBody);
                        self.set_insertion_mode(InsertionMode::InBody);
                        ProcessResult::Reprocess(rest)
                    }
                }
            }
            Token::Comment { text } => {
                // Comments after </body> belong to the html element.
                if let Some(root) = self.open_elements.item(0).map(|item| item.node().clone()) {
                    self.sink.insert_comment(&text, &root);
                }
                ProcessResult::Done
            }
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::EndTag { ref name } if name == "html" => {
                if self.is_fragment() {
                    self.error(ParseErrorCode::EndHtmlInInnerhtml);
                } else {
                    self.set_insertion_mode(InsertionMode::AfterAfterBody);
                }
                ProcessResult::Done
            }
            Token::Eof => ProcessResult::Done,
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::UnexpectedStartTagAfterBody, name);
                self.set_insertion_mode(InsertionMode::InBody);
                ProcessResult::Reprocess(token)
            }
            Token::EndTag { ref name } => {
                self.error_named(ParseErrorCode::UnexpectedEndTagAfterBody, name);
                self.set_insertion_mode(InsertionMode::InBody);
                ProcessResult::Reprocess(token)
            }
        }
    }

    pub(crate) fn in_frameset_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (whitespace, dropped) = whitespace_only(&text);
                self.insert_text(&whitespace);
                if dropped {
                    self.error(ParseErrorCode::UnexpectedCharInFrameset);
                }
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
            Token::StartTag { name, attrs, .. } if name == "frameset" => {
                self.insert_html_element(&name, attrs);
                ProcessResult::Done
            }
            Token::StartTag { name, attrs, .. } if name == "frame" => {
                self.insert_self_closing_element(&name, attrs);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::StartTag { ref name, .. } if name == "noframes" => {
                ProcessResult::ReprocessIn(InsertionMode::InHead, token)
            }
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::UnexpectedStartTagInFrameset, name);
                ProcessResult::Done
            }
            Token::EndTag { ref name } if name == "frameset" => {
                if self.current_is("html") {
                    self.error(ParseErrorCode::UnexpectedFramesetInFramesetInnerhtml);
                    return ProcessResult::Done;
                }
                self.open_elements.pop();
                if !self.is_fragment() && !self.current_is("frameset") {
                    self.set_insertion_mode(InsertionMode::AfterFrameset);
                }
                ProcessResult::Done
            }
            Token::EndTag { ref name } => {
                self.error_named(ParseErrorCode::UnexpectedEndTagInFrameset, name);
                ProcessResult::Done
            }
            Token::Eof => {
                if !self.current_is("html") {
                    self.error(ParseErrorCode::EofInFrameset);
                }
                ProcessResult::Done
            }
        }
    }

    pub(crate) fn after_frameset_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (whitespace, dropped) = whitespace_only(&text);
                self.insert_text(&whitespace);
                if dropped {
                    self.error(ParseErrorCode::UnexpectedCharAfterFrameset);
                }
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
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::StartTag { ref name, .. } if name == "noframes" => {
                ProcessResult::ReprocessIn(InsertionMode::InHead, token)
            }
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::UnexpectedStartTagAfterFrameset, name);
                ProcessResult::Done
            }
            Token::EndTag { ref name } if name == "html" => {
                self.set_insertion_mode(InsertionMode::AfterAfterFrameset);
                ProcessResult::Done
            }
            Token::EndTag { ref name } => {
                self.error_named(ParseErrorCode::UnexpectedEndTagAfterFrameset, name);
                ProcessResult::Done
            }
            Token::Eof => ProcessResult::Done,
        }
    }

    pub(crate) fn after_after_body_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Comment { text } => {
                self.insert_comment_in_document(&text);
                ProcessResult::Done
            }
            Token::Doctype { .. } => ProcessResult::ReprocessIn(InsertionMode::InBody, token),
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::Text { text } => {
                let (whitespace, rest) = split_text(&text);
                if !whitespace.is_empty() {
                    self.process_nested(InsertionMode::InBody, Token::text(whitespace));
                }
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => {
                        self.error(ParseErrorCode::ExpectedEofButGotChar);
                        self.set_insertion_mode(InsertionMode::InBody);
                        ProcessResult::Reprocess(rest)
                    }
                }
            }
            Token::Eof => ProcessResult::Done,
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::ExpectedEofButGotStartTag, name);
                self.set_insertion_mode(InsertionMode::InBody);
                ProcessResult::Reprocess(token)
            }
            Token::EndTag { ref name } => {
                self.error_named(ParseErrorCode::ExpectedEofButGotEndTag, name);
                self.set_insertion_mode(InsertionMode::InBody);
                ProcessResult::Reprocess(token)
            }
        }
    }

    pub(crate) fn after_after_frameset_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Comment { text } => {
                self.insert_comment_in_document(&text);
                ProcessResult::Done
            }
            Token::Doctype { .. } => ProcessResult::ReprocessIn(InsertionMode::InBody, token),
            Token::StartTag { ref name, .. } if name == "html" => {
                ProcessResult::ReprocessIn(InsertionMode::InBody, token)
            }
            Token::StartTag { ref name, .. } if name == "noframes" => {
                ProcessResult::ReprocessIn(InsertionMode::InHead, token)
            }
            Token::Text { text } => {
                let (whitespace, dropped) = whitespace_only(&text);
                if !whitespace.is_empty() {
                    self.process_nested(InsertionMode::InBody, Token::text(whitespace));
                }
                if dropped {
                    self.error(ParseErrorCode::ExpectedEofButGotChar);
                }
                ProcessResult::Done
            }
            Token::Eof => ProcessResult::Done,
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::ExpectedEofButGotStartTag, name);
                ProcessResult::Done
            }
            Token::EndTag { ref name } => {
                self.error_named(ParseErrorCode::ExpectedEofButGotEndTag, name);
                ProcessResult::Done
            }
        }
    }
}
