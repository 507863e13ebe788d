//! `initial`, `before html` and `before head`.

use super::split_text;
use crate::html5::shared::{Attribute, Namespace, ParseErrorCode, Token};
use crate::html5::tree_builder::doctype::{DoctypeClass, classify_doctype};
use crate::html5::tree_builder::{
    Html5TreeBuilder, InsertionMode, ProcessResult, QuirksMode, TreeSink,
};
use std::sync::Arc;

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn initial_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                let (_, rest) = split_text(&text);
                match rest {
                    None => ProcessResult::Done,
                    Some(rest) => {
                        self.error(ParseErrorCode::ExpectedDoctypeButGotChars);
                        self.missing_doctype(rest)
                    }
                }
            }
            Token::Comment { text } => {
                self.insert_comment_in_document(&text);
                ProcessResult::Done
            }
            Token::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                self.sink.insert_doctype(
                    name.as_deref().unwrap_or(""),
                    public_id.as_deref().unwrap_or(""),
                    system_id.as_deref().unwrap_or(""),
                );
                let class = classify_doctype(
                    name.as_deref(),
                    public_id.as_deref(),
                    system_id.as_deref(),
                    force_quirks,
                );
                match class {
                    DoctypeClass::Quirks => self.error(ParseErrorCode::QuirkyDoctype),
                    DoctypeClass::LimitedQuirks => {
                        self.error(ParseErrorCode::AlmostStandardsDoctype)
                    }
                    DoctypeClass::Obsolete => self.error(ParseErrorCode::ObsoleteDoctype),
                    DoctypeClass::Unknown => self.error(ParseErrorCode::UnknownDoctype),
                    DoctypeClass::Standard => {}
                }
                self.set_quirks_mode(class.quirks_mode());
                self.set_insertion_mode(InsertionMode::BeforeHtml);
                ProcessResult::Done
            }
            Token::StartTag { ref name, .. } => {
                self.error_named(ParseErrorCode::ExpectedDoctypeButGotStartTag, name);
                self.missing_doctype(token)
            }
            Token::EndTag { ref name } => {
                self.error_named(ParseErrorCode::ExpectedDoctypeButGotEndTag, name);
                self.missing_doctype(token)
            }
            Token::Eof => {
                self.error(ParseErrorCode::ExpectedDoctypeButGotEof);
                self.missing_doctype(token)
            }
        }
    }

    fn missing_doctype(&mut self, token: Token) -> ProcessResult {
        self.set_quirks_mode(QuirksMode::Quirks);
        self.set_insertion_mode(InsertionMode::BeforeHtml);
        ProcessResult::Reprocess(token)
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
        self.sink.set_quirks_mode(mode);
    }

    pub(crate) fn before_html_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
            Token::Comment { text } => {
                self.insert_comment_in_document(&text);
                ProcessResult::Done
            }
            Token::Text { text } => match split_text(&text).1 {
                None => ProcessResult::Done,
                Some(rest) => self.implied_html_element(rest),
            },
            Token::StartTag { name, attrs, .. } if name == "html" => {
                self.insert_html_root(attrs);
                self.set_insertion_mode(InsertionMode::BeforeHead);
                ProcessResult::Done
            }
            Token::EndTag { ref name }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.error_named(ParseErrorCode::UnexpectedEndTag, name);
                ProcessResult::Done
            }
            token => self.implied_html_element(token),
        }
    }

    fn implied_html_element(&mut self, token: Token) -> ProcessResult {
        self.insert_html_root(Vec::new());
        self.set_insertion_mode(InsertionMode::BeforeHead);
        ProcessResult::Reprocess(token)
    }

    fn insert_html_root(&mut self, attrs: Vec<Attribute>) {
        let html = self.create_item(Namespace::Html, Arc::from("html"), Arc::from(attrs));
        let document = self.document.clone();
        self.sink.attach_node(html.node(), &document);
        self.open_elements.push_html_element(html);
    }

    pub(crate) fn before_head_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => match split_text(&text).1 {
                None => ProcessResult::Done,
                Some(rest) => self.implied_head_element(rest),
            },
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
            Token::StartTag { name, attrs, .. } if name == "head" => {
                self.insert_head_element(attrs);
                self.set_insertion_mode(InsertionMode::InHead);
                ProcessResult::Done
            }
            Token::EndTag { ref name }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.error_named(ParseErrorCode::EndTagAfterImpliedRoot, name);
                ProcessResult::Done
            }
            token => self.implied_head_element(token),
        }
    }

    fn implied_head_element(&mut self, token: Token) -> ProcessResult {
        self.insert_head_element(Vec::new());
        self.set_insertion_mode(InsertionMode::InHead);
        ProcessResult::Reprocess(token)
    }

    fn insert_head_element(&mut self, attrs: Vec<Attribute>) {
        let head =
            self.insert_element_with(Namespace::Html, Arc::from("head"), Arc::from(attrs), false);
        self.open_elements.push_head_element(head.clone());
        self.head = Some(head);
    }
}
