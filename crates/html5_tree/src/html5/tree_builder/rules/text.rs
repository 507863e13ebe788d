//! `text` mode: content of RCDATA, RAWTEXT and script elements.

use crate::html5::shared::{ParseErrorCode, Token};
use crate::html5::tree_builder::{Html5TreeBuilder, LOG_TARGET, ProcessResult, TreeSink};

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn text_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                self.insert_text(&text);
                ProcessResult::Done
            }
            Token::Eof => {
                let name = self.current().local_name().to_string();
                self.error_named(ParseErrorCode::ExpectedNamedClosingTagButGotEof, &name);
                self.open_elements.pop();
                self.set_insertion_mode(self.original_mode);
                ProcessResult::Reprocess(Token::Eof)
            }
            Token::EndTag { .. } => {
                self.open_elements.pop();
                self.set_insertion_mode(self.original_mode);
                ProcessResult::Done
            }
            Token::Comment { text } => {
                self.insert_comment(&text);
                ProcessResult::Done
            }
            Token::StartTag { name, .. } => {
                log::warn!(
                    target: LOG_TARGET,
                    "start tag <{name}> in text mode; the tokenizer ignored a state switch"
                );
                ProcessResult::Done
            }
            Token::Doctype { .. } => {
                self.error(ParseErrorCode::UnexpectedDoctype);
                ProcessResult::Done
            }
        }
    }
}
