//! HTML5 tree builder public API.
//!
//! Consumes HTML5 tokens and drives a [`TreeSink`] to build the document. The
//! builder owns all tree-construction state (insertion modes, stack of open
//! elements, active formatting list, etc.) and is resumable across token
//! boundaries: the host calls [`Html5TreeBuilder::push_token`] once per token
//! and honours any tokenizer state switch it returns.

use crate::html5::shared::{
    Attribute, Counters, ErrorPolicy, Namespace, ParseError, ParseErrorCode, Token, TokenizerState,
};
use std::fmt;
use std::sync::Arc;

mod adoption;
mod doctype;
mod emit;
mod foreign;
mod formatting;
mod insert;
mod modes;
mod rules;
mod sink;
mod stack;

pub use emit::{PatchSink, PatchTreeSink, VecPatchSink};
pub use modes::{InsertionMode, QuirksMode};
pub use sink::TreeSink;
pub use stack::{ItemId, StackItem};

use formatting::ActiveFormattingList;
use stack::ElementStack;

const LOG_TARGET: &str = "html5.tree_builder";

#[derive(Clone, Debug)]
pub struct TreeBuilderConfig {
    /// Parse `<noscript>` as raw text, as a scripting user agent would.
    pub scripting_enabled: bool,
    pub error_policy: ErrorPolicy,
    /// Upper bound on errors kept by [`Html5TreeBuilder::errors`]. Errors past
    /// the cap are still logged, counted, and forwarded to the sink.
    pub max_tracked_errors: usize,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self {
            scripting_enabled: false,
            error_policy: ErrorPolicy::Track,
            max_tracked_errors: 1024,
        }
    }
}

/// Tree builder step result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeBuilderStepResult {
    Continue,
    /// The tokenizer must switch to this state before producing the next
    /// token.
    SetTokenizerState(TokenizerState),
}

/// Misuse of the builder API by the host. Malformed markup is never an error
/// here; it is reported through [`ParseError`]s and recovered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeBuilderError {
    TokenAfterEof,
    FragmentContextAfterStart,
}

impl fmt::Display for TreeBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeBuilderError::TokenAfterEof => f.write_str("token pushed after EOF"),
            TreeBuilderError::FragmentContextAfterStart => {
                f.write_str("fragment context set after the first token")
            }
        }
    }
}

impl std::error::Error for TreeBuilderError {}

/// Start tag payload once it has been taken out of its [`Token`].
#[derive(Clone, Debug)]
pub(crate) struct Tag {
    pub(crate) name: String,
    pub(crate) attrs: Vec<Attribute>,
    pub(crate) self_closing: bool,
}

impl Tag {
    pub(crate) fn into_token(self) -> Token {
        Token::StartTag {
            name: self.name,
            attrs: self.attrs,
            self_closing: self.self_closing,
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// Outcome of one insertion-mode handler.
///
/// Re-dispatch is returned rather than performed so that a long chain of
/// "reprocess the token" steps runs in a loop instead of on the call stack.
#[derive(Debug)]
pub(crate) enum ProcessResult {
    Done,
    /// Dispatch again from the top, foreign-content check included.
    Reprocess(Token),
    /// Process using the rules of the given mode without switching to it.
    ReprocessIn(InsertionMode, Token),
}

/// HTML5 tree builder.
pub struct Html5TreeBuilder<S: TreeSink> {
    config: TreeBuilderConfig,
    sink: S,
    document: S::Handle,
    open_elements: ElementStack<S::Handle>,
    active_formatting: ActiveFormattingList<S::Handle>,
    mode: InsertionMode,
    original_mode: InsertionMode,
    quirks_mode: QuirksMode,
    frameset_ok: bool,
    form: Option<StackItem<S::Handle>>,
    head: Option<StackItem<S::Handle>>,
    /// Context element name; set only for fragment parsing.
    context: Option<Arc<str>>,
    redirect_attach_to_foster_parent: bool,
    self_closing_flag_acknowledged: bool,
    pending_table_characters: Vec<String>,
    should_skip_leading_newline: bool,
    pending_tokenizer_state: Option<TokenizerState>,
    next_item_id: u32,
    started: bool,
    finished: bool,
    position: usize,
    errors: Vec<ParseError>,
    counters: Counters,
}

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub fn new(config: TreeBuilderConfig, mut sink: S) -> Self {
        let document = sink.document();
        Self {
            config,
            sink,
            document,
            open_elements: ElementStack::default(),
            active_formatting: ActiveFormattingList::default(),
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::Initial,
            quirks_mode: QuirksMode::NoQuirks,
            frameset_ok: true,
            form: None,
            head: None,
            context: None,
            redirect_attach_to_foster_parent: false,
            self_closing_flag_acknowledged: false,
            pending_table_characters: Vec::new(),
            should_skip_leading_newline: false,
            pending_tokenizer_state: None,
            next_item_id: 0,
            started: false,
            finished: false,
            position: 0,
            errors: Vec::new(),
            counters: Counters::default(),
        }
    }

    /// Switches to the fragment parsing algorithm with `context` as the
    /// context element's local name. Must precede the first token.
    pub fn set_fragment_context(&mut self, context: &str) -> Result<(), TreeBuilderError> {
        if self.started {
            return Err(TreeBuilderError::FragmentContextAfterStart);
        }
        self.context = Some(Arc::from(context.to_ascii_lowercase()));
        Ok(())
    }

    /// Tokenizer state the host must start in. Only fragment contexts whose
    /// content is not markup select something other than `Data`.
    pub fn initial_tokenizer_state(&self) -> TokenizerState {
        match self.context.as_deref() {
            Some("title" | "textarea") => TokenizerState::Rcdata,
            Some("style" | "xmp" | "iframe" | "noembed" | "noframes") => TokenizerState::Rawtext,
            Some("noscript") if self.config.scripting_enabled => TokenizerState::Rawtext,
            Some("script") => TokenizerState::ScriptData,
            Some("plaintext") => TokenizerState::Plaintext,
            _ => TokenizerState::Data,
        }
    }

    /// Source offset attached to subsequently reported parse errors.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Push a token into the tree builder.
    ///
    /// Tokens are consumed in order; the builder may call into the sink zero
    /// or more times. Once `Token::Eof` has been processed the builder is
    /// finished and rejects further tokens.
    pub fn push_token(&mut self, token: Token) -> Result<TreeBuilderStepResult, TreeBuilderError> {
        if self.finished {
            return Err(TreeBuilderError::TokenAfterEof);
        }
        if !self.started {
            self.start_tokenization();
        }
        self.counters.tokens_processed = self.counters.tokens_processed.saturating_add(1);

        let token = if std::mem::take(&mut self.should_skip_leading_newline) {
            match token {
                Token::Text { text } => match text.strip_prefix('\n') {
                    Some("") => return Ok(self.step_result()),
                    Some(rest) => Token::Text {
                        text: rest.to_string(),
                    },
                    None => Token::Text { text },
                },
                other => other,
            }
        } else {
            token
        };

        let is_eof = matches!(token, Token::Eof);
        let self_closing_name = match &token {
            Token::StartTag {
                name,
                self_closing: true,
                ..
            } => Some(name.clone()),
            _ => None,
        };

        self.self_closing_flag_acknowledged = false;
        self.process_token(token);

        if let Some(name) = self_closing_name {
            if !self.self_closing_flag_acknowledged {
                self.error_named(ParseErrorCode::NonVoidElementWithTrailingSolidus, &name);
            }
        }
        if is_eof {
            self.finished = true;
        }
        self.counters.max_open_elements = self.open_elements.max_depth();
        self.counters.max_active_formatting = self.active_formatting.max_depth();
        Ok(self.step_result())
    }

    fn step_result(&mut self) -> TreeBuilderStepResult {
        match self.pending_tokenizer_state.take() {
            Some(state) => TreeBuilderStepResult::SetTokenizerState(state),
            None => TreeBuilderStepResult::Continue,
        }
    }

    fn start_tokenization(&mut self) {
        self.started = true;
        if self.context.is_some() {
            let html = self.create_item(Namespace::Html, Arc::from("html"), Arc::from(Vec::new()));
            self.sink.attach_node(html.node(), &self.document);
            self.open_elements.push_html_element(html);
            self.reset_insertion_mode();
        } else {
            self.set_insertion_mode(InsertionMode::Initial);
        }
    }

    /// Current insertion mode.
    pub fn insertion_mode(&self) -> InsertionMode {
        self.mode
    }

    /// Compatibility mode derived from the doctype.
    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Whether the tokenizer may recognise `<![CDATA[` sections, i.e. the
    /// current node is in a foreign namespace.
    pub fn is_cdata_section_allowed(&self) -> bool {
        self.open_elements
            .top()
            .is_some_and(|current| current.is_foreign())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn counters(&self) -> Counters {
        self.counters.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn process_token(&mut self, token: Token) {
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: LOG_TARGET,
            "token in {}: {token:?}",
            self.mode.name()
        );
        self.run(ProcessResult::Reprocess(token));
    }

    /// Drives handler results until the token is fully consumed.
    fn run(&mut self, mut result: ProcessResult) {
        loop {
            result = match result {
                ProcessResult::Done => return,
                ProcessResult::Reprocess(token) => {
                    if self.uses_foreign_content_rules(&token) {
                        self.foreign_content(token)
                    } else {
                        self.process_in_mode(self.mode, token)
                    }
                }
                ProcessResult::ReprocessIn(mode, token) => self.process_in_mode(mode, token),
            };
        }
    }

    /// Processes `token` with the rules of `mode` to completion. Used where a
    /// handler must observe the effect before continuing (implied tokens).
    pub(crate) fn process_nested(&mut self, mode: InsertionMode, token: Token) {
        self.run(ProcessResult::ReprocessIn(mode, token));
    }

    fn process_in_mode(&mut self, mode: InsertionMode, token: Token) -> ProcessResult {
        match mode {
            InsertionMode::Initial => self.initial_mode(token),
            InsertionMode::BeforeHtml => self.before_html_mode(token),
            InsertionMode::BeforeHead => self.before_head_mode(token),
            InsertionMode::InHead => self.in_head_mode(token),
            InsertionMode::InHeadNoscript => self.in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.after_head_mode(token),
            InsertionMode::InBody => self.in_body_mode(token),
            InsertionMode::Text => self.text_mode(token),
            InsertionMode::InTable => self.in_table_mode(token),
            InsertionMode::InTableText => self.in_table_text_mode(token),
            InsertionMode::InCaption => self.in_caption_mode(token),
            InsertionMode::InColumnGroup => self.in_column_group_mode(token),
            InsertionMode::InTableBody => self.in_table_body_mode(token),
            InsertionMode::InRow => self.in_row_mode(token),
            InsertionMode::InCell => self.in_cell_mode(token),
            InsertionMode::InSelect => self.in_select_mode(token),
            InsertionMode::InSelectInTable => self.in_select_in_table_mode(token),
            InsertionMode::AfterBody => self.after_body_mode(token),
            InsertionMode::InFrameset => self.in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.after_after_frameset_mode(token),
        }
    }

    pub(crate) fn set_insertion_mode(&mut self, mode: InsertionMode) {
        #[cfg(any(test, feature = "debug-stats"))]
        {
            if self.mode != mode {
                log::trace!(
                    target: LOG_TARGET,
                    "mode {} -> {}",
                    self.mode.name(),
                    mode.name()
                );
            }
        }
        self.mode = mode;
    }

    pub(crate) fn request_tokenizer_state(&mut self, state: TokenizerState) {
        self.pending_tokenizer_state = Some(state);
    }

    pub(crate) fn acknowledge_self_closing(&mut self) {
        self.self_closing_flag_acknowledged = true;
    }

    pub(crate) fn is_fragment(&self) -> bool {
        self.context.is_some()
    }

    pub(crate) fn error(&mut self, code: ParseErrorCode) {
        self.report(code, None, None);
    }

    pub(crate) fn error_named(&mut self, code: ParseErrorCode, name: &str) {
        self.report(code, Some(name), None);
    }

    pub(crate) fn error_detail(&mut self, code: ParseErrorCode, name: &str, detail: &str) {
        self.report(code, Some(name), Some(detail));
    }

    fn report(&mut self, code: ParseErrorCode, name: Option<&str>, detail: Option<&str>) {
        let error = ParseError {
            code,
            name: name.map(str::to_string),
            detail: detail.map(str::to_string),
            position: self.position,
        };
        log::debug!(target: LOG_TARGET, "parse error in {}: {error}", self.mode.name());
        self.counters.parse_errors = self.counters.parse_errors.saturating_add(1);
        self.sink.parse_error(&error);
        if self.config.error_policy == ErrorPolicy::Track
            && self.errors.len() < self.config.max_tracked_errors
        {
            self.errors.push(error);
        }
    }
}

#[cfg(test)]
mod tests;
