//! `in body`.

use super::strip_nul;
use crate::html5::shared::{
    Attribute, Namespace, ParseErrorCode, Token, TokenizerState, is_all_whitespace,
};
use crate::html5::tree_builder::foreign::{
    adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
};
use crate::html5::tree_builder::{
    Html5TreeBuilder, InsertionMode, ProcessResult, QuirksMode, Tag, TreeSink,
};

/// Formatting elements closed through the adoption agency.
const FORMATTING_END_TAGS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// Elements that may legitimately still be open at `</body>` or EOF.
const CLOSABLE_AT_END: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rp", "rt", "tbody", "td", "tfoot", "th",
    "thead", "tr", "body", "html",
];

const ISINDEX_PROMPT: &str = "This is a searchable index. Enter search keywords: ";

impl<S: TreeSink> Html5TreeBuilder<S> {
    pub(crate) fn in_body_mode(&mut self, token: Token) -> ProcessResult {
        match token {
            Token::Text { text } => {
                self.in_body_text(text);
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
            } => self.in_body_start_tag(Tag {
                name,
                attrs,
                self_closing,
            }),
            Token::EndTag { name } => self.in_body_end_tag(name),
            Token::Eof => {
                self.check_unclosed_at_end();
                ProcessResult::Done
            }
        }
    }

    fn in_body_text(&mut self, text: String) {
        let (text, had_nul) = strip_nul(text);
        if had_nul {
            self.error(ParseErrorCode::InvalidCodepoint);
        }
        if text.is_empty() {
            return;
        }
        self.reconstruct_active_formatting_elements();
        self.insert_text(&text);
        if self.frameset_ok && !is_all_whitespace(&text) {
            self.frameset_ok = false;
        }
    }

    fn check_unclosed_at_end(&mut self) {
        let unclosed = self
            .open_elements
            .iter()
            .find(|item| !item.is_html_one_of(CLOSABLE_AT_END))
            .map(|item| item.local_name().to_string());
        if let Some(name) = unclosed {
            self.error_named(ParseErrorCode::ExpectedClosingTagButGotEof, &name);
        }
    }

    fn in_body_start_tag(&mut self, tag: Tag) -> ProcessResult {
        match tag.name.as_str() {
            "html" => {
                self.error_named(ParseErrorCode::NonHtmlRoot, "html");
                if let Some(root) = self.open_elements.root_node().cloned() {
                    self.sink.add_attributes_to_element(&root, &tag.attrs);
                }
            }
            "base" | "basefont" | "bgsound" | "command" | "link" | "meta" | "noframes"
            | "script" | "style" | "title" => {
                return ProcessResult::ReprocessIn(InsertionMode::InHead, tag.into_token());
            }
            "body" => {
                self.error_named(ParseErrorCode::UnexpectedStartTag, "body");
                let body = self.open_elements.item(1).filter(|item| item.is_html("body"));
                if let Some(body) = body.map(|item| item.node().clone()) {
                    self.frameset_ok = false;
                    self.sink.add_attributes_to_element(&body, &tag.attrs);
                }
            }
            "frameset" => {
                self.error_named(ParseErrorCode::UnexpectedStartTag, "frameset");
                let body = self.open_elements.item(1).filter(|item| item.is_html("body"));
                let Some(body) = body.map(|item| item.node().clone()) else {
                    return ProcessResult::Done;
                };
                if !self.frameset_ok {
                    return ProcessResult::Done;
                }
                self.sink.detach_from_parent(&body);
                self.open_elements.truncate(1);
                self.insert_html_element(&tag.name, tag.attrs);
                self.set_insertion_mode(InsertionMode::InFrameset);
            }
            "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dir"
            | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer" | "header"
            | "hgroup" | "main" | "menu" | "nav" | "ol" | "p" | "section" | "summary" | "ul" => {
                self.close_p_in_button_scope();
                self.insert_html_element(&tag.name, tag.attrs);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.close_p_in_button_scope();
                if self.current().is_numbered_header() {
                    self.error_named(ParseErrorCode::UnexpectedStartTag, &tag.name);
                    self.open_elements.pop();
                }
                self.insert_html_element(&tag.name, tag.attrs);
            }
            "pre" | "listing" => {
                self.close_p_in_button_scope();
                self.insert_html_element(&tag.name, tag.attrs);
                self.should_skip_leading_newline = true;
                self.frameset_ok = false;
            }
            "form" => {
                if self.form.is_some() {
                    self.error_named(ParseErrorCode::UnexpectedStartTag, "form");
                } else {
                    self.close_p_in_button_scope();
                    let form = self.insert_html_element(&tag.name, tag.attrs);
                    self.form = Some(form);
                }
            }
            "li" => {
                self.close_list_item(&["li"]);
                self.insert_html_element(&tag.name, tag.attrs);
            }
            "dd" | "dt" => {
                self.close_list_item(&["dd", "dt"]);
                self.insert_html_element(&tag.name, tag.attrs);
            }
            "plaintext" => {
                self.close_p_in_button_scope();
                self.insert_html_element(&tag.name, tag.attrs);
                self.request_tokenizer_state(TokenizerState::Plaintext);
            }
            "button" => {
                if self.open_elements.in_scope("button") {
                    self.error_detail(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        "button",
                        "button",
                    );
                    self.generate_implied_end_tags(None);
                    self.open_elements.pop_until_popped("button");
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag.name, tag.attrs);
                self.frameset_ok = false;
            }
            "a" => {
                if let Some(open_a) = self.active_formatting.find("a").cloned() {
                    self.error_detail(ParseErrorCode::UnexpectedStartTagImpliesEndTag, "a", "a");
                    self.adoption_agency_end_tag("a");
                    self.forget_formatting_element(&open_a);
                }
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(&tag.name, tag.attrs);
            }
            "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
            | "tt" | "u" => {
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(&tag.name, tag.attrs);
            }
            "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.open_elements.in_scope("nobr") {
                    self.error_detail(
                        ParseErrorCode::UnexpectedStartTagImpliesEndTag,
                        "nobr",
                        "nobr",
                    );
                    self.adoption_agency_end_tag("nobr");
                    self.reconstruct_active_formatting_elements();
                }
                self.insert_formatting_element(&tag.name, tag.attrs);
            }
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag.name, tag.attrs);
                self.active_formatting.push_marker();
                self.frameset_ok = false;
            }
            "table" => {
                if self.quirks_mode != QuirksMode::Quirks {
                    self.close_p_in_button_scope();
                }
                self.insert_html_element(&tag.name, tag.attrs);
                self.frameset_ok = false;
                self.set_insertion_mode(InsertionMode::InTable);
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_active_formatting_elements();
                self.insert_self_closing_element(&tag.name, tag.attrs);
                self.frameset_ok = false;
            }
            "image" => {
                self.error_detail(ParseErrorCode::UnexpectedStartTagTreatedAs, "image", "img");
                return ProcessResult::Reprocess(Token::StartTag {
                    name: "img".to_string(),
                    attrs: tag.attrs,
                    self_closing: tag.self_closing,
                });
            }
            "input" => {
                self.reconstruct_active_formatting_elements();
                let hidden = tag
                    .attr("type")
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"));
                self.insert_self_closing_element(&tag.name, tag.attrs);
                if !hidden {
                    self.frameset_ok = false;
                }
            }
            "param" | "source" | "track" => {
                self.insert_self_closing_element(&tag.name, tag.attrs);
            }
            "hr" => {
                self.close_p_in_button_scope();
                self.insert_self_closing_element(&tag.name, tag.attrs);
                self.frameset_ok = false;
            }
            "isindex" => self.in_body_isindex(tag),
            "textarea" => {
                self.insert_html_element(&tag.name, tag.attrs);
                self.should_skip_leading_newline = true;
                self.request_tokenizer_state(TokenizerState::Rcdata);
                self.original_mode = self.mode;
                self.frameset_ok = false;
                self.set_insertion_mode(InsertionMode::Text);
            }
            "xmp" => {
                self.close_p_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_text_element(&tag.name, tag.attrs, TokenizerState::Rawtext);
            }
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_element(&tag.name, tag.attrs, TokenizerState::Rawtext);
            }
            "noembed" => {
                self.parse_text_element(&tag.name, tag.attrs, TokenizerState::Rawtext);
            }
            "noscript" if self.config.scripting_enabled => {
                self.parse_text_element(&tag.name, tag.attrs, TokenizerState::Rawtext);
            }
            "select" => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag.name, tag.attrs);
                self.frameset_ok = false;
                let in_table = matches!(
                    self.mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                );
                self.set_insertion_mode(if in_table {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                });
            }
            "optgroup" | "option" => {
                if self.current_is("option") {
                    self.open_elements.pop();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag.name, tag.attrs);
            }
            "rp" | "rt" => {
                if self.open_elements.in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.current_is("ruby") {
                        self.error_named(ParseErrorCode::UnexpectedStartTag, &tag.name);
                    }
                }
                self.insert_html_element(&tag.name, tag.attrs);
            }
            "math" => self.insert_foreign_root(Namespace::MathMl, tag),
            "svg" => self.insert_foreign_root(Namespace::Svg, tag),
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => {
                self.error_named(ParseErrorCode::UnexpectedStartTagIgnored, &tag.name);
            }
            _ => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&tag.name, tag.attrs);
            }
        }
        ProcessResult::Done
    }

    /// Closes an open `li` (or `dd`/`dt`) before a sibling item starts.
    fn close_list_item(&mut self, names: &[&str]) {
        self.frameset_ok = false;
        let mut target = None;
        for item in self.open_elements.iter().rev() {
            if item.is_html_one_of(names) {
                target = Some(item.local_name().to_string());
                break;
            }
            if item.is_special() && !item.is_html_one_of(&["address", "div", "p"]) {
                break;
            }
        }
        if let Some(name) = target {
            self.generate_implied_end_tags(Some(&name));
            if !self.current_is(&name) {
                self.error_named(ParseErrorCode::EndTagTooEarly, &name);
            }
            self.open_elements.pop_until_popped(&name);
        }
        self.close_p_in_button_scope();
    }

    fn insert_foreign_root(&mut self, namespace: Namespace, mut tag: Tag) {
        self.reconstruct_active_formatting_elements();
        match namespace {
            Namespace::MathMl => adjust_mathml_attributes(&mut tag.attrs),
            _ => adjust_svg_attributes(&mut tag.attrs),
        }
        adjust_foreign_attributes(&mut tag.attrs);
        self.insert_foreign_element(namespace, &tag.name, tag.attrs, tag.self_closing);
    }

    /// Expands the legacy `<isindex>` into a small search form.
    fn in_body_isindex(&mut self, tag: Tag) {
        self.error_named(ParseErrorCode::DeprecatedTag, "isindex");
        self.acknowledge_self_closing();
        if self.form.is_some() {
            return;
        }

        let mut form_attrs = Vec::new();
        if let Some(action) = tag.attr("action") {
            form_attrs.push(Attribute::new("action", action));
        }
        let prompt = tag.attr("prompt").unwrap_or(ISINDEX_PROMPT).to_string();
        let mut input_attrs: Vec<Attribute> = tag
            .attrs
            .into_iter()
            .filter(|attr| !matches!(attr.name.as_str(), "action" | "prompt" | "name"))
            .collect();
        input_attrs.push(Attribute::new("name", "isindex"));

        let implied = [
            Token::StartTag {
                name: "form".to_string(),
                attrs: form_attrs,
                self_closing: false,
            },
            Token::start_tag("hr"),
            Token::start_tag("label"),
            Token::text(prompt),
            Token::StartTag {
                name: "input".to_string(),
                attrs: input_attrs,
                self_closing: false,
            },
            Token::end_tag("label"),
            Token::start_tag("hr"),
            Token::end_tag("form"),
        ];
        for token in implied {
            self.process_nested(InsertionMode::InBody, token);
        }
    }

    fn in_body_end_tag(&mut self, name: String) -> ProcessResult {
        match name.as_str() {
            "body" => {
                if !self.open_elements.in_scope("body") {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, "body");
                    return ProcessResult::Done;
                }
                self.check_unclosed_before_body_end();
                self.set_insertion_mode(InsertionMode::AfterBody);
            }
            "html" => {
                if !self.open_elements.in_scope("body") {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, "html");
                    return ProcessResult::Done;
                }
                self.check_unclosed_before_body_end();
                self.set_insertion_mode(InsertionMode::AfterBody);
                return ProcessResult::Reprocess(Token::EndTag { name });
            }
            "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details"
            | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer"
            | "header" | "hgroup" | "listing" | "main" | "menu" | "nav" | "ol" | "pre"
            | "section" | "summary" | "ul" => {
                if !self.open_elements.in_scope(&name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                    return ProcessResult::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is(&name) {
                    self.error_named(ParseErrorCode::EndTagTooEarly, &name);
                }
                self.open_elements.pop_until_popped(&name);
            }
            "form" => {
                let form = self.form.take();
                match form {
                    Some(form) if self.open_elements.element_in_scope(&form) => {
                        self.generate_implied_end_tags(None);
                        if *self.current() != form {
                            self.error_named(ParseErrorCode::EndTagTooEarly, "form");
                        }
                        self.open_elements.remove(&form);
                    }
                    _ => self.error_named(ParseErrorCode::UnexpectedEndTag, "form"),
                }
            }
            "p" => {
                if !self.open_elements.in_button_scope("p") {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, "p");
                    self.insert_html_element("p", Vec::new());
                }
                self.close_p_element();
            }
            "li" => {
                if !self.open_elements.in_list_item_scope("li") {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, "li");
                    return ProcessResult::Done;
                }
                self.close_named_with_implied(&name);
            }
            "dd" | "dt" => {
                if !self.open_elements.in_scope(&name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                    return ProcessResult::Done;
                }
                self.close_named_with_implied(&name);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if !self.open_elements.has_numbered_header_element_in_scope() {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                    return ProcessResult::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is(&name) {
                    self.error_named(ParseErrorCode::EndTagTooEarly, &name);
                }
                self.open_elements
                    .remove_open_elements_until(|popped| popped.is_numbered_header());
            }
            name if FORMATTING_END_TAGS.contains(&name) => {
                if !self.adoption_agency_end_tag(name) {
                    self.any_other_end_tag(name);
                }
            }
            "applet" | "marquee" | "object" => {
                if !self.open_elements.in_scope(&name) {
                    self.error_named(ParseErrorCode::UnexpectedEndTag, &name);
                    return ProcessResult::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.current_is(&name) {
                    self.error_named(ParseErrorCode::EndTagTooEarly, &name);
                }
                self.open_elements.pop_until_popped(&name);
                self.active_formatting.clear_to_last_marker();
            }
            "br" => {
                self.error_detail(ParseErrorCode::UnexpectedEndTagTreatedAs, "br", "br element");
                return ProcessResult::Reprocess(Token::start_tag("br"));
            }
            _ => self.any_other_end_tag(&name),
        }
        ProcessResult::Done
    }

    fn close_named_with_implied(&mut self, name: &str) {
        self.generate_implied_end_tags(Some(name));
        if !self.current_is(name) {
            self.error_named(ParseErrorCode::EndTagTooEarly, name);
        }
        self.open_elements.pop_until_popped(name);
    }

    fn check_unclosed_before_body_end(&mut self) {
        let unclosed = self
            .open_elements
            .iter()
            .skip(2)
            .find(|item| !item.is_html_one_of(CLOSABLE_AT_END))
            .map(|item| item.local_name().to_string());
        if let Some(expected) = unclosed {
            self.error_detail(ParseErrorCode::ExpectedOneEndTagButGotAnother, "body", &expected);
        }
    }

    /// Generic end tag: close the nearest element with this name unless a
    /// special element sits above it.
    pub(crate) fn any_other_end_tag(&mut self, name: &str) {
        let mut target = None;
        for item in self.open_elements.iter().rev() {
            if item.is_html(name) {
                target = Some(item.clone());
                break;
            }
            if item.is_special() {
                break;
            }
        }
        let Some(target) = target else {
            self.error_named(ParseErrorCode::UnexpectedEndTag, name);
            return;
        };
        self.generate_implied_end_tags(Some(name));
        if !self.current_is(name) {
            self.error_named(ParseErrorCode::UnexpectedEndTag, name);
        }
        self.open_elements
            .remove_open_elements_until(|popped| *popped == target);
    }
}
