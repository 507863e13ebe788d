//! Minimal markup tokenizer used to feed the tree builder from fixtures.
//!
//! It covers the subset of HTML tokenization the fixtures rely on: tags with
//! quoted/unquoted/bare attributes, comments, doctypes, a handful of
//! character references, CDATA sections in foreign content, and the raw-text
//! states the tree builder may request. It is not a conforming tokenizer.

use html5_tree::html5::{Attribute, Token, TokenizerState};

pub struct MarkupTokenizer<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
    state: TokenizerState,
    cdata_allowed: bool,
    last_start_tag: Option<String>,
    emitted_eof: bool,
}

impl<'a> MarkupTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            token_start: 0,
            state: TokenizerState::Data,
            cdata_allowed: false,
            last_start_tag: None,
            emitted_eof: false,
        }
    }

    /// Byte offset where the most recently returned token started.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    pub fn set_state(&mut self, state: TokenizerState) {
        self.state = state;
    }

    /// Raw-text states end at `</name>`; fragment parsing needs to seed the
    /// name from the context element.
    pub fn set_last_start_tag(&mut self, name: &str) {
        self.last_start_tag = Some(name.to_ascii_lowercase());
    }

    pub fn set_cdata_allowed(&mut self, allowed: bool) {
        self.cdata_allowed = allowed;
    }

    pub fn next_token(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        self.token_start = self.pos;
        if self.pos >= self.input.len() {
            self.emitted_eof = true;
            return Some(Token::Eof);
        }
        let token = match self.state {
            TokenizerState::Data => self.data(),
            TokenizerState::Rcdata => self.raw_text(true),
            TokenizerState::Rawtext | TokenizerState::ScriptData => self.raw_text(false),
            TokenizerState::Plaintext => {
                let text = self.rest().to_string();
                self.pos = self.input.len();
                Token::text(text)
            }
        };
        Some(token)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn data(&mut self) -> Token {
        let rest = self.rest();
        if let Some(after) = rest.strip_prefix("<!--") {
            let (text, consumed) = match after.find("-->") {
                Some(end) => (&after[..end], 4 + end + 3),
                None => (after, rest.len()),
            };
            self.pos += consumed;
            return Token::Comment {
                text: text.to_string(),
            };
        }
        if starts_with_ignore_case(rest, "<!doctype") {
            return self.doctype();
        }
        if self.cdata_allowed
            && let Some(after) = rest.strip_prefix("<![CDATA[")
        {
            let (text, consumed) = match after.find("]]>") {
                Some(end) => (&after[..end], 9 + end + 3),
                None => (after, rest.len()),
            };
            self.pos += consumed;
            return Token::text(text);
        }
        if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</>") {
            return self.bogus_comment();
        }
        if let Some(after) = rest.strip_prefix("</")
            && after.starts_with(|ch: char| ch.is_ascii_alphabetic())
        {
            self.pos += 2;
            let name = self.tag_name();
            self.skip_past('>');
            return Token::end_tag(name);
        }
        if let Some(after) = rest.strip_prefix('<')
            && after.starts_with(|ch: char| ch.is_ascii_alphabetic())
        {
            return self.start_tag();
        }

        // A `<` that opens nothing is literal text.
        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(_, ch)| ch == '<')
            .map_or(rest.len(), |(index, _)| index);
        self.pos += end;
        Token::text(decode_entities(&rest[..end]))
    }

    fn raw_text(&mut self, decode: bool) -> Token {
        let rest = self.rest();
        let end = self
            .last_start_tag
            .as_deref()
            .and_then(|name| find_appropriate_end_tag(rest, name))
            .unwrap_or(rest.len());
        if end == 0 {
            // Content is exhausted; the end tag itself goes through data.
            self.state = TokenizerState::Data;
            return self.data();
        }
        self.pos += end;
        if end < rest.len() {
            self.state = TokenizerState::Data;
        }
        let text = &rest[..end];
        if decode {
            Token::text(decode_entities(text))
        } else {
            Token::text(text)
        }
    }

    fn doctype(&mut self) -> Token {
        self.pos += "<!doctype".len();
        let end = self.rest().find('>').unwrap_or(self.rest().len());
        let body = &self.rest()[..end];
        self.pos = (self.pos + end + 1).min(self.input.len());

        let mut words = DoctypeWords::new(body);
        let name = words.next_word().map(|word| word.to_ascii_lowercase());
        let mut public_id = None;
        let mut system_id = None;
        let mut force_quirks = name.is_none();
        match words.next_word().map(|word| word.to_ascii_uppercase()).as_deref() {
            Some("PUBLIC") => {
                public_id = words.next_quoted();
                system_id = words.next_quoted();
                force_quirks |= public_id.is_none();
            }
            Some("SYSTEM") => {
                system_id = words.next_quoted();
                force_quirks |= system_id.is_none();
            }
            Some(_) => force_quirks = true,
            None => {}
        }
        Token::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        }
    }

    fn bogus_comment(&mut self) -> Token {
        let rest = self.rest();
        let skip = if rest.starts_with("<!") || rest.starts_with("</") {
            2
        } else {
            1
        };
        let end = rest.find('>').unwrap_or(rest.len());
        let text = rest.get(skip..end).unwrap_or("").to_string();
        self.pos = (self.pos + end + 1).min(self.input.len());
        Token::Comment { text }
    }

    fn start_tag(&mut self) -> Token {
        self.pos += 1;
        let name = self.tag_name();
        let mut attrs: Vec<Attribute> = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            let attr = self.attribute();
            // The first occurrence of a name wins.
            if !attrs.iter().any(|existing| existing.name == attr.name) {
                attrs.push(attr);
            }
        }
        self.last_start_tag = Some(name.clone());
        Token::StartTag {
            name,
            attrs,
            self_closing,
        }
    }

    fn attribute(&mut self) -> Attribute {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(_, ch)| ch.is_ascii_whitespace() || matches!(ch, '=' | '>' | '/'))
            .map_or(rest.len(), |(index, _)| index);
        let name = rest[..end].to_ascii_lowercase();
        self.pos += end;
        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return Attribute::new(name, "");
        }
        self.pos += 1;
        self.skip_whitespace();
        let rest = self.rest();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                let close = body.find(quote).unwrap_or(body.len());
                self.pos = (self.pos + 1 + close + 1).min(self.input.len());
                &body[..close]
            }
            _ => {
                let end = rest
                    .find(|ch: char| ch.is_ascii_whitespace() || ch == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        };
        Attribute::new(name, decode_entities(value))
    }

    fn tag_name(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .find(|ch: char| ch.is_ascii_whitespace() || matches!(ch, '/' | '>'))
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|ch: char| ch.is_ascii_whitespace());
        self.pos += rest.len() - trimmed.len();
    }

    fn skip_past(&mut self, ch: char) {
        self.pos = match self.rest().find(ch) {
            Some(index) => self.pos + index + ch.len_utf8(),
            None => self.input.len(),
        };
    }
}

impl Iterator for MarkupTokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Tokenizes `input` in the data state without tree-builder feedback.
pub fn tokenize(input: &str) -> Vec<Token> {
    MarkupTokenizer::new(input).collect()
}

struct DoctypeWords<'a> {
    rest: &'a str,
}

impl<'a> DoctypeWords<'a> {
    fn new(body: &'a str) -> Self {
        Self { rest: body }
    }

    fn next_word(&mut self) -> Option<&'a str> {
        let trimmed = self.rest.trim_start();
        let end = trimmed
            .find(|ch: char| ch.is_ascii_whitespace())
            .unwrap_or(trimmed.len());
        self.rest = &trimmed[end..];
        (end > 0).then(|| &trimmed[..end])
    }

    fn next_quoted(&mut self) -> Option<String> {
        let trimmed = self.rest.trim_start();
        let quote = trimmed.chars().next().filter(|ch| matches!(ch, '"' | '\''))?;
        let body = &trimmed[1..];
        let close = body.find(quote).unwrap_or(body.len());
        self.rest = body.get(close + 1..).unwrap_or("");
        Some(body[..close].to_string())
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn find_appropriate_end_tag(text: &str, name: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = text[from..].find("</") {
        let start = from + offset;
        let after = &text[start + 2..];
        if starts_with_ignore_case(after, name)
            && after[name.len()..]
                .chars()
                .next()
                .is_none_or(|ch| ch.is_ascii_whitespace() || matches!(ch, '/' | '>'))
        {
            return Some(start);
        }
        from = start + 2;
    }
    None
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|&semi| semi <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        match decode_reference(&rest[1..semi]) {
            Some(ch) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(reference: &str) -> Option<char> {
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = reference.strip_prefix('#')?;
            let value = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_attributes_and_text() {
        let tokens = tokenize("<P Class=a id='b' hidden>x &amp; y</p>");
        assert_eq!(
            tokens,
            vec![
                Token::StartTag {
                    name: "p".to_string(),
                    attrs: vec![
                        Attribute::new("class", "a"),
                        Attribute::new("id", "b"),
                        Attribute::new("hidden", ""),
                    ],
                    self_closing: false,
                },
                Token::text("x & y"),
                Token::end_tag("p"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn doctype_with_public_identifier() {
        let tokens = tokenize(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN">"#);
        assert_eq!(
            tokens[0],
            Token::Doctype {
                name: Some("html".to_string()),
                public_id: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
                system_id: None,
                force_quirks: false,
            }
        );
    }

    #[test]
    fn raw_text_runs_to_matching_end_tag() {
        let mut tokenizer = MarkupTokenizer::new("<script>a</b></script>");
        assert!(matches!(tokenizer.next_token(), Some(Token::StartTag { .. })));
        tokenizer.set_state(TokenizerState::ScriptData);
        assert_eq!(tokenizer.next_token(), Some(Token::text("a</b>")));
        assert_eq!(tokenizer.next_token(), Some(Token::end_tag("script")));
        assert_eq!(tokenizer.next_token(), Some(Token::Eof));
        assert_eq!(tokenizer.next_token(), None);
    }

    #[test]
    fn duplicate_attribute_keeps_first() {
        let tokens = tokenize("<a x=1 x=2>");
        let Token::StartTag { attrs, .. } = &tokens[0] else {
            panic!("expected start tag, got {:?}", tokens[0]);
        };
        assert_eq!(attrs, &vec![Attribute::new("x", "1")]);
    }
}
