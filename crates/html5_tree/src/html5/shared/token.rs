//! HTML5 token model consumed by the tree builder.

use super::Namespace;

/// HTML attribute as delivered by the tokenizer.
///
/// Determinism contract:
/// - Attributes on a `StartTag` are stored in encounter order.
/// - Names are already ASCII-lowercased; only the foreign-content adjustment
///   tables change their case or attach a namespace/prefix.
/// - An attribute without a value carries an empty `value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub namespace: Option<Namespace>,
    pub prefix: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            namespace: None,
            prefix: None,
        }
    }

    /// Same name, value, and namespace. Prefix is presentation only.
    pub(crate) fn same_as(&self, other: &Attribute) -> bool {
        self.name == other.name && self.value == other.value && self.namespace == other.namespace
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    StartTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Comment {
        text: String,
    },
    /// Character data. Adjacent runs may arrive split across several tokens.
    Text {
        text: String,
    },
    Eof,
}

impl Token {
    pub fn start_tag(name: impl Into<String>) -> Self {
        Token::StartTag {
            name: name.into(),
            attrs: Vec::new(),
            self_closing: false,
        }
    }

    pub fn end_tag(name: impl Into<String>) -> Self {
        Token::EndTag { name: name.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Token::Text { text: text.into() }
    }
}

/// Low-level lexing states the tree builder may ask the tokenizer to enter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenizerState {
    #[default]
    Data,
    Rcdata,
    Rawtext,
    ScriptData,
    Plaintext,
}
