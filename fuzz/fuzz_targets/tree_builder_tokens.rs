#![no_main]

use html5_tree::html5::{Attribute, Html5TreeBuilder, PatchTreeSink, Token, TreeBuilderConfig};
use html5_tree::{ArenaDom, DomPatch};
use libfuzzer_sys::fuzz_target;

const TAGS: &[&str] = &[
    "html", "head", "body", "p", "div", "a", "b", "i", "nobr", "table", "caption", "colgroup",
    "col", "tbody", "tr", "td", "th", "select", "option", "optgroup", "form", "li", "dd", "h1",
    "title", "textarea", "script", "style", "noscript", "plaintext", "frameset", "frame", "svg",
    "math", "mi", "mtext", "annotation-xml", "foreignobject", "desc", "font", "br", "input",
];

/// Two bytes per token: an opcode and a tag index.
fn decode(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(data.len() / 2 + 1);
    for pair in data.chunks(2) {
        let op = pair[0];
        let name = TAGS[usize::from(pair.get(1).copied().unwrap_or(0)) % TAGS.len()].to_string();
        let token = match op % 8 {
            0 | 1 => Token::StartTag {
                name,
                attrs: if op & 0x10 != 0 {
                    vec![Attribute::new("encoding", "text/html")]
                } else {
                    Vec::new()
                },
                self_closing: op & 0x20 != 0,
            },
            2 | 3 => Token::EndTag { name },
            4 => Token::text(if op & 0x10 != 0 { "\0x" } else { " \n" }),
            5 => Token::Comment { text: name },
            6 => Token::Doctype {
                name: Some(name),
                public_id: None,
                system_id: None,
                force_quirks: op & 0x10 != 0,
            },
            _ => Token::text("text"),
        };
        tokens.push(token);
    }
    tokens.push(Token::Eof);
    tokens
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let tokens = decode(rest);
    let context = (selector & 1 == 1).then(|| TAGS[usize::from(selector >> 1) % TAGS.len()]);

    let mut arena = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
    let sink = PatchTreeSink::new(Vec::<DomPatch>::new(), true);
    let mut patched = Html5TreeBuilder::new(TreeBuilderConfig::default(), sink);
    if let Some(context) = context {
        arena.set_fragment_context(context).expect("fresh builder");
        patched.set_fragment_context(context).expect("fresh builder");
    }
    for token in tokens {
        arena.push_token(token.clone()).expect("token before eof");
        patched.push_token(token).expect("token before eof");
    }

    let patches = patched.into_sink().into_inner();
    let replayed = ArenaDom::from_patches(&patches).expect("patch stream must replay");
    let expected = arena.into_sink().into_node();
    assert_eq!(replayed.into_node().text_content(), expected.text_content());
});
