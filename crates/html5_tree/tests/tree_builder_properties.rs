//! Invariants that must hold for any input, checked over generated inputs.

use html5_tree::dom_snapshot::DomSnapshot;
use html5_tree::html5::{
    Attribute, Html5TreeBuilder, InsertionMode, PatchTreeSink, Token, TreeBuilderConfig,
};
use html5_tree::{ArenaDom, Node};
use html5_tree_test_support::{diff_lines, drive_tokens, parse_document, snapshot_lines};
use std::env;

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

/// xorshift64*; deterministic so failures reproduce from the printed seed.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

const TAGS: &[&str] = &[
    "a", "b", "i", "p", "div", "span", "table", "tbody", "tr", "td", "th", "caption", "colgroup",
    "col", "select", "option", "optgroup", "li", "ul", "dd", "h1", "h2", "form", "button", "svg",
    "math", "mi", "foreignobject", "desc", "title", "textarea", "script", "html", "head", "body",
    "frameset", "frame", "br", "img", "input", "hr", "nobr", "font", "plaintext",
];

fn random_tokens(rng: &mut Rng, len: usize) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(len + 1);
    if rng.below(2) == 0 {
        tokens.push(Token::Doctype {
            name: Some("html".to_string()),
            public_id: None,
            system_id: None,
            force_quirks: false,
        });
    }
    for _ in 0..len {
        let name = TAGS[rng.below(TAGS.len())].to_string();
        let token = match rng.below(10) {
            0..=3 => Token::StartTag {
                name,
                attrs: if rng.below(4) == 0 {
                    vec![Attribute::new("class", "x")]
                } else {
                    Vec::new()
                },
                self_closing: rng.below(8) == 0,
            },
            4..=6 => Token::EndTag { name },
            7 => Token::Comment {
                text: "c".to_string(),
            },
            8 => Token::text(" \n"),
            _ => Token::text("t\0"),
        };
        tokens.push(token);
    }
    tokens.push(Token::Eof);
    tokens
}

fn element_depth(node: &Node) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(node, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        stack.extend(node.children().iter().map(|child| (child, depth + 1)));
    }
    deepest
}

fn count_lines(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .filter(|line| line.trim_start_matches(['|', ' ']) == needle)
        .count()
}

#[test]
fn noahs_ark_reopens_at_most_three_identical_elements() {
    for n in 1..=8 {
        let input = format!("<!DOCTYPE html><p>{}x</p>y", "<b>".repeat(n));
        let output = parse_document(&input);
        // n inside the paragraph plus the reconstructed run around "y".
        assert_eq!(
            count_lines(&output.lines, "<b>"),
            n + n.min(3),
            "n = {n}\n{}",
            output.lines.join("\n")
        );
    }
}

#[test]
fn noahs_ark_treats_distinct_attributes_as_distinct() {
    for n in 1..=6 {
        let opening: String = (0..n).map(|i| format!("<b class=c{i}>")).collect();
        let input = format!("<!DOCTYPE html><p>{opening}x</p>y");
        let output = parse_document(&input);
        assert_eq!(count_lines(&output.lines, "<b>"), 2 * n, "n = {n}");
    }
}

#[test]
fn adoption_agency_terminates_on_pathological_nesting() {
    let shapes = [
        format!("{}<div>x{}", "<a>".repeat(200), "</a>".repeat(200)),
        format!("{}<p>x{}", "<b><i><u><s>".repeat(60), "</b></i></u></s>".repeat(60)),
        format!("{}{}", "<nobr><div>".repeat(100), "</nobr>".repeat(100)),
        format!("<table>{}</table>", "<b><tr><td><i></b>".repeat(50)),
    ];
    for input in &shapes {
        let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
        html5_tree_test_support::drive(&mut builder, input, None).expect("parse completes");
        let counters = builder.counters();
        assert!(counters.adoption_agency_runs > 0, "{input:.40}");
        let root = builder.into_sink().into_node();
        assert!(element_depth(&root) >= 3, "{input:.40}");
    }
}

#[test]
fn fragment_contexts_always_resolve_an_insertion_mode() {
    let cases = [
        ("td", InsertionMode::InCell),
        ("th", InsertionMode::InCell),
        ("tr", InsertionMode::InRow),
        ("tbody", InsertionMode::InTableBody),
        ("thead", InsertionMode::InTableBody),
        ("tfoot", InsertionMode::InTableBody),
        ("caption", InsertionMode::InCaption),
        ("colgroup", InsertionMode::InColumnGroup),
        ("table", InsertionMode::InTable),
        ("select", InsertionMode::InSelect),
        ("frameset", InsertionMode::InFrameset),
        ("html", InsertionMode::BeforeHead),
        ("head", InsertionMode::InBody),
        ("body", InsertionMode::InBody),
        ("div", InsertionMode::InBody),
        ("title", InsertionMode::InBody),
        ("unknown-element", InsertionMode::InBody),
    ];
    for (context, expected) in cases {
        let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
        builder.set_fragment_context(context).expect("context before tokens");
        builder
            .push_token(Token::Comment {
                text: "context check".to_string(),
            })
            .expect("comment accepted");
        assert_eq!(builder.insertion_mode(), expected, "context {context}");
        drive_tokens(
            &mut builder,
            vec![Token::start_tag("p"), Token::text("x"), Token::end_tag("table")],
        )
        .expect("fragment completes");
    }
}

#[test]
fn random_token_streams_never_panic_and_sinks_agree() {
    let seed = env_u64("HTML5_TREE_PROPERTY_SEED", 0xC0FFEE);
    let runs = env_u64("HTML5_TREE_PROPERTY_RUNS", 300);
    let mut rng = Rng::new(seed);
    for run in 0..runs {
        let len = 1 + rng.below(60);
        let tokens = random_tokens(&mut rng, len);

        let mut arena = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
        drive_tokens(&mut arena, tokens.clone()).expect("arena run");
        let expected = snapshot_lines(&DomSnapshot::document(&arena.into_sink().into_node()));

        let sink = PatchTreeSink::new(Vec::new(), true);
        let mut patched = Html5TreeBuilder::new(TreeBuilderConfig::default(), sink);
        drive_tokens(&mut patched, tokens.clone()).expect("patch run");
        let patches = patched.into_sink().into_inner();
        let replayed = ArenaDom::from_patches(&patches)
            .unwrap_or_else(|err| panic!("seed {seed:#x} run {run}: replay failed: {err}"));
        let actual = snapshot_lines(&DomSnapshot::document(&replayed.into_node()));

        assert!(
            expected == actual,
            "seed {seed:#x} run {run}: sinks disagree\ntokens: {tokens:?}\n{}",
            diff_lines(&expected, &actual)
        );
    }
}

#[test]
fn error_positions_follow_the_host() {
    let tokens = random_tokens(&mut Rng::new(7), 40);
    let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
    for (index, token) in tokens.into_iter().enumerate() {
        builder.set_position(index * 10);
        builder.push_token(token).expect("token accepted");
    }
    let positions: Vec<usize> = builder.errors().iter().map(|error| error.position).collect();
    assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]), "{positions:?}");
    assert!(positions.iter().all(|position| position % 10 == 0));
}
