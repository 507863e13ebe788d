use super::{
    Html5TreeBuilder, InsertionMode, QuirksMode, TreeBuilderConfig, TreeBuilderError,
    TreeBuilderStepResult,
};
use crate::ArenaDom;
use crate::dom_snapshot::DomSnapshot;
use crate::html5::shared::{Attribute, ErrorPolicy, ParseErrorCode, Token, TokenizerState};

fn doctype(name: &str) -> Token {
    Token::Doctype {
        name: Some(name.to_string()),
        public_id: None,
        system_id: None,
        force_quirks: false,
    }
}

fn start(name: &str) -> Token {
    Token::start_tag(name)
}

fn start_with(name: &str, attrs: &[(&str, &str)]) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attrs: attrs
            .iter()
            .map(|(name, value)| Attribute::new(*name, *value))
            .collect(),
        self_closing: false,
    }
}

fn self_closing(name: &str) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attrs: Vec::new(),
        self_closing: true,
    }
}

fn end(name: &str) -> Token {
    Token::end_tag(name)
}

fn text(data: &str) -> Token {
    Token::text(data)
}

fn builder_with(config: TreeBuilderConfig, context: Option<&str>) -> Html5TreeBuilder<ArenaDom> {
    let mut builder = Html5TreeBuilder::new(config, ArenaDom::new());
    if let Some(context) = context {
        builder
            .set_fragment_context(context)
            .expect("fragment context before first token");
    }
    builder
}

fn feed(builder: &mut Html5TreeBuilder<ArenaDom>, tokens: Vec<Token>) {
    for token in tokens {
        builder.push_token(token).expect("push_token should not fail");
    }
}

/// Parses a full document; an EOF token is appended.
fn run(mut tokens: Vec<Token>) -> Html5TreeBuilder<ArenaDom> {
    tokens.push(Token::Eof);
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    feed(&mut builder, tokens);
    builder
}

fn dump(builder: Html5TreeBuilder<ArenaDom>) -> Vec<String> {
    DomSnapshot::document(&builder.into_sink().into_node()).into_lines()
}

fn fragment_dump(builder: Html5TreeBuilder<ArenaDom>) -> Vec<String> {
    DomSnapshot::fragment(&builder.into_sink().fragment_children()).into_lines()
}

fn codes(builder: &Html5TreeBuilder<ArenaDom>) -> Vec<ParseErrorCode> {
    builder.errors().iter().map(|error| error.code).collect()
}

#[test]
fn standard_document_builds_without_errors() {
    let builder = run(vec![
        doctype("html"),
        start("html"),
        start("head"),
        end("head"),
        start("body"),
        start("p"),
        text("Hello"),
        end("body"),
        end("html"),
    ]);
    assert!(builder.errors().is_empty(), "{:?}", builder.errors());
    assert_eq!(builder.quirks_mode(), QuirksMode::NoQuirks);
    assert_eq!(builder.quirks_mode().as_str(), "no quirks");
    assert_eq!(builder.insertion_mode(), InsertionMode::AfterAfterBody);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"Hello\"",
        ]
    );
}

#[test]
fn second_p_implicitly_closes_the_first() {
    let builder = run(vec![start("p"), text("1"), start("p"), text("2")]);
    assert_eq!(codes(&builder), [ParseErrorCode::ExpectedDoctypeButGotStartTag]);
    assert_eq!(builder.quirks_mode(), QuirksMode::Quirks);
    assert_eq!(
        dump(builder),
        [
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"1\"",
            "|     <p>",
            "|       \"2\"",
        ]
    );
}

#[test]
fn text_in_table_is_foster_parented() {
    let builder = run(vec![doctype("html"), start("table"), text("X")]);
    assert_eq!(
        codes(&builder),
        [
            ParseErrorCode::UnexpectedCharImpliesTableVoodoo,
            ParseErrorCode::EofInTable,
        ]
    );
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"X\"",
            "|     <table>",
        ]
    );
}

#[test]
fn whitespace_in_table_stays_inside() {
    let builder = run(vec![doctype("html"), start("table"), text(" \n"), end("table")]);
    assert!(builder.errors().is_empty(), "{:?}", builder.errors());
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       \" \n\"",
        ]
    );
}

#[test]
fn misnested_formatting_runs_adoption_agency() {
    let builder = run(vec![
        doctype("html"),
        start("b"),
        text("1"),
        start("i"),
        text("2"),
        end("b"),
        text("3"),
    ]);
    assert_eq!(
        codes(&builder),
        [
            ParseErrorCode::AdoptionAgency1_3,
            ParseErrorCode::ExpectedClosingTagButGotEof,
        ]
    );
    assert_eq!(builder.counters().adoption_agency_runs, 1);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|       <i>",
            "|         \"2\"",
            "|     <i>",
            "|       \"3\"",
        ]
    );
}

#[test]
fn adoption_agency_splits_around_furthest_block() {
    let builder = run(vec![
        doctype("html"),
        start("a"),
        text("1"),
        start("div"),
        text("2"),
        end("a"),
        text("3"),
    ]);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       \"1\"",
            "|     <div>",
            "|       <a>",
            "|         \"2\"",
            "|       \"3\"",
        ]
    );
}

#[test]
fn nested_anchor_closes_the_open_one() {
    let builder = run(vec![
        doctype("html"),
        start("a"),
        text("1"),
        start("a"),
        text("2"),
    ]);
    assert_eq!(
        codes(&builder),
        [
            ParseErrorCode::UnexpectedStartTagImpliesEndTag,
            ParseErrorCode::ExpectedClosingTagButGotEof,
        ]
    );
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       \"1\"",
            "|     <a>",
            "|       \"2\"",
        ]
    );
}

#[test]
fn td_fragment_starts_in_cell() {
    let mut builder = builder_with(TreeBuilderConfig::default(), Some("td"));
    builder.push_token(text("x")).expect("push_token");
    assert_eq!(builder.insertion_mode(), InsertionMode::InCell);
    builder.push_token(Token::Eof).expect("push_token");
    assert!(builder.errors().is_empty(), "{:?}", builder.errors());
    assert_eq!(fragment_dump(builder), ["| \"x\""]);
}

#[test]
fn svg_cell_namesake_does_not_put_a_cell_in_scope() {
    let mut builder = builder_with(TreeBuilderConfig::default(), Some("th"));
    feed(
        &mut builder,
        vec![start("svg"), start("td"), start("title"), start("colgroup")],
    );
    assert_eq!(builder.insertion_mode(), InsertionMode::InCell);
    builder.push_token(Token::Eof).expect("push_token");
    assert!(codes(&builder).contains(&ParseErrorCode::UnexpectedStartTag));
    assert_eq!(
        fragment_dump(builder),
        ["| <svg svg>", "|   <svg td>", "|     <svg title>"]
    );
}

#[test]
fn svg_table_section_namesake_is_not_closed_by_table_end() {
    let mut builder = builder_with(TreeBuilderConfig::default(), Some("tbody"));
    feed(
        &mut builder,
        vec![start("svg"), start("tbody"), end("table"), start("br"), Token::Eof],
    );
    assert_eq!(
        fragment_dump(builder),
        ["| <svg svg>", "|   <svg tbody>", "| <br>"]
    );
}

#[test]
fn fragment_context_selects_initial_tokenizer_state() {
    let cases = [
        ("title", TokenizerState::Rcdata),
        ("textarea", TokenizerState::Rcdata),
        ("style", TokenizerState::Rawtext),
        ("script", TokenizerState::ScriptData),
        ("plaintext", TokenizerState::Plaintext),
        ("noscript", TokenizerState::Data),
        ("div", TokenizerState::Data),
    ];
    for (context, expected) in cases {
        let builder = builder_with(TreeBuilderConfig::default(), Some(context));
        assert_eq!(builder.initial_tokenizer_state(), expected, "context {context}");
    }
    let scripting = TreeBuilderConfig {
        scripting_enabled: true,
        ..TreeBuilderConfig::default()
    };
    let builder = builder_with(scripting, Some("noscript"));
    assert_eq!(builder.initial_tokenizer_state(), TokenizerState::Rawtext);
}

#[test]
fn fragment_context_modes_follow_reset_algorithm() {
    let cases = [
        ("tr", InsertionMode::InRow),
        ("tbody", InsertionMode::InTableBody),
        ("caption", InsertionMode::InCaption),
        ("colgroup", InsertionMode::InColumnGroup),
        ("table", InsertionMode::InTable),
        ("select", InsertionMode::InSelect),
        ("frameset", InsertionMode::InFrameset),
        ("head", InsertionMode::InBody),
        ("html", InsertionMode::BeforeHead),
        ("div", InsertionMode::InBody),
    ];
    for (context, expected) in cases {
        let mut builder = builder_with(TreeBuilderConfig::default(), Some(context));
        builder.push_token(Token::Comment { text: String::new() }).expect("push_token");
        assert_eq!(builder.insertion_mode(), expected, "context {context}");
    }
}

#[test]
fn start_tag_in_table_is_foster_parented() {
    let builder = run(vec![doctype("html"), start("table"), start("div"), text("a")]);
    assert_eq!(
        codes(&builder),
        [
            ParseErrorCode::UnexpectedStartTagImpliesTableVoodoo,
            ParseErrorCode::UnexpectedCharImpliesTableVoodoo,
            ParseErrorCode::EofInTable,
        ]
    );
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <div>",
            "|       \"a\"",
            "|     <table>",
        ]
    );
}

#[test]
fn table_cells_imply_tbody_and_row() {
    let builder = run(vec![
        doctype("html"),
        start("table"),
        start("tr"),
        start("td"),
        text("x"),
        end("table"),
    ]);
    assert!(builder.errors().is_empty(), "{:?}", builder.errors());
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"x\"",
        ]
    );
}

#[test]
fn title_round_trips_through_text_mode() {
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    feed(&mut builder, vec![doctype("html"), start("html"), start("head")]);
    assert_eq!(builder.insertion_mode(), InsertionMode::InHead);
    let step = builder.push_token(start("title")).expect("push_token");
    assert_eq!(step, TreeBuilderStepResult::SetTokenizerState(TokenizerState::Rcdata));
    assert_eq!(builder.insertion_mode(), InsertionMode::Text);
    let step = builder.push_token(text("foo")).expect("push_token");
    assert_eq!(step, TreeBuilderStepResult::Continue);
    builder.push_token(end("title")).expect("push_token");
    assert_eq!(builder.insertion_mode(), InsertionMode::InHead);
    builder.push_token(Token::Eof).expect("push_token");
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <title>",
            "|       \"foo\"",
            "|   <body>",
        ]
    );
}

#[test]
fn script_requests_script_data_state() {
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    feed(&mut builder, vec![doctype("html")]);
    let step = builder.push_token(start("script")).expect("push_token");
    assert_eq!(
        step,
        TreeBuilderStepResult::SetTokenizerState(TokenizerState::ScriptData)
    );
}

#[test]
fn noah_ark_limits_reconstructed_duplicates() {
    let builder = run(vec![
        doctype("html"),
        start("p"),
        start("b"),
        start("b"),
        start("b"),
        start("b"),
        end("p"),
        text("x"),
    ]);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       <b>",
            "|         <b>",
            "|           <b>",
            "|             <b>",
            "|     <b>",
            "|       <b>",
            "|         <b>",
            "|           \"x\"",
        ]
    );
}

#[test]
fn unacknowledged_self_closing_flag_is_reported() {
    let builder = run(vec![
        doctype("html"),
        self_closing("br"),
        self_closing("div"),
        end("div"),
    ]);
    assert_eq!(
        codes(&builder),
        [ParseErrorCode::NonVoidElementWithTrailingSolidus]
    );
    assert_eq!(builder.errors()[0].name.as_deref(), Some("div"));
}

#[test]
fn tokens_after_eof_are_rejected() {
    let mut builder = run(vec![doctype("html")]);
    assert_eq!(
        builder.push_token(text("late")),
        Err(TreeBuilderError::TokenAfterEof)
    );
    assert_eq!(
        builder.set_fragment_context("div"),
        Err(TreeBuilderError::FragmentContextAfterStart)
    );
}

#[test]
fn missing_doctype_selects_quirks_mode() {
    let builder = run(vec![start("p"), start("table")]);
    assert_eq!(builder.quirks_mode(), QuirksMode::Quirks);
    // In quirks mode <table> does not close an open <p>.
    assert_eq!(
        dump(builder),
        [
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       <table>",
        ]
    );
}

#[test]
fn svg_content_is_adjusted_and_breaks_out() {
    let mut circle = start_with("circle", &[("viewbox", "0 0 1 1")]);
    if let Token::StartTag { self_closing, .. } = &mut circle {
        *self_closing = true;
    }
    let builder = run(vec![
        doctype("html"),
        start("svg"),
        start("foreignobject"),
        end("foreignobject"),
        circle,
        start("p"),
        text("after"),
    ]);
    assert_eq!(
        codes(&builder),
        [ParseErrorCode::UnexpectedHtmlElementInForeignContent]
    );
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       <svg foreignObject>",
            "|       <svg circle>",
            "|         viewBox=\"0 0 1 1\"",
            "|     <p>",
            "|       \"after\"",
        ]
    );
}

#[test]
fn cdata_is_allowed_only_in_foreign_content() {
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    feed(&mut builder, vec![doctype("html"), start("math")]);
    assert!(builder.is_cdata_section_allowed());
    feed(&mut builder, vec![end("math")]);
    assert!(!builder.is_cdata_section_allowed());
}

#[test]
fn nul_is_dropped_in_body_and_replaced_in_foreign_content() {
    let builder = run(vec![
        doctype("html"),
        text("a\0b"),
        start("svg"),
        text("c\0d"),
        end("svg"),
    ]);
    assert_eq!(
        codes(&builder),
        [ParseErrorCode::InvalidCodepoint, ParseErrorCode::InvalidCodepoint]
    );
    assert_eq!(builder.into_sink().into_node().text_content(), "abc\u{FFFD}d");
}

#[test]
fn select_options_close_each_other() {
    let builder = run(vec![
        doctype("html"),
        start("select"),
        start("option"),
        text("a"),
        start("option"),
        text("b"),
        end("select"),
        text("c"),
    ]);
    assert!(builder.errors().is_empty(), "{:?}", builder.errors());
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <option>",
            "|         \"a\"",
            "|       <option>",
            "|         \"b\"",
            "|     \"c\"",
        ]
    );
}

#[test]
fn select_inside_table_closes_on_cell_tags() {
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    feed(
        &mut builder,
        vec![
            doctype("html"),
            start("table"),
            start("tr"),
            start("td"),
            start("select"),
        ],
    );
    assert_eq!(builder.insertion_mode(), InsertionMode::InSelectInTable);
    feed(&mut builder, vec![start("td")]);
    // The select and the first cell close; the new cell opens.
    assert_eq!(builder.insertion_mode(), InsertionMode::InCell);
    assert_eq!(
        codes(&builder),
        [ParseErrorCode::UnexpectedTableElementStartTagInSelectInTable]
    );
}

#[test]
fn frameset_replaces_body() {
    let builder = run(vec![
        doctype("html"),
        start("html"),
        start("head"),
        end("head"),
        start("frameset"),
        self_closing("frame"),
        end("frameset"),
        end("html"),
    ]);
    assert!(builder.errors().is_empty(), "{:?}", builder.errors());
    assert_eq!(builder.insertion_mode(), InsertionMode::AfterAfterFrameset);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <frameset>",
            "|     <frame>",
        ]
    );
}

#[test]
fn comments_after_html_attach_to_document() {
    let builder = run(vec![
        doctype("html"),
        start("body"),
        end("body"),
        Token::Comment {
            text: "in html".to_string(),
        },
        end("html"),
        Token::Comment {
            text: "in document".to_string(),
        },
    ]);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|   <!-- in html -->",
            "| <!-- in document -->",
        ]
    );
}

#[test]
fn textarea_skips_one_leading_newline() {
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    feed(&mut builder, vec![doctype("html")]);
    let step = builder.push_token(start("textarea")).expect("push_token");
    assert_eq!(step, TreeBuilderStepResult::SetTokenizerState(TokenizerState::Rcdata));
    feed(
        &mut builder,
        vec![text("\n\nx"), end("textarea"), Token::Eof],
    );
    assert_eq!(builder.into_sink().into_node().text_content(), "\nx");
}

#[test]
fn isindex_expands_to_a_search_form() {
    let builder = run(vec![
        doctype("html"),
        start_with("isindex", &[("prompt", "Find: "), ("action", "/s")]),
    ]);
    assert_eq!(codes(&builder), [ParseErrorCode::DeprecatedTag]);
    assert_eq!(
        dump(builder),
        [
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <form>",
            "|       action=\"/s\"",
            "|       <hr>",
            "|       <label>",
            "|         \"Find: \"",
            "|         <input>",
            "|           name=\"isindex\"",
            "|       <hr>",
        ]
    );
}

#[test]
fn duplicate_html_attributes_merge_into_root() {
    let builder = run(vec![
        doctype("html"),
        start_with("html", &[("lang", "en")]),
        start("body"),
        start_with("html", &[("lang", "fr"), ("dir", "ltr")]),
    ]);
    assert_eq!(codes(&builder), [ParseErrorCode::NonHtmlRoot]);
    assert_eq!(
        &dump(builder)[1..4],
        ["| <html>", "|   dir=\"ltr\"", "|   lang=\"en\""].map(String::from)
    );
}

#[test]
fn ignore_policy_counts_but_does_not_keep_errors() {
    let config = TreeBuilderConfig {
        error_policy: ErrorPolicy::Ignore,
        ..TreeBuilderConfig::default()
    };
    let mut builder = builder_with(config, None);
    feed(&mut builder, vec![start("p"), Token::Eof]);
    assert!(builder.errors().is_empty());
    assert_eq!(builder.counters().parse_errors, 1);
}

#[test]
fn tracked_errors_are_capped() {
    let config = TreeBuilderConfig {
        max_tracked_errors: 2,
        ..TreeBuilderConfig::default()
    };
    let mut builder = builder_with(config, None);
    feed(&mut builder, vec![doctype("html")]);
    for _ in 0..5 {
        builder.push_token(end("nope")).expect("push_token");
    }
    assert_eq!(builder.errors().len(), 2);
    assert_eq!(builder.counters().parse_errors, 5);
}

#[test]
fn errors_carry_the_host_position() {
    let mut builder = builder_with(TreeBuilderConfig::default(), None);
    builder.set_position(42);
    builder.push_token(start("p")).expect("push_token");
    assert_eq!(builder.errors()[0].position, 42);
    assert_eq!(
        builder.errors()[0].to_string(),
        "expected-doctype-but-got-start-tag (p) at 42"
    );
}

#[test]
fn counters_track_depth_and_tokens() {
    let builder = run(vec![
        doctype("html"),
        start("div"),
        start("div"),
        start("b"),
        start("i"),
    ]);
    let counters = builder.counters();
    assert_eq!(counters.tokens_processed, 6);
    assert_eq!(counters.max_open_elements, 6);
    assert_eq!(counters.max_active_formatting, 2);
}
