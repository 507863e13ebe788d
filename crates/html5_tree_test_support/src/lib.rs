//! Shared helpers for tree-construction tests, fixtures and benches.

use html5_tree::ArenaDom;
use html5_tree::dom_snapshot::DomSnapshot;
use html5_tree::html5::{
    Html5TreeBuilder, ParseError, QuirksMode, Token, TreeBuilderConfig, TreeBuilderError,
    TreeBuilderStepResult, TreeSink,
};

pub mod fixtures;
pub mod markup;

pub use markup::{MarkupTokenizer, tokenize};

/// Result of parsing markup into an [`ArenaDom`].
#[derive(Debug)]
pub struct ParseOutput {
    /// html5lib-style dump, one node or attribute per line.
    pub lines: Vec<String>,
    pub errors: Vec<ParseError>,
    pub quirks_mode: QuirksMode,
}

impl ParseOutput {
    pub fn error_codes(&self) -> Vec<&'static str> {
        self.errors.iter().map(|error| error.code.as_str()).collect()
    }
}

/// Tokenizes `input` and feeds it to `builder`, honouring tokenizer state
/// switches and CDATA permission after every token.
pub fn drive<S: TreeSink>(
    builder: &mut Html5TreeBuilder<S>,
    input: &str,
    context: Option<&str>,
) -> Result<(), TreeBuilderError> {
    let mut tokenizer = MarkupTokenizer::new(input);
    if let Some(context) = context {
        builder.set_fragment_context(context)?;
        tokenizer.set_last_start_tag(context);
        tokenizer.set_state(builder.initial_tokenizer_state());
    }
    tokenizer.set_cdata_allowed(builder.is_cdata_section_allowed());
    while let Some(token) = tokenizer.next_token() {
        builder.set_position(tokenizer.token_start());
        if let TreeBuilderStepResult::SetTokenizerState(state) = builder.push_token(token)? {
            tokenizer.set_state(state);
        }
        tokenizer.set_cdata_allowed(builder.is_cdata_section_allowed());
    }
    Ok(())
}

/// Feeds pre-built tokens, appending `Eof` when the sequence lacks one.
pub fn drive_tokens<S: TreeSink>(
    builder: &mut Html5TreeBuilder<S>,
    tokens: impl IntoIterator<Item = Token>,
) -> Result<(), TreeBuilderError> {
    let mut saw_eof = false;
    for token in tokens {
        saw_eof = matches!(token, Token::Eof);
        builder.push_token(token)?;
        if saw_eof {
            break;
        }
    }
    if !saw_eof {
        builder.push_token(Token::Eof)?;
    }
    Ok(())
}

pub fn parse_document(input: &str) -> ParseOutput {
    parse_document_with(TreeBuilderConfig::default(), input)
}

pub fn parse_document_with(config: TreeBuilderConfig, input: &str) -> ParseOutput {
    let mut builder = Html5TreeBuilder::new(config, ArenaDom::new());
    drive(&mut builder, input, None).unwrap_or_else(|err| panic!("parse failed: {err}"));
    let errors = builder.errors().to_vec();
    let quirks_mode = builder.quirks_mode();
    let dom = builder.into_sink();
    ParseOutput {
        lines: snapshot_lines(&DomSnapshot::document(&dom.into_node())),
        errors,
        quirks_mode,
    }
}

pub fn parse_fragment(context: &str, input: &str) -> ParseOutput {
    parse_fragment_with(TreeBuilderConfig::default(), context, input)
}

pub fn parse_fragment_with(config: TreeBuilderConfig, context: &str, input: &str) -> ParseOutput {
    let mut builder = Html5TreeBuilder::new(config, ArenaDom::new());
    drive(&mut builder, input, Some(context))
        .unwrap_or_else(|err| panic!("fragment parse failed: {err}"));
    let errors = builder.errors().to_vec();
    let quirks_mode = builder.quirks_mode();
    let dom = builder.into_sink();
    ParseOutput {
        lines: snapshot_lines(&DomSnapshot::fragment(&dom.fragment_children())),
        errors,
        quirks_mode,
    }
}

/// Dump lines with embedded newlines split out, matching how fixture
/// documents are read.
pub fn snapshot_lines(snapshot: &DomSnapshot) -> Vec<String> {
    snapshot
        .render()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end().to_string())
        .collect()
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the first mismatching line of two dumps with two lines of context.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;
    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let line_at = |lines: &[String], index: usize| {
        lines.get(index).map(String::as_str).unwrap_or(missing).to_string()
    };
    let mismatch = (0..max).find(|&i| line_at(expected, i) != line_at(actual, i));
    let mut out = String::new();
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let marker = if line_idx == i { ">" } else { " " };
            let left = escape_text(&line_at(expected, line_idx));
            let right = escape_text(&line_at(actual, line_idx));
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_document_builds_implied_structure() {
        let output = parse_document("<!DOCTYPE html><p>One<p>Two");
        assert_eq!(
            output.lines,
            [
                "| <!DOCTYPE html>",
                "| <html>",
                "|   <head>",
                "|   <body>",
                "|     <p>",
                "|       \"One\"",
                "|     <p>",
                "|       \"Two\"",
            ]
        );
        assert_eq!(output.quirks_mode, QuirksMode::NoQuirks);
        // An open <p> may be left unclosed at end of file.
        assert!(output.errors.is_empty(), "{:?}", output.errors);
    }

    #[test]
    fn title_switches_tokenizer_to_rcdata() {
        let output = parse_document("<!DOCTYPE html><title>a<b>&amp;</title>");
        assert!(output.lines.contains(&"|       \"a<b>&\"".to_string()));
        assert!(output.errors.is_empty());
    }

    #[test]
    fn diff_points_at_first_mismatch() {
        let expected = vec!["a".to_string(), "b".to_string()];
        let actual = vec!["a".to_string(), "c".to_string()];
        let diff = diff_lines(&expected, &actual);
        assert!(diff.contains("first mismatch at line 2"), "{diff}");
    }
}
