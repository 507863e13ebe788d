//! TOML tree-construction fixtures.
//!
//! A fixture file holds any number of `[[case]]` tables:
//!
//! ```toml
//! [[case]]
//! name = "implied-html-head-body"
//! input = "<p>One"
//! errors = ["expected-doctype-but-got-start-tag", "expected-closing-tag-but-got-eof"]
//! compat = "quirks"
//! document = """
//! | <html>
//! |   <head>
//! |   <body>
//! |     <p>
//! |       "One"
//! """
//! ```
//!
//! `context` switches the case to fragment parsing; `errors` and `compat` are
//! only checked when present.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
struct FixtureFile {
    #[serde(default, rename = "case")]
    cases: Vec<RawCase>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCase {
    name: String,
    input: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    scripting: bool,
    #[serde(default)]
    errors: Option<Vec<String>>,
    #[serde(default)]
    compat: Option<String>,
    document: String,
}

#[derive(Clone, Debug)]
pub struct FixtureCase {
    /// `file-stem/case-name`, unique across a fixture directory.
    pub name: String,
    pub input: String,
    pub context: Option<String>,
    pub scripting: bool,
    pub errors: Option<Vec<String>>,
    pub compat: Option<String>,
    pub expected: Vec<String>,
}

pub fn load_fixture_file(path: &Path) -> Vec<FixtureCase> {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read fixture file {path:?}: {err}"));
    let file: FixtureFile = toml::from_str(&source)
        .unwrap_or_else(|err| panic!("failed to parse fixture file {path:?}: {err}"));
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("fixtures");
    file.cases
        .into_iter()
        .map(|raw| FixtureCase {
            name: format!("{stem}/{}", raw.name),
            input: raw.input,
            context: raw.context,
            scripting: raw.scripting,
            errors: raw.errors,
            compat: raw.compat,
            expected: expected_lines(&raw.document),
        })
        .collect()
}

/// Loads every `*.toml` file under `dir`, sorted by file name.
pub fn load_fixture_dir(dir: &Path) -> Vec<FixtureCase> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read fixture dir {dir:?}: {err}"))
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    let mut cases = Vec::new();
    for path in paths {
        cases.extend(load_fixture_file(&path));
    }
    let mut names: Vec<&str> = cases.iter().map(|case| case.name.as_str()).collect();
    names.sort_unstable();
    if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
        panic!("duplicate fixture name '{}' in {dir:?}", pair[0]);
    }
    cases
}

fn expected_lines(document: &str) -> Vec<String> {
    document
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end().to_string())
        .collect()
}
