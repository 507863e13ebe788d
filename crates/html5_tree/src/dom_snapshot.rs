use crate::Node;
use crate::html5::shared::{Attribute, Namespace};
use std::fmt;

/// Deterministic tree dump in the html5lib tree-construction test format.
/// Intended for test comparisons, not a stable public format.
///
/// ```text
/// | <!DOCTYPE html>
/// | <html>
/// |   <head>
/// |   <body>
/// |     <svg svg>
/// |       xlink href="#a"
/// |     "text"
/// ```
///
/// Rules:
/// - Two spaces of indent per depth level after the `| ` prefix.
/// - Foreign elements are prefixed with their namespace short name.
/// - Attributes follow their element one level deeper, sorted by displayed
///   name; namespaced attributes print as `prefix name`.
/// - Text and comments are written verbatim.
#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    /// Dumps the children of a document node.
    pub fn document(root: &Node) -> Self {
        Self::fragment(root.children())
    }

    /// Dumps a list of top-level nodes, e.g. fragment parsing output.
    pub fn fragment(nodes: &[Node]) -> Self {
        let mut lines = Vec::new();
        let mut stack: Vec<(&Node, usize)> = nodes.iter().rev().map(|node| (node, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            write_node(node, depth, &mut lines);
            stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn prefix(depth: usize) -> String {
    const INDENT_STEP: usize = 2;
    let mut line = String::from("| ");
    line.push_str(&" ".repeat(depth.saturating_mul(INDENT_STEP)));
    line
}

fn write_node(node: &Node, depth: usize, out: &mut Vec<String>) {
    let mut line = prefix(depth);
    match node {
        Node::Document { .. } => line.push_str("#document"),
        Node::Doctype {
            name,
            public_id,
            system_id,
            ..
        } => {
            line.push_str("<!DOCTYPE ");
            line.push_str(name);
            if !public_id.is_empty() || !system_id.is_empty() {
                line.push_str(&format!(" \"{public_id}\" \"{system_id}\""));
            }
            line.push('>');
        }
        Node::Element {
            namespace,
            name,
            attributes,
            ..
        } => {
            line.push('<');
            if *namespace != Namespace::Html {
                line.push_str(namespace.short_name());
                line.push(' ');
            }
            line.push_str(name);
            line.push('>');
            out.push(line);
            let mut attrs: Vec<(String, &str)> = attributes
                .iter()
                .map(|attr| (attribute_label(attr), attr.value.as_str()))
                .collect();
            attrs.sort_by(|a, b| a.0.cmp(&b.0));
            for (label, value) in attrs {
                let mut attr_line = prefix(depth + 1);
                attr_line.push_str(&format!("{label}=\"{value}\""));
                out.push(attr_line);
            }
            return;
        }
        Node::Text { text, .. } => {
            line.push('"');
            line.push_str(text);
            line.push('"');
        }
        Node::Comment { text, .. } => {
            line.push_str("<!-- ");
            line.push_str(text);
            line.push_str(" -->");
        }
    }
    out.push(line);
}

fn attribute_label(attr: &Attribute) -> String {
    match attr.namespace {
        Some(namespace) => format!("{} {}", namespace.short_name(), attr.name),
        None => attr.name.clone(),
    }
}
