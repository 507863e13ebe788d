//! Namespaces recognised by the tree builder.

/// Element/attribute namespace.
///
/// Only the namespaces the HTML parsing algorithm can produce are modelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    MathMl,
    Svg,
    XLink,
    Xml,
    Xmlns,
}

impl Namespace {
    pub fn url(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::XLink => "http://www.w3.org/1999/xlink",
            Namespace::Xml => "http://www.w3.org/XML/1998/namespace",
            Namespace::Xmlns => "http://www.w3.org/2000/xmlns/",
        }
    }

    /// Short name used in tree dumps (`<svg path>`, `xlink href="..."`).
    pub fn short_name(self) -> &'static str {
        match self {
            Namespace::Html => "html",
            Namespace::MathMl => "math",
            Namespace::Svg => "svg",
            Namespace::XLink => "xlink",
            Namespace::Xml => "xml",
            Namespace::Xmlns => "xmlns",
        }
    }

    pub fn from_url(url: &str) -> Option<Self> {
        [
            Namespace::Html,
            Namespace::MathMl,
            Namespace::Svg,
            Namespace::XLink,
            Namespace::Xml,
            Namespace::Xmlns,
        ]
        .into_iter()
        .find(|ns| ns.url() == url)
    }
}
