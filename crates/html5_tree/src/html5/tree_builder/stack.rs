//! Stack of open elements.

use crate::html5::shared::{Attribute, Namespace};
use std::sync::Arc;

/// Stable identity of one stack item.
///
/// Items are cloned freely between the open-elements stack and the active
/// formatting list; identity comparisons go through this id, never through
/// the node handle or the element name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32);

/// Parsing-relevant facts about one open element plus the sink's node handle.
///
/// The item wraps but does not own the DOM node.
#[derive(Clone, Debug)]
pub struct StackItem<H> {
    id: ItemId,
    namespace: Namespace,
    local_name: Arc<str>,
    attributes: Arc<[Attribute]>,
    node: H,
}

impl<H> PartialEq for StackItem<H> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<H> Eq for StackItem<H> {}

impl<H> StackItem<H> {
    pub(crate) fn new(
        id: ItemId,
        namespace: Namespace,
        local_name: Arc<str>,
        attributes: Arc<[Attribute]>,
        node: H,
    ) -> Self {
        Self {
            id,
            namespace,
            local_name,
            attributes,
            node,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub(crate) fn local_name_arc(&self) -> &Arc<str> {
        &self.local_name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub(crate) fn attributes_arc(&self) -> &Arc<[Attribute]> {
        &self.attributes
    }

    pub fn node(&self) -> &H {
        &self.node
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// HTML-namespace element with the given local name.
    pub fn is_html(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && &*self.local_name == name
    }

    pub(crate) fn is_html_one_of(&self, names: &[&str]) -> bool {
        self.namespace == Namespace::Html && names.contains(&&*self.local_name)
    }

    /// Member of the HTML "special" category.
    pub fn is_special(&self) -> bool {
        let name = &*self.local_name;
        match self.namespace {
            Namespace::Html => SPECIAL_HTML.binary_search(&name).is_ok(),
            Namespace::MathMl => {
                matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
            }
            Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
            _ => false,
        }
    }

    pub fn is_numbered_header(&self) -> bool {
        self.is_html_one_of(&["h1", "h2", "h3", "h4", "h5", "h6"])
    }

    pub fn is_foster_parenting(&self) -> bool {
        self.is_html_one_of(&["table", "tbody", "tfoot", "thead", "tr"])
    }

    pub fn is_foreign(&self) -> bool {
        self.namespace != Namespace::Html
    }

    pub fn is_html_integration_point(&self) -> bool {
        match self.namespace {
            Namespace::MathMl => {
                if &*self.local_name != "annotation-xml" {
                    return false;
                }
                self.attribute("encoding").is_some_and(|encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                })
            }
            Namespace::Svg => matches!(&*self.local_name, "foreignObject" | "desc" | "title"),
            _ => false,
        }
    }

    pub fn is_mathml_text_integration_point(&self) -> bool {
        self.namespace == Namespace::MathMl
            && matches!(&*self.local_name, "mi" | "mo" | "mn" | "ms" | "mtext")
    }
}

// Sorted for binary search.
const SPECIAL_HTML: &[&str] = &[
    "address",
    "applet",
    "area",
    "article",
    "aside",
    "base",
    "basefont",
    "bgsound",
    "blockquote",
    "body",
    "br",
    "button",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dir",
    "div",
    "dl",
    "dt",
    "embed",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hgroup",
    "hr",
    "html",
    "iframe",
    "img",
    "input",
    "isindex",
    "li",
    "link",
    "listing",
    "main",
    "marquee",
    "menu",
    "menuitem",
    "meta",
    "nav",
    "noembed",
    "noframes",
    "noscript",
    "object",
    "ol",
    "p",
    "param",
    "plaintext",
    "pre",
    "script",
    "section",
    "select",
    "source",
    "style",
    "summary",
    "table",
    "tbody",
    "td",
    "textarea",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
    "wbr",
    "xmp",
];

/// Scope flavours of the HTML "has an element in scope" family.
///
/// They differ only in which elements stop the downward scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    /// HTML "in scope" baseline.
    Default,
    /// HTML "in list item scope".
    ListItem,
    /// HTML "in button scope".
    Button,
    /// HTML "in table scope".
    Table,
    /// HTML "in select scope". Inverted: everything except `optgroup` and
    /// `option` is a boundary.
    Select,
}

fn is_scope_boundary<H>(item: &StackItem<H>, kind: ScopeKind) -> bool {
    match kind {
        ScopeKind::Default => is_default_scope_marker(item),
        ScopeKind::ListItem => is_default_scope_marker(item) || item.is_html_one_of(&["ol", "ul"]),
        ScopeKind::Button => is_default_scope_marker(item) || item.is_html("button"),
        ScopeKind::Table => item.is_html_one_of(&["table", "html"]),
        ScopeKind::Select => !item.is_html_one_of(&["optgroup", "option"]),
    }
}

fn is_default_scope_marker<H>(item: &StackItem<H>) -> bool {
    let name = item.local_name();
    match item.namespace() {
        Namespace::Html => matches!(
            name,
            "applet" | "caption" | "html" | "marquee" | "object" | "table" | "td" | "th"
        ),
        Namespace::MathMl => {
            matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
        }
        Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// Stack of open elements (bottom = index 0 = root).
#[derive(Clone, Debug)]
pub(crate) struct ElementStack<H> {
    items: Vec<StackItem<H>>,
    root_node: Option<H>,
    head_element: Option<H>,
    max_depth: u32,
}

impl<H> Default for ElementStack<H> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            root_node: None,
            head_element: None,
            max_depth: 0,
        }
    }
}

impl<H: Clone> ElementStack<H> {
    pub(crate) fn push(&mut self, item: StackItem<H>) {
        self.items.push(item);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    pub(crate) fn push_html_element(&mut self, item: StackItem<H>) {
        self.root_node = Some(item.node().clone());
        self.push(item);
    }

    pub(crate) fn push_head_element(&mut self, item: StackItem<H>) {
        self.head_element = Some(item.node().clone());
        self.push(item);
    }

    /// Pops the current node. Popping an empty stack is a tree-builder bug.
    pub(crate) fn pop(&mut self) -> StackItem<H> {
        self.items
            .pop()
            .expect("pop from an empty stack of open elements")
    }

    /// Splices `item` out of the stack wherever it sits.
    ///
    /// Callers verify containment first; removing an absent item is a bug.
    pub(crate) fn remove(&mut self, item: &StackItem<H>) {
        let index = self.index_of(item);
        debug_assert!(index.is_some(), "removing an element that is not open");
        if let Some(index) = index {
            self.items.remove(index);
        }
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> StackItem<H> {
        self.items.remove(index)
    }

    pub(crate) fn insert_at(&mut self, index: usize, item: StackItem<H>) {
        self.items.insert(index, item);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    pub(crate) fn replace_at(&mut self, index: usize, item: StackItem<H>) {
        self.items[index] = item;
    }

    /// Pops until an HTML element named `local_name` has been popped
    /// (inclusive).
    ///
    /// Callers establish presence with a scope check first.
    pub(crate) fn pop_until_popped(&mut self, local_name: &str) -> StackItem<H> {
        self.remove_open_elements_until(|item| item.is_html(local_name))
    }

    /// Pops until `predicate` accepts a popped element and returns it.
    pub(crate) fn remove_open_elements_until(
        &mut self,
        mut predicate: impl FnMut(&StackItem<H>) -> bool,
    ) -> StackItem<H> {
        loop {
            let item = self.pop();
            if predicate(&item) {
                return item;
            }
        }
    }

    pub(crate) fn pop_until_table_scope_marker(&mut self) {
        self.pop_while_top(|item| !item.is_html_one_of(&["table", "html"]));
    }

    pub(crate) fn pop_until_table_body_scope_marker(&mut self) {
        self.pop_while_top(|item| !item.is_html_one_of(&["tbody", "tfoot", "thead", "html"]));
    }

    pub(crate) fn pop_until_table_row_scope_marker(&mut self) {
        self.pop_while_top(|item| !item.is_html_one_of(&["tr", "html"]));
    }

    fn pop_while_top(&mut self, predicate: impl Fn(&StackItem<H>) -> bool) {
        while self.items.last().is_some_and(&predicate) {
            self.items.pop();
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }
}

impl<H> ElementStack<H> {
    pub(crate) fn item(&self, index: usize) -> Option<&StackItem<H>> {
        self.items.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn top(&self) -> Option<&StackItem<H>> {
        self.items.last()
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &StackItem<H>> + '_ {
        self.items.iter()
    }

    pub(crate) fn contains(&self, item: &StackItem<H>) -> bool {
        self.index_of(item).is_some()
    }

    pub(crate) fn index_of(&self, item: &StackItem<H>) -> Option<usize> {
        self.items.iter().rposition(|open| open.id() == item.id())
    }

    /// Topmost HTML element with `local_name`.
    pub(crate) fn find_index(&self, local_name: &str) -> Option<usize> {
        self.items.iter().rposition(|item| item.is_html(local_name))
    }

    pub(crate) fn root_node(&self) -> Option<&H> {
        self.root_node.as_ref()
    }

    pub(crate) fn head_element(&self) -> Option<&H> {
        self.head_element.as_ref()
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn in_scope_where(&self, kind: ScopeKind, target: impl Fn(&StackItem<H>) -> bool) -> bool {
        for item in self.items.iter().rev() {
            if target(item) {
                return true;
            }
            if is_scope_boundary(item, kind) {
                return false;
            }
        }
        false
    }

    fn in_scope_of_kind(&self, local_name: &str, kind: ScopeKind) -> bool {
        self.in_scope_where(kind, |item| item.is_html(local_name))
    }

    /// Whether this exact element (not merely one with its name) is in scope.
    pub(crate) fn element_in_scope(&self, element: &StackItem<H>) -> bool {
        self.in_scope_where(ScopeKind::Default, |item| item.id() == element.id())
    }

    pub(crate) fn in_scope(&self, local_name: &str) -> bool {
        self.in_scope_of_kind(local_name, ScopeKind::Default)
    }

    pub(crate) fn in_list_item_scope(&self, local_name: &str) -> bool {
        self.in_scope_of_kind(local_name, ScopeKind::ListItem)
    }

    pub(crate) fn in_button_scope(&self, local_name: &str) -> bool {
        self.in_scope_of_kind(local_name, ScopeKind::Button)
    }

    pub(crate) fn in_table_scope(&self, local_name: &str) -> bool {
        self.in_scope_of_kind(local_name, ScopeKind::Table)
    }

    pub(crate) fn in_select_scope(&self, local_name: &str) -> bool {
        self.in_scope_of_kind(local_name, ScopeKind::Select)
    }

    pub(crate) fn has_numbered_header_element_in_scope(&self) -> bool {
        self.in_scope_where(ScopeKind::Default, StackItem::is_numbered_header)
    }
}

impl<H: Clone> ElementStack<H> {
    /// Lowest special element above `formatting` (the adoption agency's
    /// "furthest block"), or `None` when nothing special sits above it.
    pub(crate) fn furthest_block_for_formatting_element(
        &self,
        formatting: &StackItem<H>,
    ) -> Option<StackItem<H>> {
        let mut furthest_block = None;
        for item in self.items.iter().rev() {
            if item.id() == formatting.id() {
                break;
            }
            if item.is_special() {
                furthest_block = Some(item);
            }
        }
        furthest_block.cloned()
    }
}
