//! Retained DOM built by the tree builder: an arena of nodes with parent links
//! and ordered child lists, convertible into an owned [`Node`] tree.

use crate::dom_patch::{DomPatch, PatchKey};
use crate::html5::shared::{Attribute, Namespace};
use crate::html5::tree_builder::{QuirksMode, TreeSink};
use crate::types::{Id, Node};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
enum NodeData {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element {
        namespace: Namespace,
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug)]
struct ArenaNode {
    parent: Option<Id>,
    children: Vec<Id>,
    data: NodeData,
}

/// Arena DOM implementing [`TreeSink`]. Adjacent text inserted through the
/// sink is always coalesced into one text node.
#[derive(Debug)]
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    quirks_mode: QuirksMode,
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Patch stream that cannot be replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchApplyError {
    MissingDocument,
    DuplicateKey(PatchKey),
    UnknownKey(PatchKey),
    NotAText(PatchKey),
    NotAnElement(PatchKey),
    NotAChild { parent: PatchKey, child: PatchKey },
}

impl fmt::Display for PatchApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchApplyError::MissingDocument => {
                f.write_str("patch stream does not start with CreateDocument")
            }
            PatchApplyError::DuplicateKey(key) => write!(f, "key {} created twice", key.0),
            PatchApplyError::UnknownKey(key) => write!(f, "unknown key {}", key.0),
            PatchApplyError::NotAText(key) => write!(f, "key {} is not a text node", key.0),
            PatchApplyError::NotAnElement(key) => write!(f, "key {} is not an element", key.0),
            PatchApplyError::NotAChild { parent, child } => {
                write!(f, "key {} is not a child of key {}", child.0, parent.0)
            }
        }
    }
}

impl std::error::Error for PatchApplyError {}

impl ArenaDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![ArenaNode {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            quirks_mode: QuirksMode::NoQuirks,
        }
    }

    pub fn document_id(&self) -> Id {
        Id(0)
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.node(id).parent
    }

    pub fn children(&self, id: Id) -> &[Id] {
        &self.node(id).children
    }

    /// Local name of an element node.
    pub fn element_name(&self, id: Id) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    fn node(&self, id: Id) -> &ArenaNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: Id) -> &mut ArenaNode {
        &mut self.nodes[id.0 as usize]
    }

    fn push(&mut self, data: NodeData) -> Id {
        let id = Id(self.nodes.len() as u32);
        self.nodes.push(ArenaNode {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn unlink(&mut self, id: Id) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&child| child != id);
        }
    }

    fn append(&mut self, parent: Id, child: Id) {
        self.unlink(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    fn insert_before(&mut self, parent: Id, child: Id, before: Id) {
        self.unlink(child);
        let siblings = &mut self.node_mut(parent).children;
        let index = siblings
            .iter()
            .position(|&sibling| sibling == before)
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Appends `data` to `id` if it is a text node.
    fn extend_text(&mut self, id: Option<Id>, data: &str) -> bool {
        let Some(id) = id else {
            return false;
        };
        match &mut self.node_mut(id).data {
            NodeData::Text(text) => {
                text.push_str(data);
                true
            }
            _ => false,
        }
    }

    fn merge_attributes(&mut self, id: Id, attrs: &[Attribute]) -> bool {
        let NodeData::Element { attributes, .. } = &mut self.node_mut(id).data else {
            return false;
        };
        for attr in attrs {
            if !attributes.iter().any(|existing| existing.name == attr.name) {
                attributes.push(attr.clone());
            }
        }
        true
    }

    /// Replays a patch stream produced by [`PatchTreeSink`].
    ///
    /// [`PatchTreeSink`]: crate::html5::tree_builder::PatchTreeSink
    pub fn from_patches(patches: &[DomPatch]) -> Result<Self, PatchApplyError> {
        let mut dom = ArenaDom::new();
        let mut keys: HashMap<PatchKey, Id> = HashMap::new();
        let mut patches = patches.iter();
        match patches.next() {
            Some(DomPatch::CreateDocument { key }) => {
                keys.insert(*key, dom.document_id());
            }
            _ => return Err(PatchApplyError::MissingDocument),
        }
        let lookup = |keys: &HashMap<PatchKey, Id>, key: &PatchKey| {
            keys.get(key)
                .copied()
                .ok_or(PatchApplyError::UnknownKey(*key))
        };
        for patch in patches {
            let created = match patch {
                DomPatch::CreateDocument { key } => {
                    return Err(PatchApplyError::DuplicateKey(*key));
                }
                DomPatch::CreateDoctype {
                    key,
                    name,
                    public_id,
                    system_id,
                } => Some((
                    *key,
                    NodeData::Doctype {
                        name: name.clone(),
                        public_id: public_id.clone(),
                        system_id: system_id.clone(),
                    },
                )),
                DomPatch::CreateElement {
                    key,
                    namespace,
                    name,
                    attributes,
                } => Some((
                    *key,
                    NodeData::Element {
                        namespace: *namespace,
                        name: name.clone(),
                        attributes: attributes.clone(),
                    },
                )),
                DomPatch::CreateText { key, text } => Some((*key, NodeData::Text(text.clone()))),
                DomPatch::CreateComment { key, text } => {
                    Some((*key, NodeData::Comment(text.clone())))
                }
                DomPatch::AppendChild { parent, child } => {
                    let (parent, child) = (lookup(&keys, parent)?, lookup(&keys, child)?);
                    dom.append(parent, child);
                    None
                }
                DomPatch::InsertBefore {
                    parent: parent_key,
                    child,
                    before: before_key,
                } => {
                    let parent = lookup(&keys, parent_key)?;
                    let child = lookup(&keys, child)?;
                    let before = lookup(&keys, before_key)?;
                    if dom.node(before).parent != Some(parent) {
                        return Err(PatchApplyError::NotAChild {
                            parent: *parent_key,
                            child: *before_key,
                        });
                    }
                    dom.insert_before(parent, child, before);
                    None
                }
                DomPatch::Detach { key } => {
                    let id = lookup(&keys, key)?;
                    dom.unlink(id);
                    None
                }
                DomPatch::MoveChildren { from, to } => {
                    let (from, to) = (lookup(&keys, from)?, lookup(&keys, to)?);
                    dom.reparent_children(&from, &to);
                    None
                }
                DomPatch::MergeAttributes { key, attributes } => {
                    let id = lookup(&keys, key)?;
                    if !dom.merge_attributes(id, attributes) {
                        return Err(PatchApplyError::NotAnElement(*key));
                    }
                    None
                }
                DomPatch::SetText { key, text } => {
                    let id = lookup(&keys, key)?;
                    match &mut dom.node_mut(id).data {
                        NodeData::Text(existing) => *existing = text.clone(),
                        _ => return Err(PatchApplyError::NotAText(*key)),
                    }
                    None
                }
                DomPatch::SetCompatMode { mode } => {
                    dom.quirks_mode = *mode;
                    None
                }
            };
            if let Some((key, data)) = created {
                if key == PatchKey::INVALID || keys.contains_key(&key) {
                    return Err(PatchApplyError::DuplicateKey(key));
                }
                let id = dom.push(data);
                keys.insert(key, id);
            }
        }
        Ok(dom)
    }

    /// Converts the arena into an owned tree rooted at the document.
    ///
    /// Detached subtrees are dropped. Node ids are arena indices.
    pub fn into_node(self) -> Node {
        let root = self.document_id();
        self.into_subtree(root)
    }

    /// Children of the fragment root (the synthetic `html` element created
    /// for fragment parsing).
    pub fn fragment_children(self) -> Vec<Node> {
        let root = self
            .children(self.document_id())
            .iter()
            .copied()
            .find(|&child| self.element_name(child) == Some("html"));
        let Some(root) = root else {
            return Vec::new();
        };
        match self.into_subtree(root) {
            Node::Element { children, .. } => children,
            _ => Vec::new(),
        }
    }

    fn into_subtree(self, root: Id) -> Node {
        let quirks_mode = self.quirks_mode;
        let mut nodes = self.nodes;
        let mut built: Vec<Node> = Vec::with_capacity(nodes.len());

        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let children = built.split_off(built.len() - n);
            debug_assert_eq!(children.len(), n);
            children
        }

        // Iterative post-order walk: a node is built once all of its children
        // sit, in order, at the end of `built`.
        let mut stack: Vec<(Id, bool)> = vec![(root, false)];
        while let Some((id, visited)) = stack.pop() {
            let index = id.0 as usize;
            if !visited {
                stack.push((id, true));
                for &child in nodes[index].children.iter().rev() {
                    stack.push((child, false));
                }
                continue;
            }
            let child_count = nodes[index].children.len();
            let node = match &mut nodes[index].data {
                NodeData::Document => Node::Document {
                    id,
                    quirks_mode,
                    children: take_children(child_count, &mut built),
                },
                NodeData::Doctype {
                    name,
                    public_id,
                    system_id,
                } => Node::Doctype {
                    id,
                    name: std::mem::take(name),
                    public_id: std::mem::take(public_id),
                    system_id: std::mem::take(system_id),
                },
                NodeData::Element {
                    namespace,
                    name,
                    attributes,
                } => Node::Element {
                    id,
                    namespace: *namespace,
                    name: name.clone(),
                    attributes: std::mem::take(attributes),
                    children: take_children(child_count, &mut built),
                },
                NodeData::Text(text) => Node::Text {
                    id,
                    text: std::mem::take(text),
                },
                NodeData::Comment(text) => Node::Comment {
                    id,
                    text: std::mem::take(text),
                },
            };
            built.push(node);
        }

        assert_eq!(built.len(), 1, "dom builder should build exactly one root node");
        built.remove(0)
    }
}

impl TreeSink for ArenaDom {
    type Handle = Id;

    fn document(&mut self) -> Id {
        self.document_id()
    }

    fn create_element(
        &mut self,
        namespace: Namespace,
        local_name: &str,
        attrs: &[Attribute],
    ) -> Id {
        self.push(NodeData::Element {
            namespace,
            name: Arc::from(local_name),
            attributes: attrs.to_vec(),
        })
    }

    fn attach_node(&mut self, child: &Id, parent: &Id) {
        self.append(*parent, *child);
    }

    fn attach_node_to_foster_parent(&mut self, child: &Id, table: &Id, stack_parent: &Id) {
        match self.node(*table).parent {
            Some(parent) => self.insert_before(parent, *child, *table),
            None => self.append(*stack_parent, *child),
        }
    }

    fn detach_from_parent(&mut self, node: &Id) {
        self.unlink(*node);
    }

    fn add_attributes_to_element(&mut self, element: &Id, attrs: &[Attribute]) {
        let merged = self.merge_attributes(*element, attrs);
        debug_assert!(merged, "attributes merged into a non-element node");
    }

    fn insert_comment(&mut self, data: &str, parent: &Id) {
        let id = self.push(NodeData::Comment(data.to_string()));
        self.append(*parent, id);
    }

    fn insert_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        let id = self.push(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
        self.append(self.document_id(), id);
    }

    fn insert_text(&mut self, data: &str, parent: &Id) {
        let last = self.node(*parent).children.last().copied();
        if self.extend_text(last, data) {
            return;
        }
        let id = self.push(NodeData::Text(data.to_string()));
        self.append(*parent, id);
    }

    fn insert_text_to_foster_parent(&mut self, data: &str, table: &Id, stack_parent: &Id) {
        let Some(parent) = self.node(*table).parent else {
            self.insert_text(data, stack_parent);
            return;
        };
        let siblings = &self.node(parent).children;
        let previous = siblings
            .iter()
            .position(|sibling| sibling == table)
            .and_then(|index| index.checked_sub(1))
            .map(|index| siblings[index]);
        if self.extend_text(previous, data) {
            return;
        }
        let id = self.push(NodeData::Text(data.to_string()));
        self.insert_before(parent, id, *table);
    }

    fn reparent_children(&mut self, old_parent: &Id, new_parent: &Id) {
        let moved = std::mem::take(&mut self.node_mut(*old_parent).children);
        for &child in &moved {
            self.node_mut(child).parent = Some(*new_parent);
        }
        self.node_mut(*new_parent).children.extend(moved);
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_node_survives_deep_nesting() {
        let depth: usize = 10_000;
        let mut dom = ArenaDom::new();
        let mut parent = dom.document_id();
        for _ in 0..depth {
            let div = dom.create_element(Namespace::Html, "div", &[]);
            dom.attach_node(&div, &parent);
            parent = div;
        }

        let root = dom.into_node();
        let mut current = &root;
        let mut seen = 0usize;
        loop {
            match current {
                Node::Document { children, .. } => {
                    assert_eq!(children.len(), 1);
                    current = &children[0];
                }
                Node::Element { name, children, .. } => {
                    assert_eq!(&**name, "div");
                    seen += 1;
                    if seen == depth {
                        assert!(children.is_empty());
                        break;
                    }
                    assert_eq!(children.len(), 1);
                    current = &children[0];
                }
                _ => panic!("unexpected leaf node before reaching depth"),
            }
        }
    }

    #[test]
    fn adjacent_text_is_coalesced() {
        let mut dom = ArenaDom::new();
        let body = dom.create_element(Namespace::Html, "body", &[]);
        dom.attach_node(&body, &dom.document_id());
        dom.insert_text("a", &body);
        dom.insert_text("b", &body);
        assert_eq!(dom.children(body).len(), 1);
        assert_eq!(dom.into_node().text_content(), "ab");
    }

    #[test]
    fn foster_text_merges_with_previous_sibling() {
        let mut dom = ArenaDom::new();
        let body = dom.create_element(Namespace::Html, "body", &[]);
        let table = dom.create_element(Namespace::Html, "table", &[]);
        dom.attach_node(&body, &dom.document_id());
        dom.attach_node(&table, &body);
        dom.insert_text_to_foster_parent("x", &table, &body);
        dom.insert_text_to_foster_parent("y", &table, &body);
        let children = dom.children(body).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1], table);
    }

    #[test]
    fn merge_attributes_keeps_existing_values() {
        let mut dom = ArenaDom::new();
        let html = dom.create_element(Namespace::Html, "html", &[Attribute::new("lang", "en")]);
        dom.attach_node(&html, &dom.document_id());
        dom.add_attributes_to_element(
            &html,
            &[Attribute::new("lang", "fr"), Attribute::new("dir", "ltr")],
        );
        let root = dom.into_node();
        let Node::Element { attributes, .. } = &root.children()[0] else {
            panic!("expected html element");
        };
        assert_eq!(
            attributes,
            &vec![Attribute::new("lang", "en"), Attribute::new("dir", "ltr")]
        );
    }

    #[test]
    fn reparent_children_moves_in_order() {
        let mut dom = ArenaDom::new();
        let a = dom.create_element(Namespace::Html, "a", &[]);
        let b = dom.create_element(Namespace::Html, "b", &[]);
        dom.insert_text("1", &a);
        dom.insert_comment("2", &a);
        dom.reparent_children(&a, &b);
        assert!(dom.children(a).is_empty());
        assert_eq!(dom.children(b).len(), 2);
        assert_eq!(dom.parent(dom.children(b)[0]), Some(b));
    }

    #[test]
    fn from_patches_rejects_stream_without_document() {
        let patches = [DomPatch::CreateText {
            key: PatchKey(1),
            text: "x".to_string(),
        }];
        assert_eq!(
            ArenaDom::from_patches(&patches).err(),
            Some(PatchApplyError::MissingDocument)
        );
    }

    #[test]
    fn from_patches_rejects_unknown_keys() {
        let patches = [
            DomPatch::CreateDocument { key: PatchKey(1) },
            DomPatch::AppendChild {
                parent: PatchKey(1),
                child: PatchKey(7),
            },
        ];
        assert_eq!(
            ArenaDom::from_patches(&patches).err(),
            Some(PatchApplyError::UnknownKey(PatchKey(7)))
        );
    }
}
