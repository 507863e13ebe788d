//! Patch emission: a [`TreeSink`] that records every tree mutation as a
//! [`DomPatch`] instead of building nodes itself.

use super::modes::QuirksMode;
use super::sink::TreeSink;
use crate::dom_patch::{DomPatch, PatchKey};
use crate::html5::shared::{Attribute, Namespace};
use std::sync::Arc;

/// Patch sink for streaming emission.
pub trait PatchSink {
    fn push(&mut self, patch: DomPatch);

    /// Prefer `push_many` / `extend_owned` in hot paths to avoid per-item cloning.
    fn extend(&mut self, patches: &[DomPatch]) {
        for patch in patches {
            self.push(patch.clone());
        }
    }

    fn extend_owned(&mut self, mut patches: Vec<DomPatch>) {
        self.push_many(&mut patches);
    }

    fn push_many(&mut self, patches: &mut Vec<DomPatch>) {
        for patch in patches.drain(..) {
            self.push(patch);
        }
    }
}

/// Patch sink that buffers into a Vec.
pub struct VecPatchSink<'a>(pub &'a mut Vec<DomPatch>);

impl<'a> PatchSink for VecPatchSink<'a> {
    fn push(&mut self, patch: DomPatch) {
        self.0.push(patch);
    }
}

impl PatchSink for Vec<DomPatch> {
    fn push(&mut self, patch: DomPatch) {
        Vec::push(self, patch);
    }
}

/// Shadow of the emitted tree: just enough structure to resolve foster
/// parents and to coalesce text.
#[derive(Debug, Default)]
struct ShadowNode {
    parent: Option<PatchKey>,
    children: Vec<PatchKey>,
    /// Current contents; `Some` only for text nodes.
    text: Option<String>,
}

/// [`TreeSink`] that emits [`DomPatch`]es into a [`PatchSink`].
///
/// Keys are allocated densely from 1 in creation order, so two runs over the
/// same tokens produce identical streams. With `coalesce_text`, text appended
/// right after an existing text sibling becomes a `SetText` on that node
/// rather than a new node.
pub struct PatchTreeSink<P: PatchSink> {
    out: P,
    coalesce_text: bool,
    nodes: Vec<ShadowNode>,
    document: Option<PatchKey>,
}

impl<P: PatchSink> PatchTreeSink<P> {
    pub fn new(out: P, coalesce_text: bool) -> Self {
        Self {
            out,
            coalesce_text,
            nodes: Vec::new(),
            document: None,
        }
    }

    pub fn into_inner(self) -> P {
        self.out
    }

    fn alloc(&mut self, text: Option<String>) -> PatchKey {
        self.nodes.push(ShadowNode {
            text,
            ..ShadowNode::default()
        });
        PatchKey(self.nodes.len() as u32)
    }

    fn shadow(&self, key: PatchKey) -> &ShadowNode {
        debug_assert_ne!(key, PatchKey::INVALID, "invalid patch key");
        &self.nodes[key.0 as usize - 1]
    }

    fn shadow_mut(&mut self, key: PatchKey) -> &mut ShadowNode {
        debug_assert_ne!(key, PatchKey::INVALID, "invalid patch key");
        &mut self.nodes[key.0 as usize - 1]
    }

    fn unlink(&mut self, key: PatchKey) {
        let Some(parent) = self.shadow_mut(key).parent.take() else {
            return;
        };
        self.shadow_mut(parent).children.retain(|&child| child != key);
        self.out.push(DomPatch::Detach { key });
    }

    fn append(&mut self, parent: PatchKey, child: PatchKey) {
        self.unlink(child);
        self.shadow_mut(parent).children.push(child);
        self.shadow_mut(child).parent = Some(parent);
        self.out.push(DomPatch::AppendChild { parent, child });
    }

    fn insert_before(&mut self, parent: PatchKey, child: PatchKey, before: PatchKey) {
        self.unlink(child);
        let siblings = &mut self.shadow_mut(parent).children;
        let index = siblings
            .iter()
            .position(|&sibling| sibling == before)
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.shadow_mut(child).parent = Some(parent);
        self.out.push(DomPatch::InsertBefore {
            parent,
            child,
            before,
        });
    }

    /// Appends `data` to the text node `key` when coalescing applies.
    fn try_extend_text(&mut self, key: Option<PatchKey>, data: &str) -> bool {
        if !self.coalesce_text {
            return false;
        }
        let Some(key) = key else {
            return false;
        };
        let Some(text) = self.shadow_mut(key).text.as_mut() else {
            return false;
        };
        text.push_str(data);
        let text = text.clone();
        self.out.push(DomPatch::SetText { key, text });
        true
    }

    fn create_text(&mut self, data: &str) -> PatchKey {
        let key = self.alloc(Some(data.to_string()));
        self.out.push(DomPatch::CreateText {
            key,
            text: data.to_string(),
        });
        key
    }
}

impl<P: PatchSink> TreeSink for PatchTreeSink<P> {
    type Handle = PatchKey;

    fn document(&mut self) -> PatchKey {
        if let Some(document) = self.document {
            return document;
        }
        let key = self.alloc(None);
        self.out.push(DomPatch::CreateDocument { key });
        self.document = Some(key);
        key
    }

    fn create_element(
        &mut self,
        namespace: Namespace,
        local_name: &str,
        attrs: &[Attribute],
    ) -> PatchKey {
        let key = self.alloc(None);
        self.out.push(DomPatch::CreateElement {
            key,
            namespace,
            name: Arc::from(local_name),
            attributes: attrs.to_vec(),
        });
        key
    }

    fn attach_node(&mut self, child: &PatchKey, parent: &PatchKey) {
        self.append(*parent, *child);
    }

    fn attach_node_to_foster_parent(
        &mut self,
        child: &PatchKey,
        table: &PatchKey,
        stack_parent: &PatchKey,
    ) {
        match self.shadow(*table).parent {
            Some(parent) => self.insert_before(parent, *child, *table),
            None => self.append(*stack_parent, *child),
        }
    }

    fn detach_from_parent(&mut self, node: &PatchKey) {
        self.unlink(*node);
    }

    fn add_attributes_to_element(&mut self, element: &PatchKey, attrs: &[Attribute]) {
        if attrs.is_empty() {
            return;
        }
        self.out.push(DomPatch::MergeAttributes {
            key: *element,
            attributes: attrs.to_vec(),
        });
    }

    fn insert_comment(&mut self, data: &str, parent: &PatchKey) {
        let key = self.alloc(None);
        self.out.push(DomPatch::CreateComment {
            key,
            text: data.to_string(),
        });
        self.append(*parent, key);
    }

    fn insert_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        let document = self.document();
        let key = self.alloc(None);
        self.out.push(DomPatch::CreateDoctype {
            key,
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
        self.append(document, key);
    }

    fn insert_text(&mut self, data: &str, parent: &PatchKey) {
        let last = self.shadow(*parent).children.last().copied();
        if self.try_extend_text(last, data) {
            return;
        }
        let key = self.create_text(data);
        self.append(*parent, key);
    }

    fn insert_text_to_foster_parent(
        &mut self,
        data: &str,
        table: &PatchKey,
        stack_parent: &PatchKey,
    ) {
        let Some(parent) = self.shadow(*table).parent else {
            self.insert_text(data, stack_parent);
            return;
        };
        let siblings = &self.shadow(parent).children;
        let previous = siblings
            .iter()
            .position(|sibling| sibling == table)
            .and_then(|index| index.checked_sub(1))
            .map(|index| siblings[index]);
        if self.try_extend_text(previous, data) {
            return;
        }
        let key = self.create_text(data);
        self.insert_before(parent, key, *table);
    }

    fn reparent_children(&mut self, old_parent: &PatchKey, new_parent: &PatchKey) {
        let moved = std::mem::take(&mut self.shadow_mut(*old_parent).children);
        if moved.is_empty() {
            return;
        }
        for &child in &moved {
            self.shadow_mut(child).parent = Some(*new_parent);
        }
        self.shadow_mut(*new_parent).children.extend(moved);
        self.out.push(DomPatch::MoveChildren {
            from: *old_parent,
            to: *new_parent,
        });
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.out.push(DomPatch::SetCompatMode { mode });
    }
}

#[cfg(test)]
mod tests {
    use super::{PatchTreeSink, VecPatchSink};
    use crate::dom_patch::{DomPatch, PatchKey};
    use crate::html5::shared::Namespace;
    use crate::html5::tree_builder::TreeSink;

    #[test]
    fn document_is_created_once() {
        let mut patches = Vec::new();
        let mut sink = PatchTreeSink::new(VecPatchSink(&mut patches), false);
        let first = sink.document();
        let second = sink.document();
        assert_eq!(first, second);
        assert_eq!(first, PatchKey(1));
        drop(sink);
        assert_eq!(patches, vec![DomPatch::CreateDocument { key: PatchKey(1) }]);
    }

    #[test]
    fn coalesced_text_becomes_set_text() {
        let mut sink = PatchTreeSink::new(Vec::new(), true);
        let document = sink.document();
        let body = sink.create_element(Namespace::Html, "body", &[]);
        sink.attach_node(&body, &document);
        sink.insert_text("a", &body);
        sink.insert_text("b", &body);
        let patches = sink.into_inner();
        assert_eq!(
            patches.last(),
            Some(&DomPatch::SetText {
                key: PatchKey(3),
                text: "ab".to_string(),
            })
        );
        let created = patches
            .iter()
            .filter(|patch| matches!(patch, DomPatch::CreateText { .. }))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn uncoalesced_text_creates_a_node_per_run() {
        let mut sink = PatchTreeSink::new(Vec::new(), false);
        let document = sink.document();
        let body = sink.create_element(Namespace::Html, "body", &[]);
        sink.attach_node(&body, &document);
        sink.insert_text("a", &body);
        sink.insert_text("b", &body);
        let created = sink
            .into_inner()
            .iter()
            .filter(|patch| matches!(patch, DomPatch::CreateText { .. }))
            .count();
        assert_eq!(created, 2);
    }

    #[test]
    fn foster_parent_inserts_before_attached_table() {
        let mut sink = PatchTreeSink::new(Vec::new(), false);
        let document = sink.document();
        let body = sink.create_element(Namespace::Html, "body", &[]);
        let table = sink.create_element(Namespace::Html, "table", &[]);
        let div = sink.create_element(Namespace::Html, "div", &[]);
        sink.attach_node(&body, &document);
        sink.attach_node(&table, &body);
        sink.attach_node_to_foster_parent(&div, &table, &body);
        assert_eq!(
            sink.into_inner().last(),
            Some(&DomPatch::InsertBefore {
                parent: body,
                child: div,
                before: table,
            })
        );
    }

    #[test]
    fn foster_parent_falls_back_to_stack_parent_for_detached_table() {
        let mut sink = PatchTreeSink::new(Vec::new(), false);
        let _document = sink.document();
        let body = sink.create_element(Namespace::Html, "body", &[]);
        let table = sink.create_element(Namespace::Html, "table", &[]);
        let div = sink.create_element(Namespace::Html, "div", &[]);
        sink.attach_node_to_foster_parent(&div, &table, &body);
        assert_eq!(
            sink.into_inner().last(),
            Some(&DomPatch::AppendChild {
                parent: body,
                child: div,
            })
        );
    }

    #[test]
    fn reattaching_a_node_detaches_it_first() {
        let mut sink = PatchTreeSink::new(Vec::new(), false);
        let document = sink.document();
        let a = sink.create_element(Namespace::Html, "a", &[]);
        let b = sink.create_element(Namespace::Html, "b", &[]);
        sink.attach_node(&a, &document);
        sink.attach_node(&b, &a);
        sink.attach_node(&b, &document);
        let patches = sink.into_inner();
        let tail = &patches[patches.len() - 2..];
        assert_eq!(
            tail,
            &[
                DomPatch::Detach { key: b },
                DomPatch::AppendChild {
                    parent: document,
                    child: b,
                },
            ]
        );
    }
}
