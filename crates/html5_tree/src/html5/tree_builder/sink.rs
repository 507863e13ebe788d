//! Tree-manipulation contract between the tree builder and a concrete DOM.

use super::modes::QuirksMode;
use crate::html5::shared::{Attribute, Namespace, ParseError};
use std::fmt::Debug;

/// Node-manipulation collaborator driven by [`Html5TreeBuilder`].
///
/// The builder never owns nodes; it holds `Handle`s returned by
/// `create_element`/`document` and asks the sink to wire them together.
/// Implementations decide storage (retained arena, patch stream, ...) and
/// whether adjacent text is coalesced.
///
/// [`Html5TreeBuilder`]: super::Html5TreeBuilder
pub trait TreeSink {
    type Handle: Clone + PartialEq + Debug;

    /// Document node. Parentless content (doctype, top-level comments, the
    /// root element) attaches here.
    fn document(&mut self) -> Self::Handle;

    fn create_element(
        &mut self,
        namespace: Namespace,
        local_name: &str,
        attrs: &[Attribute],
    ) -> Self::Handle;

    /// Appends `child` as the last child of `parent`.
    fn attach_node(&mut self, child: &Self::Handle, parent: &Self::Handle);

    /// Inserts `child` immediately before `table` when `table` has a parent,
    /// otherwise appends it to `stack_parent`.
    fn attach_node_to_foster_parent(
        &mut self,
        child: &Self::Handle,
        table: &Self::Handle,
        stack_parent: &Self::Handle,
    );

    fn detach_from_parent(&mut self, node: &Self::Handle);

    /// Merge-if-absent: names already present on `element` keep their value.
    fn add_attributes_to_element(&mut self, element: &Self::Handle, attrs: &[Attribute]);

    fn insert_comment(&mut self, data: &str, parent: &Self::Handle);

    fn insert_doctype(&mut self, name: &str, public_id: &str, system_id: &str);

    fn insert_text(&mut self, data: &str, parent: &Self::Handle);

    /// Text counterpart of `attach_node_to_foster_parent`.
    fn insert_text_to_foster_parent(
        &mut self,
        data: &str,
        table: &Self::Handle,
        stack_parent: &Self::Handle,
    );

    /// Moves every child of `old_parent` to the end of `new_parent`, in order.
    fn reparent_children(&mut self, old_parent: &Self::Handle, new_parent: &Self::Handle);

    fn set_quirks_mode(&mut self, _mode: QuirksMode) {}

    /// Observational hook for recoverable parse errors.
    fn parse_error(&mut self, _error: &ParseError) {}
}
