//! Incremental DOM patch protocol.
//!
//! [`PatchTreeSink`] turns tree-builder callbacks into this ordered event
//! stream; [`ArenaDom::from_patches`] replays it.
//!
//! Invariants:
//! - Patches are applied in order.
//! - References must point to existing keys at the time they are used (except
//!   the `key` in create operations).
//! - All `PatchKey` values used in patches are non-zero (`PatchKey::INVALID`
//!   is never valid in a patch stream).
//! - A node has at most one parent. `Detach` leaves the subtree alive so it
//!   can be attached again; nothing is ever destroyed.
//! - Attribute order and duplicates are preserved; appliers must not dedupe.
//!
//! [`PatchTreeSink`]: crate::html5::tree_builder::PatchTreeSink
//! [`ArenaDom::from_patches`]: crate::ArenaDom::from_patches

use crate::html5::shared::{Attribute, Namespace};
use crate::html5::tree_builder::QuirksMode;
use std::sync::Arc;

/// Opaque patch-layer key for stable node identity within a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey(pub u32);

impl PatchKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: PatchKey = PatchKey(0);
}

/// Incremental DOM patch operation.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create the document root node. Always the first patch of a stream.
    CreateDocument { key: PatchKey },
    CreateDoctype {
        key: PatchKey,
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Create an element node with initial attributes.
    CreateElement {
        key: PatchKey,
        namespace: Namespace,
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    CreateText { key: PatchKey, text: String },
    CreateComment { key: PatchKey, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: PatchKey, child: PatchKey },
    /// Insert a child before an existing sibling.
    InsertBefore {
        parent: PatchKey,
        child: PatchKey,
        before: PatchKey,
    },
    /// Unlink a node from its parent, keeping its subtree.
    Detach { key: PatchKey },
    /// Move every child of `from` to the end of `to`, preserving order.
    MoveChildren { from: PatchKey, to: PatchKey },
    /// Add attributes whose names are not already present on the element.
    MergeAttributes {
        key: PatchKey,
        attributes: Vec<Attribute>,
    },
    /// Replace the text content of a text node.
    ///
    /// Applying this to a non-text node is a deterministic error.
    SetText { key: PatchKey, text: String },
    SetCompatMode { mode: QuirksMode },
}
