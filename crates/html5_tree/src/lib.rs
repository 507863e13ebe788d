//! HTML5 tree construction.
//!
//! [`Html5TreeBuilder`] consumes tokens from an external tokenizer and drives
//! a [`TreeSink`]. Two sinks ship with the crate: [`ArenaDom`], a retained
//! arena DOM, and [`PatchTreeSink`], which streams [`DomPatch`] events.
//!
//! [`Html5TreeBuilder`]: html5::Html5TreeBuilder
//! [`TreeSink`]: html5::TreeSink
//! [`PatchTreeSink`]: html5::PatchTreeSink

pub mod html5;

#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;

mod dom_builder;
mod dom_patch;
mod types;

pub use crate::dom_builder::{ArenaDom, PatchApplyError};
pub use crate::dom_patch::{DomPatch, PatchKey};
pub use crate::types::{Id, Node, NodeId};
