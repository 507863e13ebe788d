//! HTML5 tree-construction path.

pub(crate) mod shared;
pub mod tree_builder;

// Public re-exports: consumers should import from `html5_tree::html5::*` rather than `shared::*`.
pub use shared::{
    Attribute, Counters, ErrorPolicy, Namespace, ParseError, ParseErrorCode, Token, TokenizerState,
};
pub use tree_builder::{
    Html5TreeBuilder, InsertionMode, PatchSink, PatchTreeSink, QuirksMode, TreeBuilderConfig,
    TreeBuilderError, TreeBuilderStepResult, TreeSink, VecPatchSink,
};
