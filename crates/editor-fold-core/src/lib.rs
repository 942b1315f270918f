#![warn(missing_docs)]
//! Editor Fold Core - Structure-Aware Code Folding for Parenthesized Languages
//!
//! # Overview
//!
//! `editor-fold-core` computes code folding ranges for an open document from its parse tree and
//! keeps that tree consistent with the editor text while edits arrive concurrently.
//! It does not tokenize or parse anything itself: a parser backend implements
//! [`IncrementalParser`] (see the `editor-fold-sexp` crate), and the UI layer implements
//! [`FoldingSink`].
//!
//! # Core Features
//!
//! - **Parse State Store**: versioned, lock-free snapshots of `{text, buffer, tree}` with
//!   compare-and-swap commits and automatic full-reparse recovery
//! - **Delimiter Matcher**: single-pass, stack-safe pairing of paren-family and string
//!   delimiters, tolerant of malformed input
//! - **Folding Policy**: descriptor-driven selection of foldable leaves
//! - **Descriptor Persistence**: JSON-backed, user-editable folding rules
//! - **UI Hand-off**: fire-and-forget dispatch onto the UI runtime with diagnostics
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  FoldingController (editor orchestration)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  UiDispatcher → FoldingSink                 │  ← UI runtime
//! ├─────────────────────────────────────────────┤
//! │  Folding Policy + Descriptors               │  ← Range computation
//! ├─────────────────────────────────────────────┤
//! │  Delimiter Matcher                          │  ← Pairing
//! ├─────────────────────────────────────────────┤
//! │  ParseStateStore → IncrementalParser        │  ← Parse state
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use editor_fold_core::{FoldingController, ParseStateStore, UiDispatcher};
//!
//! let store = Arc::new(ParseStateStore::new(parser));
//! store.initialize("(defn f []\n  (+ 1 2))")?;
//!
//! let (dispatcher, diagnostics) = UiDispatcher::new(ui_runtime.handle().clone());
//! let controller = FoldingController::new(store, descriptor_store, dispatcher, sink);
//! controller.attach(editor);
//! controller.refresh(editor);
//! ```
//!
//! # Module Description
//!
//! - [`tags`] - Structural tags
//! - [`tree`] - Immutable parse trees and their builder
//! - [`edit`] - Text edits in character offsets
//! - [`range`] - Folding ranges
//! - [`matcher`] - Delimiter matching
//! - [`policy`] - Folding policy
//! - [`descriptors`] - Folding descriptors and their persistence
//! - [`parser`] - The incremental parser capability
//! - [`store`] - Parse state store
//! - [`sink`] - UI folding sinks
//! - [`dispatch`] - Hand-off to the UI runtime
//! - [`controller`] - Editor orchestration
//! - [`error`] - Error types

pub mod controller;
pub mod descriptors;
pub mod dispatch;
pub mod edit;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod policy;
pub mod range;
pub mod sink;
pub mod store;
pub mod tags;
pub mod tree;

pub use controller::FoldingController;
pub use descriptors::{
    DescriptorStore, FoldingDescriptor, JsonDescriptorFile, MemoryDescriptorStore, eligible_tags,
    load_or_default,
};
pub use dispatch::{DiagnosticReceiver, DispatchHandle, UiDispatcher};
pub use edit::TextEdit;
pub use error::{DescriptorError, EditError, PreconditionError, UiDispatchFailure, UiError};
pub use matcher::{DelimiterToken, Glyph, ScanState, TokenOccurrenceEntry, match_delimiters};
pub use parser::IncrementalParser;
pub use policy::compute_folding_ranges;
pub use range::FoldingRange;
pub use sink::{EditorHandle, FoldMarkers, FoldingSink};
pub use store::{
    ConsistencyMismatch, FullReparseReason, ParseState, ParseStateStore, StateObserver,
    StoreConfig, UpdateMode,
};
pub use tags::Tag;
pub use tree::{Leaf, Node, NodeId, Tree, TreeBuilder};
