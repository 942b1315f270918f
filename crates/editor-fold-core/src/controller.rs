//! Editor orchestration: text changes in, folding ranges out.
//!
//! A [`FoldingController`] serves one open document. It forwards every text change to the
//! document's [`ParseStateStore`], computes folding ranges from the committed tree under the
//! current descriptors, and hands them to the UI runtime through a [`UiDispatcher`] for every
//! editor attached to the document.

use crate::descriptors::{DescriptorStore, FoldingDescriptor, load_or_default};
use crate::dispatch::{DispatchHandle, UiDispatcher};
use crate::error::DescriptorError;
use crate::parser::IncrementalParser;
use crate::policy::compute_folding_ranges;
use crate::range::FoldingRange;
use crate::sink::{EditorHandle, FoldingSink};
use crate::store::ParseStateStore;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Folding for one open document.
pub struct FoldingController<P: IncrementalParser> {
    store: Arc<ParseStateStore<P>>,
    descriptor_store: Arc<dyn DescriptorStore>,
    descriptors: RwLock<Arc<[FoldingDescriptor]>>,
    dispatcher: UiDispatcher,
    sink: Arc<dyn FoldingSink>,
    editors: Mutex<Vec<EditorHandle>>,
}

impl<P: IncrementalParser> FoldingController<P> {
    /// Create a controller. Descriptors are loaded from `descriptor_store`, falling back to
    /// [`FoldingDescriptor::defaults`].
    pub fn new(
        store: Arc<ParseStateStore<P>>,
        descriptor_store: Arc<dyn DescriptorStore>,
        dispatcher: UiDispatcher,
        sink: Arc<dyn FoldingSink>,
    ) -> Self {
        let descriptors = load_or_default(descriptor_store.as_ref());
        Self {
            store,
            descriptor_store,
            descriptors: RwLock::new(descriptors.into()),
            dispatcher,
            sink,
            editors: Mutex::new(Vec::new()),
        }
    }

    /// The document's parse state store.
    pub fn store(&self) -> &Arc<ParseStateStore<P>> {
        &self.store
    }

    /// Descriptors currently in effect.
    pub fn descriptors(&self) -> Arc<[FoldingDescriptor]> {
        self.descriptors.read().clone()
    }

    /// Show this document's folds in `editor`.
    pub fn attach(&self, editor: EditorHandle) {
        let mut editors = self.editors.lock();
        if !editors.contains(&editor) {
            editors.push(editor);
        }
    }

    /// Stop updating `editor`.
    pub fn detach(&self, editor: EditorHandle) {
        self.editors.lock().retain(|e| *e != editor);
    }

    /// Editors currently attached.
    pub fn editors(&self) -> Vec<EditorHandle> {
        self.editors.lock().clone()
    }

    /// Record a text change and refresh every attached editor.
    ///
    /// `final_text` is the full document text after the change.
    pub fn text_changed(
        &self,
        offset: usize,
        length: usize,
        inserted_text: &str,
        final_text: &str,
    ) -> Vec<DispatchHandle> {
        let state = self
            .store
            .apply_edit(offset, length, inserted_text, final_text);
        tracing::trace!(version = state.version(), offset, length, "text changed");
        self.refresh_all()
    }

    /// Compute ranges from the latest committed tree and apply them to `editor`.
    pub fn refresh(&self, editor: EditorHandle) -> DispatchHandle {
        let ranges: Vec<FoldingRange> = self.compute_ranges().into_iter().collect();
        self.dispatcher.dispatch(self.sink.clone(), editor, ranges)
    }

    /// Refresh every attached editor.
    pub fn refresh_all(&self) -> Vec<DispatchHandle> {
        let editors = self.editors();
        if editors.is_empty() {
            return Vec::new();
        }
        let ranges: Vec<FoldingRange> = self.compute_ranges().into_iter().collect();
        editors
            .into_iter()
            .map(|editor| {
                self.dispatcher
                    .dispatch(self.sink.clone(), editor, ranges.clone())
            })
            .collect()
    }

    /// Folding ranges of the latest committed tree under the current descriptors.
    pub fn compute_ranges(&self) -> BTreeSet<FoldingRange> {
        let tree = self.store.current_tree();
        let descriptors = self.descriptors();
        compute_folding_ranges(tree.as_deref(), &descriptors)
    }

    /// Persist a new descriptor list, then refresh every attached editor.
    ///
    /// Nothing changes when saving fails.
    pub fn set_descriptors(
        &self,
        descriptors: Vec<FoldingDescriptor>,
    ) -> Result<Vec<DispatchHandle>, DescriptorError> {
        self.descriptor_store.save(&descriptors)?;
        tracing::debug!(count = descriptors.len(), "folding descriptors updated");
        *self.descriptors.write() = descriptors.into();
        Ok(self.refresh_all())
    }
}
