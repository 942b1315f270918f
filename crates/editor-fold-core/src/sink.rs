//! The UI side of folding: where computed ranges are applied.

use crate::error::UiError;
use crate::range::FoldingRange;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

/// Identifies one open editor in the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditorHandle(pub u64);

impl fmt::Display for EditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Applies folding ranges to a displayed editor.
///
/// Implementations replace the editor's whole set of fold markers with `ranges` and request a
/// redraw. They are called on the UI runtime by [`UiDispatcher`](crate::UiDispatcher).
pub trait FoldingSink: Send + Sync + 'static {
    /// Replace all fold markers of `editor`.
    fn apply_folding_ranges(
        &self,
        editor: EditorHandle,
        ranges: Vec<FoldingRange>,
    ) -> Result<(), UiError>;
}

#[derive(Debug, Default)]
struct EditorFolds {
    ranges: Vec<FoldingRange>,
    redraws: u64,
}

/// In-memory fold markers per editor.
///
/// A reference [`FoldingSink`] for hosts that render from a model, and the sink used in tests.
/// Applying ranges to an editor that was never opened (or was closed) fails with
/// [`UiError::EditorClosed`].
#[derive(Debug, Default)]
pub struct FoldMarkers {
    editors: Mutex<HashMap<EditorHandle, EditorFolds>>,
}

impl FoldMarkers {
    /// Create an empty marker model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `editor`.
    pub fn open(&self, editor: EditorHandle) {
        self.editors.lock().entry(editor).or_default();
    }

    /// Stop tracking `editor` and drop its markers.
    pub fn close(&self, editor: EditorHandle) {
        self.editors.lock().remove(&editor);
    }

    /// Current markers of `editor`, ordered by start offset.
    pub fn ranges(&self, editor: EditorHandle) -> Vec<FoldingRange> {
        self.editors
            .lock()
            .get(&editor)
            .map(|folds| folds.ranges.clone())
            .unwrap_or_default()
    }

    /// Number of redraws requested for `editor`.
    pub fn redraw_count(&self, editor: EditorHandle) -> u64 {
        self.editors
            .lock()
            .get(&editor)
            .map_or(0, |folds| folds.redraws)
    }

    /// Markers of `editor` covering `offset`, outermost first.
    pub fn ranges_at(&self, editor: EditorHandle, offset: usize) -> Vec<FoldingRange> {
        self.ranges(editor)
            .into_iter()
            .filter(|range| range.as_range().contains(&offset))
            .collect()
    }
}

impl FoldingSink for FoldMarkers {
    fn apply_folding_ranges(
        &self,
        editor: EditorHandle,
        mut ranges: Vec<FoldingRange>,
    ) -> Result<(), UiError> {
        let mut editors = self.editors.lock();
        let folds = editors
            .get_mut(&editor)
            .ok_or(UiError::EditorClosed(editor.0))?;

        ranges.retain(FoldingRange::is_valid);
        ranges.sort_unstable_by_key(|r| (r.start_offset, std::cmp::Reverse(r.length)));
        ranges.dedup();

        folds.ranges = ranges;
        folds.redraws += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_all_markers() {
        let markers = FoldMarkers::new();
        let editor = EditorHandle(1);
        markers.open(editor);

        markers
            .apply_folding_ranges(editor, vec![FoldingRange::new(5, 3), FoldingRange::new(1, 9)])
            .unwrap();
        assert_eq!(
            markers.ranges(editor),
            vec![FoldingRange::new(1, 9), FoldingRange::new(5, 3)]
        );

        markers
            .apply_folding_ranges(editor, vec![FoldingRange::new(2, 2)])
            .unwrap();
        assert_eq!(markers.ranges(editor), vec![FoldingRange::new(2, 2)]);
        assert_eq!(markers.redraw_count(editor), 2);
    }

    #[test]
    fn test_invalid_and_duplicate_ranges_are_dropped() {
        let markers = FoldMarkers::new();
        let editor = EditorHandle(1);
        markers.open(editor);

        markers
            .apply_folding_ranges(
                editor,
                vec![
                    FoldingRange::new(1, 4),
                    FoldingRange::new(3, 0),
                    FoldingRange::new(1, 4),
                ],
            )
            .unwrap();
        assert_eq!(markers.ranges(editor), vec![FoldingRange::new(1, 4)]);
    }

    #[test]
    fn test_ranges_at_offset() {
        let markers = FoldMarkers::new();
        let editor = EditorHandle(7);
        markers.open(editor);
        markers
            .apply_folding_ranges(editor, vec![FoldingRange::new(1, 10), FoldingRange::new(4, 2)])
            .unwrap();

        assert_eq!(
            markers.ranges_at(editor, 4),
            vec![FoldingRange::new(1, 10), FoldingRange::new(4, 2)]
        );
        assert_eq!(markers.ranges_at(editor, 8), vec![FoldingRange::new(1, 10)]);
        assert!(markers.ranges_at(editor, 0).is_empty());
    }

    #[test]
    fn test_closed_editor_rejects_ranges() {
        let markers = FoldMarkers::new();
        let editor = EditorHandle(3);
        assert_eq!(
            markers.apply_folding_ranges(editor, Vec::new()),
            Err(UiError::EditorClosed(3))
        );

        markers.open(editor);
        markers.close(editor);
        assert!(markers.apply_folding_ranges(editor, Vec::new()).is_err());
        assert_eq!(markers.redraw_count(editor), 0);
    }
}
