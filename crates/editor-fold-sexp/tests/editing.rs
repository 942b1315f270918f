use editor_fold_core::{
    DescriptorStore, EditError, EditorHandle, FoldMarkers, FoldingController, FoldingDescriptor,
    FoldingRange, FullReparseReason, JsonDescriptorFile, ParseStateStore, StoreConfig, Tag,
    UiDispatcher, UpdateMode,
};
use editor_fold_sexp::SexpParser;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;

const DEFN: &str = "(defn f []\n  (+ 1 2))";

#[test]
fn edits_keep_tree_and_text_consistent() {
    let store = ParseStateStore::new(SexpParser::new());
    store.initialize(DEFN).unwrap();

    let expected = "(defn f []\n  (+ 1 2 3))";
    let state = store.apply_edit(19, 0, " 3", expected);
    assert_eq!(state.version(), 1);
    assert_eq!(state.update_mode(), &UpdateMode::Incremental);
    assert_eq!(store.current_tree().unwrap().text(), expected);
    assert_eq!(store.previous_tree().unwrap().text(), DEFN);
    assert_eq!(state.buffer().to_string(), expected);
}

#[test]
fn out_of_bounds_edit_reparses_expected_text() {
    let store = ParseStateStore::new(SexpParser::new());
    store.initialize("(a)").unwrap();

    let state = store.apply_edit(40, 2, "b", "(a b)");
    assert_eq!(
        state.update_mode(),
        &UpdateMode::FullReparse(FullReparseReason::EditFailed(EditError::OutOfBounds {
            offset: 40,
            end: 42,
            len: 3
        }))
    );
    assert_eq!(store.current_tree().unwrap().text(), "(a b)");
    assert_eq!(state.version(), 1);
}

#[test]
fn consistency_check_heals_diverged_buffers() {
    let config = StoreConfig::new().with_consistency_check(true);
    let store = ParseStateStore::with_config(SexpParser::new(), config);
    store.initialize("(a)").unwrap();

    // The editor reports a different final text than the edit produces.
    let state = store.apply_edit(2, 0, " b", "(a c)");
    assert!(matches!(
        state.update_mode(),
        UpdateMode::FullReparse(FullReparseReason::ConsistencyMismatch(_))
    ));
    assert_eq!(state.buffer().to_string(), "(a c)");
}

#[test]
fn repeated_notifications_are_noops() {
    let store = ParseStateStore::new(SexpParser::new());
    store.initialize(DEFN).unwrap();
    let tree = store.current_tree().unwrap();

    store.apply_edit(0, 0, "", DEFN);
    store.apply_edit(3, 2, "fn", DEFN);
    assert_eq!(store.version(), Some(0));
    assert!(Arc::ptr_eq(&tree, &store.current_tree().unwrap()));
}

#[test]
fn soundness_feed_tracks_broken_trees() {
    let store = ParseStateStore::new(SexpParser::new());
    let feed = Arc::new(Mutex::new(Vec::new()));
    let sink = feed.clone();
    store.subscribe_soundness(move |sound| sink.lock().unwrap().push(sound));

    store.initialize("(a\n b)").unwrap();
    store.apply_edit(5, 1, "", "(a\n b");
    assert!(!store.is_structurally_sound());
    store.apply_edit(5, 0, ")", "(a\n b)");
    store.apply_edit(0, 6, "", "");
    store.apply_edit(0, 0, "]", "]");

    assert_eq!(*feed.lock().unwrap(), vec![true, false, true, true, false]);
}

#[test]
fn get_or_recompute_replaces_diverged_documents() {
    let store = ParseStateStore::new(SexpParser::new());
    store.initialize("(a)").unwrap();

    let (tree, buffer) = store.get_or_recompute(DEFN);
    assert_eq!(tree.unwrap().text(), DEFN);
    assert_eq!(buffer.to_string(), DEFN);
    assert_eq!(store.version(), Some(1));

    store.get_or_recompute(DEFN);
    assert_eq!(store.version(), Some(1));
}

#[tokio::test]
async fn controller_folds_while_typing() {
    let dir = tempfile::tempdir().unwrap();
    let descriptors: Arc<dyn DescriptorStore> =
        Arc::new(JsonDescriptorFile::new(dir.path().join("folding.json")));

    let store = Arc::new(ParseStateStore::new(SexpParser::new()));
    store.initialize("(defn f []\n  x)").unwrap();

    let markers = Arc::new(FoldMarkers::new());
    let (dispatcher, mut diagnostics) = UiDispatcher::new(Handle::current());
    let controller =
        FoldingController::new(store, descriptors.clone(), dispatcher, markers.clone());

    let editor = EditorHandle(1);
    markers.open(editor);
    controller.attach(editor);

    controller.refresh(editor).outcome().await.unwrap();
    assert_eq!(markers.ranges(editor), vec![FoldingRange::new(1, 14)]);

    for handle in controller.text_changed(13, 1, "(+ 1 2)", DEFN) {
        handle.outcome().await.unwrap();
    }
    assert_eq!(markers.ranges(editor), vec![FoldingRange::new(1, 20)]);

    for handle in controller.text_changed(10, 3, " ", "(defn f [] (+ 1 2))") {
        handle.outcome().await.unwrap();
    }
    assert!(markers.ranges(editor).is_empty());
    assert_eq!(markers.redraw_count(editor), 3);
    assert!(diagnostics.try_recv().is_err());
}

#[tokio::test]
async fn descriptor_changes_persist_across_controllers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folding.json");
    let (dispatcher, _diagnostics) = UiDispatcher::new(Handle::current());
    let markers = Arc::new(FoldMarkers::new());

    let store = Arc::new(ParseStateStore::new(SexpParser::new()));
    store.initialize("[1\n 2]").unwrap();
    let controller = FoldingController::new(
        store.clone(),
        Arc::new(JsonDescriptorFile::new(&path)),
        dispatcher.clone(),
        markers.clone(),
    );
    assert!(controller.compute_ranges().is_empty());

    let mut updated = FoldingDescriptor::defaults();
    updated.push(FoldingDescriptor::new(true, [Tag::BRACKET]));
    assert!(controller.set_descriptors(updated.clone()).unwrap().is_empty());
    assert_eq!(
        controller.compute_ranges().into_iter().collect::<Vec<_>>(),
        vec![FoldingRange::new(1, 5)]
    );

    let reopened = FoldingController::new(
        store,
        Arc::new(JsonDescriptorFile::new(&path)),
        dispatcher,
        markers,
    );
    assert_eq!(&*reopened.descriptors(), updated.as_slice());
    assert_eq!(reopened.compute_ranges().len(), 1);
}
