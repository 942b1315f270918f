//! Parse state store.
//!
//! Holds the authoritative `{text, buffer, previous tree, tree, version}` tuple of one open
//! document and keeps it consistent under concurrent edits.
//!
//! # Concurrency
//!
//! - Committed states are immutable [`ParseState`] snapshots published through an
//!   [`ArcSwapOption`]. Readers load the latest snapshot without waiting on writers.
//! - Writers run a compare-and-swap loop: load the latest snapshot, compute the next one, and
//!   install it only if nothing was committed in between. A writer that loses the race recomputes
//!   against the winner's state instead of overwriting it, so versions strictly increase.
//! - Observers run synchronously after a successful commit, in version order. A commit that is
//!   already superseded by the time its notification runs is folded into the newer one.
//!
//! # Failure handling
//!
//! Parser failures never escape [`ParseStateStore::apply_edit`]: a failed incremental edit falls
//! back to a full reparse of the expected text. So does an edit that does not turn the stored text
//! into the expected text, which covers stale offsets and writers that lost a race to a newer
//! commit. Only [`ParseStateStore::initialize`] on an initialized store returns an error.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = ParseStateStore::new(parser);
//! store.initialize("(defn f [])")?;
//! store.subscribe_soundness(|sound| println!("structural editing enabled: {sound}"));
//!
//! let state = store.apply_edit(10, 0, "x", "(defn f [x])");
//! assert_eq!(state.version(), 1);
//! ```

use crate::edit::TextEdit;
use crate::error::{EditError, PreconditionError, panic_message};
use crate::parser::IncrementalParser;
use crate::tree::Tree;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Configuration for [`ParseStateStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Compare the parser's edited buffer with the caller's expected text after every edit, and
    /// reparse from scratch on mismatch.
    ///
    /// The edit itself is always checked against the stored text. This additionally guards
    /// against parsers whose buffers drift from the edits they are given. Off by default:
    /// materializing the buffer on every keystroke costs a full copy.
    pub verify_consistency: bool,
}

impl StoreConfig {
    /// Default configuration (consistency check disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the post-edit consistency check.
    pub fn with_consistency_check(mut self, enabled: bool) -> Self {
        self.verify_consistency = enabled;
        self
    }
}

/// The edited text did not match the caller's expected text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyMismatch {
    /// Expected length in characters.
    pub expected_chars: usize,
    /// Actual buffer length in characters.
    pub actual_chars: usize,
}

/// Why a commit was produced by a full reparse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullReparseReason {
    /// The incremental edit failed.
    EditFailed(EditError),
    /// The consistency check failed.
    ConsistencyMismatch(ConsistencyMismatch),
}

/// How a committed [`ParseState`] was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateMode {
    /// First parse of the document.
    Initial,
    /// The previous buffer absorbed the edit.
    Incremental,
    /// The expected text was parsed from scratch.
    FullReparse(FullReparseReason),
}

/// One committed, immutable document state.
#[derive(Debug, Clone)]
pub struct ParseState<B> {
    text: Arc<str>,
    buffer: B,
    previous_tree: Option<Arc<Tree>>,
    tree: Option<Arc<Tree>>,
    version: u64,
    update_mode: UpdateMode,
}

impl<B> ParseState<B> {
    /// Document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle on the document text.
    pub fn shared_text(&self) -> Arc<str> {
        self.text.clone()
    }

    /// Parser buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Tree of this commit.
    pub fn tree(&self) -> Option<&Arc<Tree>> {
        self.tree.as_ref()
    }

    /// Tree of the commit this one replaced.
    pub fn previous_tree(&self) -> Option<&Arc<Tree>> {
        self.previous_tree.as_ref()
    }

    /// Commit version (0 for the initial parse).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// How this commit was produced.
    pub fn update_mode(&self) -> &UpdateMode {
        &self.update_mode
    }

    /// Whether structural editing may rely on the tree.
    ///
    /// True when the tree exists and is not broken. An empty document is always sound.
    pub fn is_structurally_sound(&self) -> bool {
        self.text.is_empty() || self.tree.as_ref().is_some_and(|tree| !tree.is_broken())
    }
}

/// Callback invoked with every committed state.
pub type StateObserver<B> = Box<dyn FnMut(&ParseState<B>) + Send>;

struct Observers<B> {
    callbacks: Vec<StateObserver<B>>,
    last_notified: Option<u64>,
}

/// Authoritative parse state of one open document.
pub struct ParseStateStore<P: IncrementalParser> {
    parser: P,
    config: StoreConfig,
    state: ArcSwapOption<ParseState<P::Buffer>>,
    observers: Mutex<Observers<P::Buffer>>,
}

impl<P: IncrementalParser> ParseStateStore<P> {
    /// Create an empty, uninitialized store.
    pub fn new(parser: P) -> Self {
        Self::with_config(parser, StoreConfig::default())
    }

    /// Create an empty store with an explicit configuration.
    pub fn with_config(parser: P, config: StoreConfig) -> Self {
        Self {
            parser,
            config,
            state: ArcSwapOption::empty(),
            observers: Mutex::new(Observers {
                callbacks: Vec::new(),
                last_notified: None,
            }),
        }
    }

    /// The parser backend.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Parse `initial_text` from scratch and commit it as version 0.
    pub fn initialize(
        &self,
        initial_text: &str,
    ) -> Result<Arc<ParseState<P::Buffer>>, PreconditionError> {
        loop {
            let current = self.state.load_full();
            if let Some(state) = &current {
                return Err(PreconditionError::AlreadyInitialized {
                    version: state.version,
                });
            }

            let buffer = self.parser.from_text(initial_text);
            let next = Arc::new(ParseState {
                text: Arc::from(initial_text),
                tree: self.parse(&buffer, 0),
                buffer,
                previous_tree: None,
                version: 0,
                update_mode: UpdateMode::Initial,
            });

            if self.try_commit(&current, &next) {
                tracing::debug!(chars = next.text.chars().count(), "parse state initialized");
                return Ok(next);
            }
        }
    }

    /// Apply an edit and commit the resulting state.
    ///
    /// `expected_final_text` is the full document text after the edit, as the editor sees it.
    /// When it already equals the stored text the call is a no-op and returns the current state.
    /// Otherwise exactly one new version is committed, produced incrementally when possible and
    /// by a full reparse of `expected_final_text` when not.
    pub fn apply_edit(
        &self,
        offset: usize,
        length: usize,
        inserted_text: &str,
        expected_final_text: &str,
    ) -> Arc<ParseState<P::Buffer>> {
        self.commit_edit(
            &TextEdit::new(offset, length, inserted_text),
            expected_final_text,
        )
    }

    fn commit_edit(
        &self,
        edit: &TextEdit,
        expected_final_text: &str,
    ) -> Arc<ParseState<P::Buffer>> {
        loop {
            let current = self.state.load_full();
            if let Some(state) = &current {
                if *state.text == *expected_final_text {
                    tracing::trace!(version = state.version, "edit is a no-op; keeping state");
                    return state.clone();
                }
            }

            let next = Arc::new(self.next_state(current.as_deref(), edit, expected_final_text));
            if self.try_commit(&current, &next) {
                tracing::debug!(
                    version = next.version,
                    offset = edit.offset,
                    length = edit.length,
                    mode = ?next.update_mode,
                    "parse state committed"
                );
                return next;
            }
            tracing::trace!(
                offset = edit.offset,
                length = edit.length,
                "parse state changed concurrently; retrying edit"
            );
        }
    }

    /// Return the tree and buffer for `expected_text`, recomputing if the store disagrees.
    ///
    /// A mismatch is handled as an edit replacing the whole document.
    pub fn get_or_recompute(&self, expected_text: &str) -> (Option<Arc<Tree>>, P::Buffer) {
        let current = self.state.load_full();
        if let Some(state) = &current {
            if *state.text == *expected_text {
                return (state.tree.clone(), state.buffer.clone());
            }
        }

        let length = current.as_ref().map_or(0, |s| s.text.chars().count());
        let edit = TextEdit::replace_all(length, expected_text);
        let committed = self.commit_edit(&edit, expected_text);

        match self.snapshot() {
            Some(latest) if *latest.text == *expected_text => {
                (latest.tree.clone(), latest.buffer.clone())
            }
            _ => (committed.tree.clone(), committed.buffer.clone()),
        }
    }

    /// Latest committed state.
    pub fn snapshot(&self) -> Option<Arc<ParseState<P::Buffer>>> {
        self.state.load_full()
    }

    /// Tree of the latest commit.
    pub fn current_tree(&self) -> Option<Arc<Tree>> {
        self.state.load().as_ref().and_then(|s| s.tree.clone())
    }

    /// Tree of the commit before the latest one.
    pub fn previous_tree(&self) -> Option<Arc<Tree>> {
        self.state.load().as_ref().and_then(|s| s.previous_tree.clone())
    }

    /// Version of the latest commit, `None` before the first commit.
    pub fn version(&self) -> Option<u64> {
        self.state.load().as_ref().map(|s| s.version)
    }

    /// Text of the latest commit, `None` before the first commit.
    pub fn text(&self) -> Option<Arc<str>> {
        self.state.load().as_ref().map(|s| s.text.clone())
    }

    /// Whether the latest commit is structurally sound. An uninitialized store holds an empty
    /// document and is sound.
    pub fn is_structurally_sound(&self) -> bool {
        self.state
            .load()
            .as_ref()
            .is_none_or(|s| s.is_structurally_sound())
    }

    /// Observe every committed state.
    ///
    /// Observers run on the committing thread while the observer list is locked; they must not
    /// commit to this store themselves.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnMut(&ParseState<P::Buffer>) + Send + 'static,
    {
        self.observers.lock().callbacks.push(Box::new(callback));
    }

    /// Observe structural soundness after every commit.
    pub fn subscribe_soundness<F>(&self, mut callback: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.subscribe(move |state| callback(state.is_structurally_sound()));
    }

    fn try_commit(
        &self,
        current: &Option<Arc<ParseState<P::Buffer>>>,
        next: &Arc<ParseState<P::Buffer>>,
    ) -> bool {
        let previous = self.state.compare_and_swap(current, Some(next.clone()));
        let won = match (&*previous, current) {
            (Some(previous), Some(current)) => Arc::ptr_eq(previous, current),
            (None, None) => true,
            _ => false,
        };
        if won {
            self.notify(next);
        }
        won
    }

    fn notify(&self, state: &ParseState<P::Buffer>) {
        let mut observers = self.observers.lock();
        if observers
            .last_notified
            .is_some_and(|last| last >= state.version)
        {
            return;
        }
        observers.last_notified = Some(state.version);
        for callback in &mut observers.callbacks {
            callback(state);
        }
    }

    fn next_state(
        &self,
        current: Option<&ParseState<P::Buffer>>,
        edit: &TextEdit,
        expected_final_text: &str,
    ) -> ParseState<P::Buffer> {
        let version = current.map_or(0, |s| s.version + 1);
        let previous_tree = current.and_then(|s| s.tree.clone());

        let incremental = self
            .edit_incrementally(current.map(|s| &s.buffer), edit)
            .and_then(|buffer| {
                let before = current.map_or("", |s| &*s.text);
                check_transition(buffer, edit, before, expected_final_text)
            })
            .and_then(|buffer| self.check_consistency(buffer, expected_final_text));

        let (buffer, update_mode) = match incremental {
            Ok(buffer) => (buffer, UpdateMode::Incremental),
            Err(reason) => {
                tracing::warn!(
                    version,
                    offset = edit.offset,
                    length = edit.length,
                    ?reason,
                    "incremental update failed; reparsing from scratch"
                );
                (
                    self.parser.from_text(expected_final_text),
                    UpdateMode::FullReparse(reason),
                )
            }
        };

        let tree = match update_mode {
            UpdateMode::Incremental => match self.try_parse(&buffer, version) {
                Ok(tree) => Some(tree),
                Err(err) => {
                    tracing::warn!(
                        version,
                        error = %err,
                        "parse after incremental edit failed; reparsing from scratch"
                    );
                    let buffer = self.parser.from_text(expected_final_text);
                    let tree = self.parse(&buffer, version);
                    return ParseState {
                        text: Arc::from(expected_final_text),
                        buffer,
                        previous_tree,
                        tree,
                        version,
                        update_mode: UpdateMode::FullReparse(FullReparseReason::EditFailed(err)),
                    };
                }
            },
            _ => self.parse(&buffer, version),
        };

        ParseState {
            text: Arc::from(expected_final_text),
            buffer,
            previous_tree,
            tree,
            version,
            update_mode,
        }
    }

    fn edit_incrementally(
        &self,
        buffer: Option<&P::Buffer>,
        edit: &TextEdit,
    ) -> Result<P::Buffer, FullReparseReason> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.parser
                .edit_buffer(buffer, edit.offset, edit.length, &edit.inserted_text)
        }))
        .unwrap_or_else(|payload| Err(EditError::Rejected(panic_message(&*payload))))
        .map_err(FullReparseReason::EditFailed)
    }

    fn check_consistency(
        &self,
        buffer: P::Buffer,
        expected_final_text: &str,
    ) -> Result<P::Buffer, FullReparseReason> {
        if !self.config.verify_consistency {
            return Ok(buffer);
        }
        let actual = self.parser.buffer_text(&buffer);
        if actual == expected_final_text {
            Ok(buffer)
        } else {
            Err(FullReparseReason::ConsistencyMismatch(ConsistencyMismatch {
                expected_chars: expected_final_text.chars().count(),
                actual_chars: actual.chars().count(),
            }))
        }
    }

    fn try_parse(&self, buffer: &P::Buffer, version: u64) -> Result<Arc<Tree>, EditError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.parser.parse_tree(buffer, version)))
            .map(Arc::new)
            .map_err(|payload| EditError::Rejected(panic_message(&*payload)))
    }

    /// Parse for a commit that has no further fallback; a parser panic leaves the commit
    /// without a tree.
    fn parse(&self, buffer: &P::Buffer, version: u64) -> Option<Arc<Tree>> {
        match self.try_parse(buffer, version) {
            Ok(tree) => Some(tree),
            Err(err) => {
                tracing::error!(
                    version,
                    error = %err,
                    "full parse failed; committing without a tree"
                );
                None
            }
        }
    }
}

/// Accept `buffer` only when `edit` turns `before` into `expected_final_text`.
///
/// Edits computed against an older text fail here and fall back to a full reparse.
fn check_transition<B>(
    buffer: B,
    edit: &TextEdit,
    before: &str,
    expected_final_text: &str,
) -> Result<B, FullReparseReason> {
    if edit.transforms(before, expected_final_text) {
        return Ok(buffer);
    }
    let edited_chars = (before.chars().count() + edit.inserted_text.chars().count())
        .saturating_sub(edit.length);
    Err(FullReparseReason::ConsistencyMismatch(ConsistencyMismatch {
        expected_chars: expected_final_text.chars().count(),
        actual_chars: edited_chars,
    }))
}
