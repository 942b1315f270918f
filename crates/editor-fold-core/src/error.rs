use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Misuse of a [`ParseStateStore`](crate::ParseStateStore). Always returned to the caller.
pub enum PreconditionError {
    #[error("parse state store is already initialized (version {version})")]
    /// `initialize` was called on a store that already holds a document.
    AlreadyInitialized {
        /// Version of the state that was already committed.
        version: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An incremental buffer edit failed.
///
/// Stores recover from these by reparsing the expected text from scratch; they are never
/// surfaced through [`ParseStateStore::apply_edit`](crate::ParseStateStore::apply_edit).
pub enum EditError {
    #[error("edit range {offset}..{end} is out of bounds for a buffer of {len} chars")]
    /// The edited range does not fit the buffer.
    OutOfBounds {
        /// Edit start offset.
        offset: usize,
        /// Exclusive edit end offset.
        end: usize,
        /// Buffer length in characters.
        len: usize,
    },

    #[error("parser rejected the edit: {0}")]
    /// The parser failed for a reason of its own.
    Rejected(String),
}

#[derive(Debug, Error)]
/// Loading or saving folding descriptors failed.
pub enum DescriptorError {
    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("descriptor encoding error: {0}")]
    /// The stored list could not be decoded or encoded.
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// A [`FoldingSink`](crate::FoldingSink) failed to apply folding ranges.
pub enum UiError {
    #[error("editor {0} is no longer open")]
    /// The target editor was closed before the ranges arrived.
    EditorClosed(u64),

    #[error("{0}")]
    /// Any other failure reported by the UI layer.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Applying folding ranges on the UI runtime failed.
///
/// Reported through the dispatcher's diagnostic channel; never propagated synchronously.
pub enum UiDispatchFailure {
    #[error("applying folding ranges to editor {editor} failed: {source}")]
    /// The sink returned an error.
    Sink {
        /// Target editor id.
        editor: u64,
        /// Error reported by the sink.
        source: UiError,
    },

    #[error("applying folding ranges to editor {editor} panicked: {message}")]
    /// The sink panicked on the UI runtime.
    Panicked {
        /// Target editor id.
        editor: u64,
        /// Panic payload, when it was a string.
        message: String,
    },

    #[error("UI runtime dropped the folding update for editor {editor}")]
    /// The UI task was cancelled before it completed (runtime shut down).
    Cancelled {
        /// Target editor id.
        editor: u64,
    },
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
