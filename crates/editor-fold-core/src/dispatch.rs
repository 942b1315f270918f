//! Hand-off of folding ranges to the UI runtime.
//!
//! Applying ranges is confined to the UI runtime (typically a current-thread tokio runtime
//! driving the editor). [`UiDispatcher::dispatch`] spawns the [`FoldingSink`] call there and
//! returns immediately. Failures, including panics inside the sink, are logged, sent to the
//! dispatcher's diagnostic channel, and made observable through the returned
//! [`DispatchHandle`]; they never propagate back into the initiating flow.

use crate::error::{UiDispatchFailure, panic_message};
use crate::range::FoldingRange;
use crate::sink::{EditorHandle, FoldingSink};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

/// Receiving end of the diagnostic channel.
pub type DiagnosticReceiver = mpsc::UnboundedReceiver<UiDispatchFailure>;

/// Schedules folding updates on the UI runtime.
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    runtime: Handle,
    diagnostics: mpsc::UnboundedSender<UiDispatchFailure>,
}

impl UiDispatcher {
    /// Create a dispatcher for the runtime behind `runtime`, with its diagnostic channel.
    pub fn new(runtime: Handle) -> (Self, DiagnosticReceiver) {
        let (diagnostics, receiver) = mpsc::unbounded_channel();
        (
            Self {
                runtime,
                diagnostics,
            },
            receiver,
        )
    }

    /// Apply `ranges` to `editor` through `sink` on the UI runtime.
    pub fn dispatch(
        &self,
        sink: Arc<dyn FoldingSink>,
        editor: EditorHandle,
        ranges: Vec<FoldingRange>,
    ) -> DispatchHandle {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let diagnostics = self.diagnostics.clone();
        let count = ranges.len();

        let apply = self
            .runtime
            .spawn(async move { sink.apply_folding_ranges(editor, ranges) });

        self.runtime.spawn(async move {
            let outcome = match apply.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(source)) => Err(UiDispatchFailure::Sink {
                    editor: editor.0,
                    source,
                }),
                Err(err) if err.is_panic() => Err(UiDispatchFailure::Panicked {
                    editor: editor.0,
                    message: panic_message(&*err.into_panic()),
                }),
                Err(_) => Err(UiDispatchFailure::Cancelled { editor: editor.0 }),
            };

            match &outcome {
                Ok(()) => tracing::trace!(%editor, ranges = count, "applied folding ranges"),
                Err(failure) => {
                    tracing::error!(
                        %editor,
                        error = %failure,
                        "folding update failed on the UI runtime"
                    );
                    // A dropped receiver only means nobody listens for diagnostics.
                    let _ = diagnostics.send(failure.clone());
                }
            }
            let _ = outcome_tx.send(outcome);
        });

        DispatchHandle {
            editor,
            outcome: outcome_rx,
        }
    }
}

/// Observes the outcome of one dispatched folding update.
///
/// Dropping the handle does not cancel the update.
#[derive(Debug)]
pub struct DispatchHandle {
    editor: EditorHandle,
    outcome: oneshot::Receiver<Result<(), UiDispatchFailure>>,
}

impl DispatchHandle {
    /// Target editor.
    pub fn editor(&self) -> EditorHandle {
        self.editor
    }

    /// Wait for the update to finish.
    pub async fn outcome(self) -> Result<(), UiDispatchFailure> {
        self.outcome.await.unwrap_or(Err(UiDispatchFailure::Cancelled {
            editor: self.editor.0,
        }))
    }

    /// Block the current thread until the update finishes.
    ///
    /// Must not be called from within an async context.
    pub fn blocking_outcome(self) -> Result<(), UiDispatchFailure> {
        self.outcome
            .blocking_recv()
            .unwrap_or(Err(UiDispatchFailure::Cancelled {
                editor: self.editor.0,
            }))
    }
}
