use std::sync::{Mutex, MutexGuard};

use crate::engine::domain::inference_engine::EngineError;

/// Summary of one completed transcription job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobStats {
    pub segments: usize,
    /// Mean token probability across all segments; 0.0 when no tokens.
    pub mean_confidence: f32,
}

/// Shared buffer through which background-task output reaches the polling
/// consumer.
///
/// This is the only state shared between the control thread and a live
/// task, and therefore the only state carrying its own lock: a drain is
/// allowed to run while a job is still in flight.
pub struct TranscriptMailbox {
    inner: Mutex<MailboxState>,
}

#[derive(Default)]
struct MailboxState {
    text: String,
    last_outcome: Option<Result<JobStats, EngineError>>,
}

impl TranscriptMailbox {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MailboxState::default()),
        }
    }

    /// Append completed job text. Called from the background task only.
    pub fn append(&self, text: &str) {
        self.lock().text.push_str(text);
    }

    /// Move the accumulated text out, leaving the buffer empty.
    ///
    /// Never blocks on the background task; a read during a live job
    /// returns whatever completed jobs have appended so far.
    pub fn drain(&self) -> String {
        std::mem::take(&mut self.lock().text)
    }

    pub fn record_outcome(&self, outcome: Result<JobStats, EngineError>) {
        self.lock().last_outcome = Some(outcome);
    }

    /// Completion record of the most recently finished job, if any.
    pub fn last_outcome(&self) -> Option<Result<JobStats, EngineError>> {
        self.lock().last_outcome.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        // A poisoning panic can only have interrupted a push_str; the
        // buffer is still well-formed, so keep serving it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TranscriptMailbox {
    fn default() -> Self {
        Self::new()
    }
}
