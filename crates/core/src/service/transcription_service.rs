use std::path::Path;
use std::sync::Arc;

use crate::engine::domain::inference_engine::{EngineError, EngineFactory};
use crate::engine::domain::run_params::RunParams;
use crate::shared::constants::DEFAULT_POOL_CAPACITY;

use super::engine_pool::EnginePool;
use super::error::{InitError, TranscribeError};
use super::job_runner::JobRunner;
use super::mailbox::{JobStats, TranscriptMailbox};

/// Owned transcription service: a fixed-capacity engine pool, a
/// single-flight job runner, and a drain-on-read mailbox.
///
/// Every operation that touches the pool — `init`, `free`, `transcribe` —
/// first blocks until any previous background job has fully finished.
/// This join-before-mutate discipline is the service's only concurrency
/// guard besides the mailbox lock, and it gives background jobs a strict
/// total order: job k+1 never starts before job k has appended its text.
///
/// The mailbox is one stream per service, not per slot; jobs from
/// different slots concatenate into it in completion order. Callers
/// needing isolated streams run separate service instances.
pub struct TranscriptionService {
    pool: EnginePool,
    runner: JobRunner,
    mailbox: Arc<TranscriptMailbox>,
    factory: Box<dyn EngineFactory>,
}

impl TranscriptionService {
    pub fn new(factory: Box<dyn EngineFactory>) -> Self {
        Self::with_capacity(factory, DEFAULT_POOL_CAPACITY)
    }

    pub fn with_capacity(factory: Box<dyn EngineFactory>, capacity: usize) -> Self {
        Self {
            pool: EnginePool::new(capacity),
            runner: JobRunner::new(),
            mailbox: Arc::new(TranscriptMailbox::new()),
            factory,
        }
    }

    /// Load an engine for `model_path` into the first free slot and return
    /// its 1-based handle.
    pub fn init(&mut self, model_path: &Path) -> Result<usize, InitError> {
        self.runner.join_pending(&mut self.pool);

        let handle = self.pool.acquire(self.factory.as_ref(), model_path)?;
        log::info!("loaded engine into slot {handle}");
        Ok(handle)
    }

    /// Destroy the engine at `handle`. A no-op for out-of-range handles
    /// and already-empty slots.
    pub fn free(&mut self, handle: usize) {
        self.runner.join_pending(&mut self.pool);
        self.pool.release(handle);
    }

    /// Submit `samples` for background transcription on `handle`.
    ///
    /// Returns as soon as the job is spawned; completion is observed by
    /// polling [`get_text`](Self::get_text) or by the implicit join of the
    /// next operation. `threads < 1` selects the hardware ceiling.
    /// Ownership of `samples` moves into the job.
    pub fn transcribe(
        &mut self,
        handle: usize,
        samples: Vec<f32>,
        threads: i32,
    ) -> Result<(), TranscribeError> {
        self.runner.join_pending(&mut self.pool);

        if !self.pool.contains(handle) {
            return Err(TranscribeError::InvalidHandle(handle));
        }
        let engine = self
            .pool
            .take_engine(handle)
            .ok_or(TranscribeError::UnoccupiedHandle(handle))?;

        let params = RunParams::new(threads);
        log::debug!(
            "submitting {} samples to slot {handle} with {} thread(s)",
            samples.len(),
            params.n_threads
        );
        self.runner
            .spawn(handle - 1, engine, params, samples, self.mailbox.clone());
        Ok(())
    }

    /// Drain the accumulated transcript, leaving the mailbox empty.
    ///
    /// Never blocks on a running job; text from a job that has not yet
    /// completed is simply not there yet.
    pub fn get_text(&self) -> String {
        self.mailbox.drain()
    }

    /// Completion record of the most recently finished job, if any.
    pub fn last_outcome(&self) -> Option<Result<JobStats, EngineError>> {
        self.mailbox.last_outcome()
    }

    /// Block until any in-flight job has fully completed.
    pub fn wait_idle(&mut self) {
        self.runner.join_pending(&mut self.pool);
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn occupied_count(&self) -> usize {
        self.pool.occupied_count()
    }
}
