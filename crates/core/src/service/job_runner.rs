use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::domain::inference_engine::InferenceEngine;
use crate::engine::domain::run_params::RunParams;
use crate::engine::domain::transcript_segment::mean_confidence;

use super::engine_pool::EnginePool;
use super::mailbox::{JobStats, TranscriptMailbox};

/// Owns the zero-or-one in-flight background transcription task.
///
/// Single-flight discipline: a new task may only be spawned after the
/// previous one has been joined, and every pool mutation joins first.
/// The join is the sole synchronization between the control thread and
/// the task; the task returns the engine it borrowed so the join can put
/// it back into its slot.
pub struct JobRunner {
    in_flight: Option<InFlightJob>,
}

struct InFlightJob {
    slot_index: usize,
    handle: JoinHandle<Box<dyn InferenceEngine>>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self { in_flight: None }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Block until any previous task has fully completed, mailbox append
    /// included, and return its engine to the pool.
    pub fn join_pending(&mut self, pool: &mut EnginePool) {
        if let Some(job) = self.in_flight.take() {
            match job.handle.join() {
                Ok(engine) => pool.restore(job.slot_index, engine),
                Err(_) => {
                    // The engine went down with the panicking thread; the
                    // slot stays empty and must be re-initialized.
                    log::warn!(
                        "transcription task panicked; slot {} left empty",
                        job.slot_index + 1
                    );
                }
            }
        }
    }

    /// Spawn the background task for one run.
    ///
    /// The caller must already have joined any previous task and taken
    /// `engine` out of slot `slot_index`.
    pub fn spawn(
        &mut self,
        slot_index: usize,
        mut engine: Box<dyn InferenceEngine>,
        params: RunParams,
        samples: Vec<f32>,
        mailbox: Arc<TranscriptMailbox>,
    ) {
        debug_assert!(self.in_flight.is_none(), "previous task not joined");

        let handle = thread::spawn(move || {
            engine.reset_timings();
            match engine.run(&params, &samples) {
                Ok(segments) => {
                    let mut text = String::new();
                    for segment in &segments {
                        text.push_str(&segment.text);
                    }
                    let stats = JobStats {
                        segments: segments.len(),
                        mean_confidence: mean_confidence(&segments),
                    };
                    log::debug!(
                        "slot {} produced {} segment(s), mean confidence {:.3}",
                        slot_index + 1,
                        stats.segments,
                        stats.mean_confidence
                    );
                    mailbox.append(&text);
                    mailbox.record_outcome(Ok(stats));
                }
                Err(e) => {
                    log::warn!("transcription failed on slot {}: {e}", slot_index + 1);
                    mailbox.record_outcome(Err(e));
                }
            }
            engine
        });

        self.in_flight = Some(InFlightJob { slot_index, handle });
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::engine::domain::inference_engine::EngineError;
    use crate::engine::domain::transcript_segment::TranscriptSegment;

    struct ScriptedEngine {
        result: Result<Vec<TranscriptSegment>, EngineError>,
    }

    impl ScriptedEngine {
        fn ok(segments: Vec<TranscriptSegment>) -> Box<Self> {
            Box::new(Self {
                result: Ok(segments),
            })
        }
    }

    impl InferenceEngine for ScriptedEngine {
        fn reset_timings(&mut self) {}

        fn run(
            &mut self,
            _params: &RunParams,
            _samples: &[f32],
        ) -> Result<Vec<TranscriptSegment>, EngineError> {
            self.result.clone()
        }
    }

    #[test]
    fn test_join_restores_engine_to_its_slot() {
        let mut pool = EnginePool::new(2);
        let mut runner = JobRunner::new();
        let mailbox = Arc::new(TranscriptMailbox::new());

        let engine = ScriptedEngine::ok(vec![TranscriptSegment::new("hi", vec![0.8])]);
        runner.spawn(1, engine, RunParams::new(1), vec![0.0; 16], mailbox.clone());
        assert!(runner.is_running());

        runner.join_pending(&mut pool);
        assert!(!runner.is_running());
        assert!(pool.is_occupied(2));
        assert_eq!(mailbox.drain(), "hi");
    }

    #[test]
    fn test_task_records_stats() {
        let mut pool = EnginePool::new(1);
        let mut runner = JobRunner::new();
        let mailbox = Arc::new(TranscriptMailbox::new());

        let engine = ScriptedEngine::ok(vec![
            TranscriptSegment::new("a", vec![0.4, 0.6]),
            TranscriptSegment::new("b", vec![0.5]),
        ]);
        runner.spawn(0, engine, RunParams::new(1), Vec::new(), mailbox.clone());
        runner.join_pending(&mut pool);

        let stats = mailbox.last_outcome().unwrap().unwrap();
        assert_eq!(stats.segments, 2);
        assert_relative_eq!(stats.mean_confidence, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_failed_run_records_error_and_keeps_text_empty() {
        let mut pool = EnginePool::new(1);
        let mut runner = JobRunner::new();
        let mailbox = Arc::new(TranscriptMailbox::new());

        let engine = Box::new(ScriptedEngine {
            result: Err(EngineError::Inference("decoder blew up".to_string())),
        });
        runner.spawn(0, engine, RunParams::new(1), Vec::new(), mailbox.clone());
        runner.join_pending(&mut pool);

        assert_eq!(mailbox.drain(), "");
        assert!(mailbox.last_outcome().unwrap().is_err());
        // The engine survives a failed run and goes back into its slot.
        assert!(pool.is_occupied(1));
    }

    #[test]
    fn test_join_with_no_task_is_noop() {
        let mut pool = EnginePool::new(1);
        let mut runner = JobRunner::new();
        runner.join_pending(&mut pool);
        assert!(!runner.is_running());
    }
}
