use std::path::{Path, PathBuf};

use thiserror::Error;

use super::run_params::RunParams;
use super::transcript_segment::TranscriptSegment;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("model not found at: {0}")]
    ModelNotFound(PathBuf),
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Domain interface for one loaded speech-to-text engine instance.
///
/// `run` blocks until inference completes and returns the produced segments
/// in order. Instances are not safe to touch while a run is in progress;
/// the service guarantees exclusive access by moving the engine into the
/// background task for the duration of the run.
pub trait InferenceEngine: Send {
    /// Clear per-run timing statistics ahead of a fresh run.
    fn reset_timings(&mut self);

    /// Transcribe normalized mono f32 samples at the engine's expected
    /// sample rate.
    fn run(
        &mut self,
        params: &RunParams,
        samples: &[f32],
    ) -> Result<Vec<TranscriptSegment>, EngineError>;
}

/// Constructs engine instances from a model file for the slot pool.
pub trait EngineFactory: Send {
    fn create(&self, model_path: &Path) -> Result<Box<dyn InferenceEngine>, EngineError>;
}
