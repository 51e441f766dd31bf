use std::path::Path;
use std::time::{Duration, Instant};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::engine::domain::inference_engine::{EngineError, EngineFactory, InferenceEngine};
use crate::engine::domain::run_params::RunParams;
use crate::engine::domain::transcript_segment::TranscriptSegment;

/// Inference engine backed by whisper.cpp via whisper-rs.
///
/// Holds one loaded model context; each run gets a fresh decoding state.
pub struct WhisperEngine {
    ctx: WhisperContext,
    last_run: Option<Duration>,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("last_run", &self.last_run)
            .finish_non_exhaustive()
    }
}

impl WhisperEngine {
    pub fn from_model(model_path: &Path) -> Result<Self, EngineError> {
        if !model_path.exists() {
            return Err(EngineError::ModelNotFound(model_path.to_path_buf()));
        }
        let path = model_path
            .to_str()
            .ok_or_else(|| EngineError::ModelLoad("model path is not valid UTF-8".to_string()))?;
        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| EngineError::ModelLoad(e.to_string()))?;
        Ok(Self {
            ctx,
            last_run: None,
        })
    }

    /// Wall-clock duration of the most recent run, if one has happened
    /// since the last timing reset.
    pub fn last_run(&self) -> Option<Duration> {
        self.last_run
    }
}

impl InferenceEngine for WhisperEngine {
    fn reset_timings(&mut self) {
        self.last_run = None;
    }

    fn run(
        &mut self,
        params: &RunParams,
        samples: &[f32],
    ) -> Result<Vec<TranscriptSegment>, EngineError> {
        let started = Instant::now();

        let mut full_params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        full_params.set_language(Some(params.language.as_str()));
        full_params.set_translate(params.translate);
        full_params.set_print_special(false);
        full_params.set_print_progress(false);
        full_params.set_print_realtime(false);
        full_params.set_print_timestamps(false);
        full_params.set_n_threads(params.n_threads as i32);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| EngineError::Inference(format!("failed to create state: {e}")))?;
        state
            .full(full_params, samples)
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        let mut segments = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let text = match segment.to_str() {
                Ok(t) => t.to_string(),
                Err(_) => continue,
            };

            let n_tokens = segment.n_tokens();
            let mut probabilities = Vec::new();
            for tok_idx in 0..n_tokens {
                if let Some(token) = segment.get_token(tok_idx) {
                    probabilities.push(token.token_probability());
                }
            }

            segments.push(TranscriptSegment::new(text, probabilities));
        }

        self.last_run = Some(started.elapsed());
        Ok(segments)
    }
}

/// Creates `WhisperEngine` instances for the slot pool.
pub struct WhisperEngineFactory;

impl EngineFactory for WhisperEngineFactory {
    fn create(&self, model_path: &Path) -> Result<Box<dyn InferenceEngine>, EngineError> {
        Ok(Box::new(WhisperEngine::from_model(model_path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_model_nonexistent_path_returns_error() {
        let result = WhisperEngine::from_model(Path::new("/nonexistent/model.bin"));
        assert!(matches!(result, Err(EngineError::ModelNotFound(_))));
    }

    #[test]
    fn test_from_model_nonexistent_path_error_message() {
        let err = WhisperEngine::from_model(Path::new("/nonexistent/model.bin")).unwrap_err();
        assert!(
            err.to_string().contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }

    #[test]
    fn test_factory_propagates_load_failure() {
        let result = WhisperEngineFactory.create(Path::new("/nonexistent/model.bin"));
        assert!(result.is_err());
    }

    #[test]
    #[ignore] // Requires the whisper model file (downloads on first use)
    fn test_run_does_not_crash_on_sine_wave() {
        let model_path = crate::shared::model_resolver::resolve(
            crate::shared::constants::WHISPER_MODEL_NAME,
            crate::shared::constants::WHISPER_MODEL_URL,
            None,
        )
        .expect("Failed to resolve whisper model");

        let mut engine = WhisperEngine::from_model(&model_path).expect("Failed to load model");

        let sample_rate = crate::shared::constants::WHISPER_SAMPLE_RATE;
        let len = (3.0 * sample_rate as f64) as usize;
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32
            })
            .collect();

        let result = engine.run(&RunParams::new(2), &samples);
        assert!(result.is_ok(), "Inference should not error: {result:?}");
        assert!(engine.last_run().is_some());
    }
}
