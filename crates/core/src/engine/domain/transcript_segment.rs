/// A contiguous span of recognized speech produced by one inference run.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Per-token confidence in [0, 1], in token order.
    pub token_probabilities: Vec<f32>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, token_probabilities: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            token_probabilities,
        }
    }
}

/// Arithmetic mean of all token probabilities across `segments`.
/// 0.0 when no tokens were produced.
pub fn mean_confidence(segments: &[TranscriptSegment]) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for segment in segments {
        for p in &segment.token_probabilities {
            sum += p;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}
