/// Number of engine slots in a service unless configured otherwise.
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Hard ceiling on per-run inference threads.
pub const MAX_THREADS: usize = 16;

/// Sample rate whisper.cpp expects: mono f32 at 16 kHz.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

pub const WHISPER_MODEL_NAME: &str = "ggml-tiny.en.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin";
