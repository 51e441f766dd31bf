use crate::shared::constants::MAX_THREADS;

/// Immutable per-run parameter snapshot.
///
/// Captured by value when a job is submitted so later configuration changes
/// cannot affect an in-flight run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunParams {
    pub n_threads: usize,
    pub language: String,
    pub translate: bool,
}

impl RunParams {
    /// Default English transcription parameters with `requested_threads`
    /// resolved against the hardware ceiling.
    pub fn new(requested_threads: i32) -> Self {
        Self {
            n_threads: resolve_thread_count(requested_threads),
            language: "en".to_string(),
            translate: false,
        }
    }
}

/// Resolve a requested thread count against the hardware ceiling.
///
/// The ceiling is `min(16, largest power of two <= detected parallelism)`.
/// Any request below 1 (conventionally -1) means "use the ceiling";
/// explicit requests are capped by it.
pub fn resolve_thread_count(requested: i32) -> usize {
    let hardware = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let ceiling = MAX_THREADS.min(pow2_floor(hardware));

    if requested < 1 {
        ceiling
    } else {
        (requested as usize).min(ceiling)
    }
}

/// Largest power of two not exceeding `n` (1 when `n` is 0 or 1).
fn pow2_floor(n: usize) -> usize {
    let mut p = 1;
    while p * 2 <= n {
        p *= 2;
    }
    p
}
