use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use scribe_core::engine::infrastructure::whisper_engine::WhisperEngineFactory;
use scribe_core::service::transcription_service::TranscriptionService;
use scribe_core::shared::constants::{
    WHISPER_MODEL_NAME, WHISPER_MODEL_URL, WHISPER_SAMPLE_RATE,
};
use scribe_core::shared::model_resolver;

/// Transcribe WAV audio with a pooled whisper.cpp engine.
#[derive(Parser)]
#[command(name = "scribe")]
struct Cli {
    /// Input WAV files, transcribed in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path to a ggml whisper model (downloads tiny.en when omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Inference threads (-1 = auto-detect).
    #[arg(long, default_value = "-1")]
    threads: i32,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let model_path = match cli.model {
        Some(path) => path,
        None => {
            log::info!("resolving model {WHISPER_MODEL_NAME}");
            model_resolver::resolve(
                WHISPER_MODEL_NAME,
                WHISPER_MODEL_URL,
                Some(Box::new(|downloaded, total| {
                    log::debug!("downloaded {downloaded}/{total} bytes");
                })),
            )?
        }
    };

    let mut service = TranscriptionService::new(Box::new(WhisperEngineFactory));
    let handle = service.init(&model_path)?;

    for input in &cli.inputs {
        let samples = load_wav(input)?;
        log::info!(
            "transcribing {} ({:.1}s of audio)",
            input.display(),
            samples.len() as f64 / WHISPER_SAMPLE_RATE as f64
        );

        service.transcribe(handle, samples, cli.threads)?;
        service.wait_idle();

        match service.last_outcome() {
            Some(Ok(stats)) => log::info!(
                "{} segment(s), mean confidence {:.2}",
                stats.segments,
                stats.mean_confidence
            ),
            Some(Err(e)) => return Err(format!("{}: {e}", input.display()).into()),
            None => {}
        }

        println!("{}", service.get_text().trim());
    }

    Ok(())
}

/// Load a WAV file as normalized mono f32 samples.
///
/// Stereo input is downmixed by averaging channels. The sample rate is not
/// converted; anything other than 16 kHz gets a warning since the engine
/// expects 16 kHz mono.
fn load_wav(path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => {
            reader.samples::<f32>().collect::<Result<_, _>>()?
        }
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<Result<_, _>>()?,
        (format, bits) => {
            return Err(format!("unsupported WAV format: {bits}-bit {format:?}").into())
        }
    };

    let samples = match spec.channels {
        1 => samples,
        2 => samples
            .chunks_exact(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect(),
        n => return Err(format!("unsupported channel count: {n}").into()),
    };

    if spec.sample_rate != WHISPER_SAMPLE_RATE {
        log::warn!(
            "{} is {} Hz but the engine expects {} Hz; results may be poor",
            path.display(),
            spec.sample_rate,
            WHISPER_SAMPLE_RATE
        );
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: WHISPER_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_wav_mono_i16_normalizes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mono.wav");
        write_wav(&path, 1, &[0, 16384, -16384]);

        let samples = load_wav(&path).unwrap();
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!((samples[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_load_wav_stereo_downmixes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stereo.wav");
        // Two frames: (L, R) pairs that average to 0.
        write_wav(&path, 2, &[16384, -16384, 8192, -8192]);

        let samples = load_wav(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn test_load_wav_missing_file_errors() {
        assert!(load_wav(Path::new("/nonexistent/audio.wav")).is_err());
    }
}
