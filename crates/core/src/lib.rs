//! Slot-pooled speech transcription around whisper.cpp.
//!
//! A [`service::transcription_service::TranscriptionService`] owns a
//! fixed-capacity pool of inference engines, runs at most one background
//! transcription job at a time, and hands completed text to a polling
//! consumer through a drain-on-read mailbox.

pub mod engine;
pub mod service;
pub mod shared;
