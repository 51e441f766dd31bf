pub mod engine_pool;
pub mod error;
pub mod job_runner;
pub mod mailbox;
pub mod transcription_service;
