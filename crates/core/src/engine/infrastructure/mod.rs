pub mod whisper_engine;
