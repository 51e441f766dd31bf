pub mod inference_engine;
pub mod run_params;
pub mod transcript_segment;
