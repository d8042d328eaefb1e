// Public API for the vox-tts library

pub mod command;
pub mod config;
pub mod errors;
pub mod preset;
pub mod trace;
pub mod tts;

// Re-export commonly used types
pub use command::{command::Command, dispatcher::Dispatcher, reply::Reply};
pub use errors::{Result, VoxError};
pub use preset::{preset_id::PresetId, preset_record::PresetRecord, preset_store::PresetStore};
pub use tts::{gateway::SynthesisGateway, mode::Mode, request::SynthesisRequest};
