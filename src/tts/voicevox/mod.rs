pub mod structs;
pub mod voicevox;
