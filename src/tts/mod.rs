pub mod gateway;
pub mod mode;
pub mod request;
pub mod voicevox;
