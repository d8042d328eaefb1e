use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use vox_tts::{
    config::Config,
    errors::constants::DEFAULT_CONFIG_PATH,
    trace::init_tracing_subscriber,
    tts::voicevox::voicevox::VOICEVOX,
    Dispatcher, PresetStore, Reply,
};

/// Line-oriented host: each stdin line is one chat message, replies go to stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load(DEFAULT_CONFIG_PATH).context("Cannot load configuration")?;
    let _guard = init_tracing_subscriber(&config.otel_http_url)?;

    let store = Arc::new(PresetStore::open(config.presets_path()));
    let voicevox = Arc::new(VOICEVOX::from_config(&config));
    let dispatcher = Dispatcher::new(store, voicevox, config.data_dir.clone());

    info!(base_url = %config.base_url, "vox-tts ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match dispatcher.handle(&line).await {
            Some(Reply::Text(text)) => println!("{}", text),
            Some(Reply::Audio(path)) => println!("[audio] {}", path.display()),
            None => {}
        }
    }

    Ok(())
}
