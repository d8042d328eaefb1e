use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    errors::{constants::*, Result, VoxError},
    preset::{preset_id::PresetId, preset_store::PresetStore},
    tts::{gateway::SynthesisGateway, mode::Mode, request::SynthesisRequest},
};

use super::{command::Command, help::HELP_TEXT, reply::Reply};

/// Routes chat lines to the preset store and the synthesis gateway.
pub struct Dispatcher {
    store: Arc<PresetStore>,
    gateway: Arc<dyn SynthesisGateway>,
    audio_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(
        store: Arc<PresetStore>,
        gateway: Arc<dyn SynthesisGateway>,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            gateway,
            audio_dir: audio_dir.into(),
        }
    }

    /// Handle one inbound line. Returns `None` for lines that are not commands.
    pub async fn handle(&self, line: &str) -> Option<Reply> {
        let command = Command::parse(line)?;
        Some(self.execute(command).await)
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Help => Reply::text(HELP_TEXT),
            Command::ListPresets => self.list_presets(),
            Command::ListVoices => self.list_voices().await,
            Command::Configure { id, args } => self.configure(id, args).await,
            Command::Synthesize { id, text } => self.synthesize(&id, &text).await,
        }
    }

    fn list_presets(&self) -> Reply {
        let presets = self.store.list();
        if presets.is_empty() {
            return Reply::text("No presets saved yet.");
        }

        let mut message = String::from("📋 **Saved presets**:\n");
        for (id, record) in presets {
            let bgm = if record.bgm_enabled { "ON" } else { "OFF" };
            message.push_str(&format!(
                "• **Preset {}**: speaker={} | speed={:?} | pitch={:?} | BGM={}\n",
                id, record.speaker, record.speed_scale, record.pitch_scale, bgm
            ));
        }
        Reply::Text(message)
    }

    async fn list_voices(&self) -> Reply {
        let speakers = match self.gateway.list_voices().await {
            Ok(speakers) => speakers,
            Err(e) => {
                warn!(error = %e, "Failed to fetch voice list");
                return Reply::text("❌ Failed to fetch the voice list.");
            }
        };

        let mut message = String::from("🎙️ **Available voices**\n");
        for speaker in speakers {
            let styles = speaker
                .styles
                .iter()
                .map(|style| format!("{}({})", style.name, style.id))
                .collect::<Vec<_>>()
                .join(" ");
            message.push_str(&format!("• **{}**: {}\n", speaker.name, styles));
        }
        truncate_chars(&mut message, MAX_VOICE_LIST_LENGTH);
        Reply::Text(message)
    }

    async fn configure(&self, id: PresetId, args: Option<String>) -> Reply {
        let Some(args) = args else {
            let record = self.store.get_or_default(&id);
            return match serde_json::to_string_pretty(&record) {
                Ok(json) => Reply::Text(format!("🔍 Preset {} configuration:\n{}", id, json)),
                Err(e) => Reply::Text(format!("❌ Cannot render preset {}: {}", id, e)),
            };
        };

        // The merge holds the store lock through a file write and fsync.
        let store = Arc::clone(&self.store);
        let target = id.clone();
        let updated =
            tokio::task::spawn_blocking(move || store.merge_update_args(&target, &args)).await;
        let updated = match updated {
            Ok(updated) => updated,
            Err(e) => {
                error!(preset_id = %id, error = %e, "Preset update task failed");
                return Reply::Text(format!("❌ Preset {} could not be saved: {}", id, e));
            }
        };

        match updated {
            Ok(_) => Reply::Text(format!("✅ Preset {} updated and saved.", id)),
            Err(VoxError::InvalidInput(_)) => {
                Reply::text("❌ Invalid format. Example: /vox1config bgm=1 spd=1.1")
            }
            Err(e) => {
                error!(preset_id = %id, error = %e, "Preset update was not saved");
                Reply::Text(format!("❌ Preset {} could not be saved: {}", id, e))
            }
        }
    }

    async fn synthesize(&self, id: &PresetId, text: &str) -> Reply {
        let Some(record) = self.store.get(id) else {
            return Reply::Text(format!(
                "❌ Preset {id} is not configured. Set it up with /vox{id}config s=22 first."
            ));
        };

        let mode = Mode::detect(text);
        let request = SynthesisRequest::build(&record, text, mode);

        let audio = match self.gateway.synthesize(&request).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(preset_id = %id, error = %e, "Synthesis request failed");
                return match e.status() {
                    Some(status) => Reply::Text(format!("❌ Synthesis failed ({})", status)),
                    None => Reply::Text(format!("❌ Synthesis error: {}", e)),
                };
            }
        };

        match write_audio(&self.audio_dir, &audio).await {
            Ok(path) => {
                info!(preset_id = %id, mode = mode.as_str(), path = %path.display(), "Synthesized");
                Reply::Audio(path)
            }
            Err(e) => {
                error!(error = %e, "Failed to write audio file");
                Reply::Text(format!("❌ Synthesis error: {}", e))
            }
        }
    }
}

/// Write `audio` to a new, uniquely named file under `dir`.
async fn write_audio(dir: &Path, audio: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!(
        "{}{}.{}",
        AUDIO_FILE_PREFIX,
        Uuid::new_v4(),
        AUDIO_FILE_EXTENSION
    ));
    tokio::fs::write(&path, audio).await?;
    Ok(path)
}

fn truncate_chars(message: &mut String, max: usize) {
    if let Some((index, _)) = message.char_indices().nth(max) {
        message.truncate(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::{
        gateway::MockSynthesisGateway,
        voicevox::structs::speaker::{Speaker, Style},
    };
    use bytes::Bytes;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn id(s: &str) -> PresetId {
        s.parse().unwrap()
    }

    struct Fixture {
        dir: TempDir,
        store: Arc<PresetStore>,
        dispatcher: Dispatcher,
    }

    fn fixture(gateway: MockSynthesisGateway) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PresetStore::open(dir.path().join("presets.json")));
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), dir.path());
        Fixture {
            dir,
            store,
            dispatcher,
        }
    }

    fn no_gateway_calls() -> MockSynthesisGateway {
        let mut gateway = MockSynthesisGateway::new();
        gateway.expect_synthesize().times(0);
        gateway.expect_list_voices().times(0);
        gateway
    }

    async fn text_reply(dispatcher: &Dispatcher, line: &str) -> String {
        match dispatcher.handle(line).await {
            Some(Reply::Text(text)) => text,
            other => panic!("expected a text reply for {line:?}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrelated_traffic_is_ignored() {
        let f = fixture(no_gateway_calls());
        assert_eq!(f.dispatcher.handle("good morning").await, None);
        assert_eq!(f.dispatcher.handle("/vox").await, None);
        assert_eq!(f.dispatcher.handle("/other 1").await, None);
    }

    #[tokio::test]
    async fn test_help_is_verbatim() {
        let f = fixture(no_gateway_calls());
        assert_eq!(text_reply(&f.dispatcher, "/vox_help").await, HELP_TEXT);
    }

    #[tokio::test]
    async fn test_configure_merges_fields() {
        let f = fixture(no_gateway_calls());

        let reply = text_reply(&f.dispatcher, "/vox5config s=10 spd=1.2").await;
        assert!(reply.contains("Preset 5 updated"));

        let record = f.store.get(&id("5")).unwrap();
        assert_eq!(record.speaker, 10);
        assert_eq!(record.speed_scale, 1.2);
        assert_eq!(record.pitch_scale, 0.0);
        assert_eq!(record.intonation_scale, 1.0);
        assert_eq!(record.volume_scale, 1.0);
        assert!(!record.bgm_enabled);
        assert_eq!(record.bgm_volume, 0.35);

        text_reply(&f.dispatcher, "/vox5config bgm=on pit=0.05").await;
        let record = f.store.get(&id("5")).unwrap();
        assert_eq!(record.speaker, 10);
        assert_eq!(record.speed_scale, 1.2);
        assert_eq!(record.pitch_scale, 0.05);
        assert!(record.bgm_enabled);
    }

    #[tokio::test]
    async fn test_configure_query_mode_does_not_write() {
        let f = fixture(no_gateway_calls());

        let reply = text_reply(&f.dispatcher, "/vox3config").await;
        assert!(reply.contains("Preset 3 configuration"));
        assert!(reply.contains("\"speaker\": 22"));
        assert!(reply.contains("\"bgmVolume\": 0.35"));
        assert!(f.store.get(&id("3")).is_none());
        assert!(!f.store.path().exists());
    }

    #[tokio::test]
    async fn test_configure_malformed_arguments() {
        let f = fixture(no_gateway_calls());

        let reply = text_reply(&f.dispatcher, "/vox3config garbage").await;
        assert!(reply.contains("Invalid format"));
        assert!(f.store.get(&id("3")).is_none());
    }

    #[tokio::test]
    async fn test_configure_many_digit_id() {
        let f = fixture(no_gateway_calls());
        let digits = "9999999999999999999999999999999999";

        text_reply(&f.dispatcher, &format!("/vox{}config s=3", digits)).await;
        assert_eq!(f.store.get(&id(digits)).unwrap().speaker, 3);
        assert!(f.store.get(&id("9999999999999999999999999999999998")).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_configure_keeps_every_field() {
        let f = fixture(no_gateway_calls());
        let dispatcher = Arc::new(f.dispatcher);
        let lines = [
            "/vox8config s=12",
            "/vox8config spd=1.3",
            "/vox8config pit=-0.1",
            "/vox8config bgm=on",
        ];

        let tasks: Vec<_> = lines
            .into_iter()
            .map(|line| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move { dispatcher.handle(line).await })
            })
            .collect();
        for task in tasks {
            let reply = assert_ok!(task.await);
            assert!(matches!(reply, Some(Reply::Text(text)) if text.contains("Preset 8 updated")));
        }

        let record = PresetStore::open(f.store.path()).get(&id("8")).unwrap();
        assert_eq!(record.speaker, 12);
        assert_eq!(record.speed_scale, 1.3);
        assert_eq!(record.pitch_scale, -0.1);
        assert!(record.bgm_enabled);
        assert_eq!(f.store.get(&id("8")), Some(record));
    }

    #[tokio::test]
    async fn test_synthesize_unconfigured_preset() {
        let f = fixture(no_gateway_calls());

        let reply = text_reply(&f.dispatcher, "/vox5 Hello").await;
        assert!(reply.contains("Preset 5 is not configured"));
    }

    #[tokio::test]
    async fn test_synthesize_writes_unique_audio_files() {
        let mut gateway = MockSynthesisGateway::new();
        gateway
            .expect_synthesize()
            .withf(|request: &SynthesisRequest| {
                request.speaker == 10 && request.mode == Mode::Raw && request.text == "こんにちは"
            })
            .times(2)
            .returning(|_| Ok(Bytes::from_static(b"RIFFaudio")));
        let f = fixture(gateway);

        text_reply(&f.dispatcher, "/vox5config s=10").await;

        let mut paths = Vec::new();
        for _ in 0..2 {
            match f.dispatcher.handle("/vox5 こんにちは").await {
                Some(Reply::Audio(path)) => paths.push(path),
                other => panic!("expected audio, got {other:?}"),
            }
        }

        assert_ne!(paths[0], paths[1]);
        for path in &paths {
            assert!(path.starts_with(f.dir.path()));
            assert_eq!(assert_ok!(std::fs::read(path)), b"RIFFaudio");
        }
    }

    #[tokio::test]
    async fn test_synthesize_passes_text_verbatim() {
        let mut gateway = MockSynthesisGateway::new();
        gateway
            .expect_synthesize()
            .withf(|request: &SynthesisRequest| {
                request.text == "你好\n/vox2 x" && request.mode == Mode::PseudoJp
            })
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"RIFF")));
        let f = fixture(gateway);

        text_reply(&f.dispatcher, "/vox1config s=1").await;
        assert!(matches!(
            f.dispatcher.handle("/vox1 你好\n/vox2 x").await,
            Some(Reply::Audio(_))
        ));
    }

    #[tokio::test]
    async fn test_synthesize_gateway_status() {
        let mut gateway = MockSynthesisGateway::new();
        gateway
            .expect_synthesize()
            .times(1)
            .returning(|_| Err(VoxError::gateway_status(503, "busy")));
        let f = fixture(gateway);

        text_reply(&f.dispatcher, "/vox1config s=1").await;
        let reply = text_reply(&f.dispatcher, "/vox1 hello").await;
        assert_eq!(reply, "❌ Synthesis failed (503)");
    }

    #[tokio::test]
    async fn test_synthesize_gateway_timeout() {
        let mut gateway = MockSynthesisGateway::new();
        gateway
            .expect_synthesize()
            .times(1)
            .returning(|_| Err(VoxError::gateway_timeout(60)));
        let f = fixture(gateway);

        text_reply(&f.dispatcher, "/vox1config s=1").await;
        let reply = text_reply(&f.dispatcher, "/vox1 hello").await;
        assert!(reply.starts_with("❌ Synthesis error"));
        assert!(reply.contains("timed out"));
    }

    #[tokio::test]
    async fn test_list_presets_numeric_order() {
        let f = fixture(no_gateway_calls());
        assert_eq!(
            text_reply(&f.dispatcher, "/voxconfigls").await,
            "No presets saved yet."
        );

        text_reply(&f.dispatcher, "/vox10config s=7 bgm=1").await;
        text_reply(&f.dispatcher, "/vox2config s=3").await;

        let reply = text_reply(&f.dispatcher, "/voxconfigls").await;
        let two = reply.find("Preset 2**").unwrap();
        let ten = reply.find("Preset 10**").unwrap();
        assert!(two < ten);
        assert!(reply.contains("speaker=7 | speed=1.0 | pitch=0.0 | BGM=ON"));
        assert!(reply.contains("speaker=3 | speed=1.0 | pitch=0.0 | BGM=OFF"));
    }

    #[tokio::test]
    async fn test_list_voices() {
        let mut gateway = MockSynthesisGateway::new();
        gateway.expect_list_voices().times(1).returning(|| {
            Ok(vec![Speaker {
                name: "ずんだもん".to_string(),
                styles: vec![
                    Style {
                        name: "ノーマル".to_string(),
                        id: 3,
                    },
                    Style {
                        name: "ささやき".to_string(),
                        id: 38,
                    },
                ],
            }])
        });
        let f = fixture(gateway);

        let reply = text_reply(&f.dispatcher, "/vox_list").await;
        assert!(reply.contains("ずんだもん"));
        assert!(reply.contains("ノーマル(3)"));
        assert!(reply.contains("ささやき(38)"));
    }

    #[tokio::test]
    async fn test_list_voices_is_truncated() {
        let mut gateway = MockSynthesisGateway::new();
        gateway.expect_list_voices().times(1).returning(|| {
            Ok((0..500)
                .map(|i| Speaker {
                    name: format!("キャラクター{}", i),
                    styles: vec![Style {
                        name: "ノーマル".to_string(),
                        id: i,
                    }],
                })
                .collect())
        });
        let f = fixture(gateway);

        let reply = text_reply(&f.dispatcher, "/vox_list").await;
        assert_eq!(reply.chars().count(), MAX_VOICE_LIST_LENGTH);
    }

    #[tokio::test]
    async fn test_list_voices_failure() {
        let mut gateway = MockSynthesisGateway::new();
        gateway
            .expect_list_voices()
            .times(1)
            .returning(|| Err(VoxError::gateway_status(500, "")));
        let f = fixture(gateway);

        let reply = text_reply(&f.dispatcher, "/vox_list").await;
        assert!(reply.contains("Failed to fetch the voice list"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        let mut message = "あいうえお".to_string();
        truncate_chars(&mut message, 3);
        assert_eq!(message, "あいう");

        let mut short = "abc".to_string();
        truncate_chars(&mut short, 10);
        assert_eq!(short, "abc");
    }
}
