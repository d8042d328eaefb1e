use serde::{Deserialize, Serialize};

use crate::{errors::constants::*, preset::preset_record::PresetRecord};

use super::mode::Mode;

/// Body of a synthesis call.
///
/// Example:
/// ```rust
/// use vox_tts::{preset::preset_record::PresetRecord, tts::{mode::Mode, request::SynthesisRequest}};
///
/// let text = "こんにちは";
/// let request = SynthesisRequest::build(&PresetRecord::default(), text, Mode::detect(text));
/// assert_eq!(request.mode, Mode::Raw);
/// assert_eq!(request.output_sampling_rate, 24000);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker: i64,
    pub mode: Mode,
    pub speed_scale: f64,
    pub pitch_scale: f64,
    pub intonation_scale: f64,
    pub volume_scale: f64,
    pub pre_phoneme_length: f64,
    pub post_phoneme_length: f64,
    pub output_sampling_rate: u32,
    pub output_stereo: bool,
    pub kana: String,
    pub bgm_enabled: bool,
    pub bgm_volume: f64,
}

impl SynthesisRequest {
    /// Values are passed through unchecked; the backend decides what it accepts.
    pub fn build(record: &PresetRecord, text: &str, mode: Mode) -> Self {
        Self {
            text: text.to_string(),
            speaker: record.speaker,
            mode,
            speed_scale: record.speed_scale,
            pitch_scale: record.pitch_scale,
            intonation_scale: record.intonation_scale,
            volume_scale: record.volume_scale,
            pre_phoneme_length: PHONEME_PADDING_SECS,
            post_phoneme_length: PHONEME_PADDING_SECS,
            output_sampling_rate: OUTPUT_SAMPLING_RATE,
            output_stereo: false,
            kana: String::new(),
            bgm_enabled: record.bgm_enabled,
            bgm_volume: record.bgm_volume,
        }
    }
}
