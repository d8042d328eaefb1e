use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::constants::*;

/// Synthesis parameters stored for one preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetRecord {
    pub speaker: i64,
    pub speed_scale: f64,
    pub pitch_scale: f64,
    pub intonation_scale: f64,
    pub volume_scale: f64,
    pub bgm_enabled: bool,
    pub bgm_volume: f64,
}

impl Default for PresetRecord {
    fn default() -> Self {
        Self {
            speaker: DEFAULT_SPEAKER,
            speed_scale: DEFAULT_SPEED_SCALE,
            pitch_scale: DEFAULT_PITCH_SCALE,
            intonation_scale: DEFAULT_INTONATION_SCALE,
            volume_scale: DEFAULT_VOLUME_SCALE,
            bgm_enabled: DEFAULT_BGM_ENABLED,
            bgm_volume: DEFAULT_BGM_VOLUME,
        }
    }
}

/// A record field addressable from a configure command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetField {
    Speaker,
    SpeedScale,
    PitchScale,
    IntonationScale,
    VolumeScale,
    BgmEnabled,
    BgmVolume,
}

impl PresetField {
    pub const ALL: [PresetField; 7] = [
        PresetField::Speaker,
        PresetField::SpeedScale,
        PresetField::PitchScale,
        PresetField::IntonationScale,
        PresetField::VolumeScale,
        PresetField::BgmEnabled,
        PresetField::BgmVolume,
    ];

    /// Resolve a short alias (`s`, `spd`, `pit`, `int`, `vol`, `bgm`, `bgmv`), ignoring case.
    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.alias().eq_ignore_ascii_case(alias))
    }

    pub fn alias(self) -> &'static str {
        match self {
            PresetField::Speaker => "s",
            PresetField::SpeedScale => "spd",
            PresetField::PitchScale => "pit",
            PresetField::IntonationScale => "int",
            PresetField::VolumeScale => "vol",
            PresetField::BgmEnabled => "bgm",
            PresetField::BgmVolume => "bgmv",
        }
    }

    /// Field name as written in the preset file.
    pub fn key(self) -> &'static str {
        match self {
            PresetField::Speaker => "speaker",
            PresetField::SpeedScale => "speedScale",
            PresetField::PitchScale => "pitchScale",
            PresetField::IntonationScale => "intonationScale",
            PresetField::VolumeScale => "volumeScale",
            PresetField::BgmEnabled => "bgmEnabled",
            PresetField::BgmVolume => "bgmVolume",
        }
    }
}

impl PresetRecord {
    /// Coerce `raw` to the field's type and store it.
    ///
    /// Returns `false` and leaves the record untouched when the value does not coerce.
    pub fn apply(&mut self, field: PresetField, raw: &str) -> bool {
        match field {
            PresetField::Speaker => match raw.parse::<i64>() {
                Ok(speaker) => self.speaker = speaker,
                Err(_) => return false,
            },
            PresetField::BgmEnabled => self.bgm_enabled = parse_flag(raw),
            _ => match parse_scale(raw) {
                Some(value) => *self.scale_mut(field) = value,
                None => return false,
            },
        }
        true
    }

    fn scale_mut(&mut self, field: PresetField) -> &mut f64 {
        match field {
            PresetField::SpeedScale => &mut self.speed_scale,
            PresetField::PitchScale => &mut self.pitch_scale,
            PresetField::IntonationScale => &mut self.intonation_scale,
            PresetField::VolumeScale => &mut self.volume_scale,
            _ => &mut self.bgm_volume,
        }
    }

    /// Build a record from loosely typed JSON, defaulting anything missing or unusable.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut record = Self::default();

        for field in PresetField::ALL {
            let Some(raw) = object.get(field.key()) else {
                continue;
            };
            match field {
                PresetField::Speaker => {
                    if let Some(speaker) = value_as_int(raw) {
                        record.speaker = speaker;
                    }
                }
                PresetField::BgmEnabled => {
                    if let Some(flag) = value_as_flag(raw) {
                        record.bgm_enabled = flag;
                    }
                }
                _ => {
                    if let Some(scale) = value_as_scale(raw) {
                        *record.scale_mut(field) = scale;
                    }
                }
            }
        }

        Some(record)
    }
}

fn parse_flag(raw: &str) -> bool {
    ["true", "1", "on"]
        .iter()
        .any(|token| token.eq_ignore_ascii_case(raw))
}

fn parse_scale(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| is_whole_i64(*f)).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whole numbers in `[-2^63, 2^63)`; `as` would saturate anything outside.
fn is_whole_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn value_as_scale(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_scale(s.trim()),
        _ => None,
    }
}

fn value_as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => Some(parse_flag(s.trim())),
        _ => None,
    }
}
