/// Returned verbatim for `/vox_help`.
pub const HELP_TEXT: &str = "\
# VOICEVOX preset guide

Any number of numbered presets can be stored. Chinese text is rendered with pseudo-Japanese \
phonetics, Japanese kana text is read natively.

### 1. Configure a preset
**Command**: `/vox<N>config [key=value ...]`
- **Show current**: `/vox1config` (no arguments)
- **Incremental update**: `/vox1config bgm=1 pit=0.05` (only BGM and pitch change)

**Keys**:
| Key | Field | Meaning | Suggested range |
| :--- | :--- | :--- | :--- |
| `s` | `speaker` | Voice id | see `/vox_list` |
| `bgm` | `bgmEnabled` | Background music | `1` (on) / `0` (off) |
| `bgmv` | `bgmVolume` | Background music volume | `0.2 ~ 0.45` |
| `pit` | `pitchScale` | Pitch | `-0.15 ~ 0.15` |
| `spd` | `speedScale` | Speed | `0.8 ~ 1.4` |
| `int` | `intonationScale` | Intonation | `0.8 ~ 1.3` |
| `vol` | `volumeScale` | Voice volume | `0.8 ~ 1.4` |

### 2. Synthesize
**Command**: `/vox<N> <text>`
- Example: `/vox1 这是一个全参数预设测试。`

### 3. List presets
**Command**: `/voxconfigls`
- Shows every saved preset with its main parameters.

### 4. List voices
**Command**: `/vox_list`
- Shows every character and style id offered by the backend.

### 5. Templates
- **Zundamon whisper**: `/vox1config s=38 spd=1.2 bgm=1 bgmv=0.25`
- **Shikoku Metan low voice**: `/vox2config s=36 spd=1.1 vol=1.2`

### 6. Modes
- **pseudo_jp**: chosen whenever the text contains Chinese characters (and for any other script).
- **raw**: chosen for Japanese kana text without Chinese characters.";
