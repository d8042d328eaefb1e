use serde::{Deserialize, Serialize};

/// Synthesis style selected from the script of the input text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Pseudo-Japanese phonetic rendering, used for Chinese and anything unrecognised.
    PseudoJp,
    /// Native rendering of Japanese kana text.
    Raw,
}

impl Mode {
    /// Ideographs win over kana, so mixed Chinese and Japanese text is `PseudoJp`.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(is_cjk_ideograph) {
            Mode::PseudoJp
        } else if text.chars().any(is_kana) {
            Mode::Raw
        } else {
            Mode::PseudoJp
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::PseudoJp => "pseudo_jp",
            Mode::Raw => "raw",
        }
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

fn is_kana(c: char) -> bool {
    // Hiragana, then Katakana.
    ('\u{3040}'..='\u{309F}').contains(&c) || ('\u{30A0}'..='\u{30FF}').contains(&c)
}
