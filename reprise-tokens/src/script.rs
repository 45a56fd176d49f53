//! Unicode script classes and their characters-per-token ratios.

use serde::{Deserialize, Serialize};

/// Script class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// Basic Latin and the Latin supplement/extension blocks.
    Latin,
    /// Hangul syllables and jamo.
    Hangul,
    /// Hiragana and katakana, including half-width forms.
    Kana,
    /// CJK unified ideographs and compatibility ideographs.
    Cjk,
    /// Everything else that is printable.
    Other,
}

impl Script {
    /// Classify a character. Whitespace and control characters return `None`.
    pub fn of(c: char) -> Option<Self> {
        if c.is_whitespace() || c.is_control() {
            return None;
        }
        let script = match u32::from(c) {
            0x0021..=0x007E | 0x00A0..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
            0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => Script::Hangul,
            0x3040..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Script::Kana,
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF => {
                Script::Cjk
            }
            _ => Script::Other,
        };
        Some(script)
    }
}

/// Characters-per-token for each script class.
///
/// Defaults are tuned to over-count slightly for current BPE vocabularies:
/// Latin 4.0, Hangul 2.0, Kana 2.0, CJK 1.5, other 3.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptRatios {
    /// Latin characters per token.
    pub latin: f64,
    /// Hangul characters per token.
    pub hangul: f64,
    /// Kana characters per token.
    pub kana: f64,
    /// CJK ideographs per token.
    pub cjk: f64,
    /// Other characters per token.
    pub other: f64,
}

impl ScriptRatios {
    /// Ratio for one class. Non-positive ratios are treated as 1.0.
    pub fn ratio(&self, script: Script) -> f64 {
        let r = match script {
            Script::Latin => self.latin,
            Script::Hangul => self.hangul,
            Script::Kana => self.kana,
            Script::Cjk => self.cjk,
            Script::Other => self.other,
        };
        if r.is_finite() && r > 0.0 { r } else { 1.0 }
    }
}

impl Default for ScriptRatios {
    fn default() -> Self {
        Self {
            latin: 4.0,
            hangul: 2.0,
            kana: 2.0,
            cjk: 1.5,
            other: 3.0,
        }
    }
}
