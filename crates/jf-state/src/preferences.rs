//! Player preferences
//!
//! Display language plus the four feedback switches the presentation layer
//! honours (sound, animations, particles, vibration). The engine never reads
//! them; it only stores and persists them.

use serde::{Deserialize, Serialize};

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// Primary language (Brazilian Portuguese)
    #[default]
    #[serde(rename = "pt")]
    Portuguese,
    /// Secondary language (English)
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Short code used in the persisted snapshot
    pub fn code(&self) -> &'static str {
        match self {
            Self::Portuguese => "pt",
            Self::English => "en",
        }
    }

    /// Parse a language code. Accepts the short codes and the regional
    /// tags used by the language switcher (`pt-BR`, `en-GB`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "pt" | "pt-br" => Some(Self::Portuguese),
            "en" | "en-gb" | "en-us" => Some(Self::English),
            _ => None,
        }
    }

    /// The other language
    pub fn toggled(&self) -> Self {
        match self {
            Self::Portuguese => Self::English,
            Self::English => Self::Portuguese,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Player preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Display language
    #[serde(rename = "lang")]
    pub language: Language,
    /// Sound effects enabled
    pub sound: bool,
    /// Reel/credit animations enabled
    pub animations: bool,
    /// Confetti, fireworks and coin shower enabled
    pub particles: bool,
    /// Haptic feedback enabled
    pub vibration: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::default(),
            sound: true,
            animations: true,
            particles: true,
            vibration: true,
        }
    }
}

/// A single on/off preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Sound,
    Animations,
    Particles,
    Vibration,
}

impl Toggle {
    /// Parse a toggle name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sound" => Some(Self::Sound),
            "animations" | "animation" => Some(Self::Animations),
            "particles" | "confetti" => Some(Self::Particles),
            "vibration" | "haptics" => Some(Self::Vibration),
            _ => None,
        }
    }
}

impl Preferences {
    /// Current value of a toggle
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Sound => self.sound,
            Toggle::Animations => self.animations,
            Toggle::Particles => self.particles,
            Toggle::Vibration => self.vibration,
        }
    }

    /// Set a toggle
    pub fn set(&mut self, toggle: Toggle, enabled: bool) {
        let slot = match toggle {
            Toggle::Sound => &mut self.sound,
            Toggle::Animations => &mut self.animations,
            Toggle::Particles => &mut self.particles,
            Toggle::Vibration => &mut self.vibration,
        };
        *slot = enabled;
    }

    /// Flip a toggle, returning the new value
    pub fn flip(&mut self, toggle: Toggle) -> bool {
        let enabled = !self.get(toggle);
        self.set(toggle, enabled);
        enabled
    }
}
