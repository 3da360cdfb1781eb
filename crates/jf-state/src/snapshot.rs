//! Persisted session snapshot

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::preferences::{Language, Preferences};

/// Everything that survives a session: economy, statistics and preferences.
///
/// Serialized flat with camelCase keys. Deserialization goes through
/// [`SessionSnapshot::from_json`], which never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub credits: u64,
    pub bet: u64,
    #[serde(flatten)]
    pub preferences: Preferences,
    pub biggest_win: u64,
    pub total_spins: u64,
    pub total_wins: u64,
}

impl SessionSnapshot {
    /// Fresh session with the given starting credits and bet
    pub fn new(credits: u64, bet: u64) -> Self {
        Self {
            credits,
            bet,
            preferences: Preferences::default(),
            biggest_win: 0,
            total_spins: 0,
            total_wins: 0,
        }
    }

    /// Serialize the full object
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored snapshot.
    ///
    /// Every field is optional: a missing or malformed field takes its value
    /// from `defaults`, and input that is not a JSON object yields `defaults`
    /// unchanged.
    pub fn from_json(json: &str, defaults: &Self) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(&value, defaults),
            Err(e) => {
                log::warn!("[Snapshot] Discarding unreadable snapshot: {}", e);
                *defaults
            }
        }
    }

    /// Field-by-field extraction from an already parsed value
    pub fn from_value(value: &Value, defaults: &Self) -> Self {
        let Some(obj) = value.as_object() else {
            log::warn!("[Snapshot] Snapshot is not an object, using defaults");
            return *defaults;
        };

        let prefs = &defaults.preferences;
        let preferences = Preferences {
            language: obj
                .get("lang")
                .and_then(Value::as_str)
                .and_then(Language::from_code)
                .unwrap_or(prefs.language),
            sound: read_flag(obj, "sound").unwrap_or(prefs.sound),
            animations: read_flag(obj, "animations").unwrap_or(prefs.animations),
            particles: read_flag(obj, "particles").unwrap_or(prefs.particles),
            vibration: read_flag(obj, "vibration").unwrap_or(prefs.vibration),
        };

        let total_spins = read_count(obj, "totalSpins").unwrap_or(defaults.total_spins);
        let total_wins = read_count(obj, "totalWins").unwrap_or(defaults.total_wins);

        Self {
            credits: read_count(obj, "credits").unwrap_or(defaults.credits),
            bet: read_count(obj, "bet").unwrap_or(defaults.bet),
            preferences,
            biggest_win: read_count(obj, "biggestWin").unwrap_or(defaults.biggest_win),
            total_spins,
            // Cannot have won more spins than were played
            total_wins: total_wins.min(total_spins),
        }
    }
}

/// Read a non-negative integer. Negative numbers clamp to zero, finite
/// floats are truncated; anything else is treated as absent.
fn read_count(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = obj.get(key)?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if let Some(n) = value.as_i64() {
        return Some(n.max(0) as u64);
    }
    match value.as_f64() {
        Some(f) if f.is_finite() => Some(f.max(0.0) as u64),
        _ => None,
    }
}

fn read_flag(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}
