// ── SimConfig ─────────────────────────────────────────────────────────────────

use serde::Deserialize;

use crate::error::SimResult;

/// Simulation constants.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes:
///
/// ```json
/// { "gravity": 1200.0, "player": { "jump_speed": 340.0 } }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Edge length of one map tile in pixels.
    pub tile_size: f32,
    /// Seconds per simulation tick.
    pub fixed_dt: f32,
    /// Downward acceleration in pixels per second squared.
    pub gravity: f32,
    /// Terminal falling speed in pixels per second.
    pub max_fall_speed: f32,
    pub player: PlayerTuning,
    pub walker: WalkerTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            fixed_dt: 1.0 / 60.0,
            gravity: 900.0,
            max_fall_speed: 420.0,
            player: PlayerTuning::default(),
            walker: WalkerTuning::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub run_speed: f32,
    pub jump_speed: f32,
    /// Ticks after walking off a ledge during which a jump still counts.
    pub coyote_ticks: u32,
    /// Ticks between the end of one attack and the start of the next.
    pub attack_cooldown_ticks: u32,
    pub hurt_ticks: u32,
    pub knockback_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_speed: 120.0,
            jump_speed: 320.0,
            coyote_ticks: 6,
            attack_cooldown_ticks: 10,
            hurt_ticks: 20,
            knockback_speed: 160.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkerTuning {
    pub speed: f32,
    pub health: i32,
    pub hurt_ticks: u32,
    pub knockback_speed: f32,
}

impl Default for WalkerTuning {
    fn default() -> Self {
        Self {
            speed: 40.0,
            health: 3,
            hurt_ticks: 15,
            knockback_speed: 120.0,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
