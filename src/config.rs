use serde::{Deserialize, Serialize};

use crate::constants::{
    ADVERSARY_SPEED, EAT_BASE_SCORE, MAX_COMBO, PICKUP_SCORE, PLAYER_SPEED, POWER_DURATION_TICKS,
    POWER_PICKUP_SCORE, STARTING_LIVES, STEP_UNITS, VULNERABLE_SPEED,
};

/// Every balance knob of a round. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    #[serde(rename = "pickupScore")]
    pub pickup_score: u32,
    #[serde(rename = "powerPickupScore")]
    pub power_pickup_score: u32,
    #[serde(rename = "eatBaseScore")]
    pub eat_base_score: u32,
    #[serde(rename = "maxCombo")]
    pub max_combo: u32,
    #[serde(rename = "powerDurationTicks")]
    pub power_duration_ticks: u32,
    #[serde(rename = "playerSpeed")]
    pub player_speed: u32,
    #[serde(rename = "adversarySpeed")]
    pub adversary_speed: u32,
    #[serde(rename = "vulnerableSpeed")]
    pub vulnerable_speed: u32,
    pub lives: u32,
    #[serde(rename = "pursuerFleesWhenVulnerable")]
    pub pursuer_flees_when_vulnerable: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            pickup_score: PICKUP_SCORE,
            power_pickup_score: POWER_PICKUP_SCORE,
            eat_base_score: EAT_BASE_SCORE,
            max_combo: MAX_COMBO,
            power_duration_ticks: POWER_DURATION_TICKS,
            player_speed: PLAYER_SPEED,
            adversary_speed: ADVERSARY_SPEED,
            vulnerable_speed: VULNERABLE_SPEED,
            lives: STARTING_LIVES,
            pursuer_flees_when_vulnerable: false,
        }
    }
}

impl Tuning {
    /// Clamps every field into the range the simulation can honour.
    pub fn normalized(mut self) -> Self {
        self.max_combo = self.max_combo.max(1);
        self.power_duration_ticks = self.power_duration_ticks.max(1);
        self.player_speed = self.player_speed.clamp(1, STEP_UNITS);
        self.adversary_speed = self.adversary_speed.clamp(1, STEP_UNITS);
        let vulnerable_cap = if self.adversary_speed > 1 {
            self.adversary_speed - 1
        } else {
            1
        };
        self.vulnerable_speed = self.vulnerable_speed.clamp(1, vulnerable_cap);
        self.lives = self.lives.max(1);
        self
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(text).map(Self::normalized)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
