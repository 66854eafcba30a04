pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

/// Progress units an entity must accumulate to cross one cell.
pub const STEP_UNITS: u32 = 100;

pub const PICKUP_SCORE: u32 = 10;
pub const POWER_PICKUP_SCORE: u32 = 50;
pub const EAT_BASE_SCORE: u32 = 20;
pub const MAX_COMBO: u32 = 4;
pub const POWER_DURATION_TICKS: u32 = 60;

pub const PLAYER_SPEED: u32 = STEP_UNITS;
pub const ADVERSARY_SPEED: u32 = STEP_UNITS;
pub const VULNERABLE_SPEED: u32 = STEP_UNITS / 2;

pub const STARTING_LIVES: u32 = 1;

pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks.saturating_mul(TICK_MS)
}
