use crate::config::Tuning;
use crate::types::Vulnerability;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerChange {
    Started,
    /// A power pickup was eaten while power mode was already running.
    Refreshed,
    Expired,
}

/// How a player/adversary contact resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    Caught,
    Eat,
    Ignore,
}

impl Contact {
    pub fn with(vulnerability: Vulnerability) -> Self {
        match vulnerability {
            Vulnerability::Normal => Self::Caught,
            Vulnerability::Vulnerable => Self::Eat,
            Vulnerability::Eaten => Self::Ignore,
        }
    }
}

impl Vulnerability {
    /// State after power mode starts; only Normal adversaries are affected.
    pub fn empowered(self) -> Self {
        match self {
            Self::Normal => Self::Vulnerable,
            other => other,
        }
    }

    /// State after power mode runs out.
    pub fn expired(self) -> Self {
        match self {
            Self::Vulnerable => Self::Normal,
            other => other,
        }
    }
}

/// Power timer and combo multiplier. The score itself lives in the round controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerState {
    timer: u32,
    combo: u32,
    duration: u32,
    max_combo: u32,
}

impl PowerState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            timer: 0,
            combo: 1,
            duration: tuning.power_duration_ticks.max(1),
            max_combo: tuning.max_combo.max(1),
        }
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0
    }

    pub fn activate(&mut self) -> PowerChange {
        let change = if self.is_active() {
            PowerChange::Refreshed
        } else {
            PowerChange::Started
        };
        self.timer = self.duration;
        self.combo = 1;
        change
    }

    pub fn tick(&mut self) -> Option<PowerChange> {
        if self.timer == 0 {
            return None;
        }
        self.timer -= 1;
        (self.timer == 0).then_some(PowerChange::Expired)
    }

    /// Points for eating one vulnerable adversary, and the multiplier that was applied.
    pub fn award_eat(&mut self, base: u32) -> (u32, u32) {
        let applied = self.combo;
        self.combo = (self.combo + 1).min(self.max_combo);
        (base.saturating_mul(applied), applied)
    }

    /// Drops power mode entirely; used when the player loses a life or a level starts.
    pub fn reset(&mut self) {
        self.timer = 0;
        self.combo = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power(duration: u32, max_combo: u32) -> PowerState {
        PowerState::new(&Tuning {
            power_duration_ticks: duration,
            max_combo,
            ..Tuning::default()
        })
    }

    #[test]
    fn timer_counts_down_and_expires_once() {
        let mut power = power(3, 4);
        assert_eq!(power.tick(), None);
        assert_eq!(power.activate(), PowerChange::Started);
        assert_eq!(power.timer(), 3);
        assert_eq!(power.tick(), None);
        assert_eq!(power.tick(), None);
        assert_eq!(power.tick(), Some(PowerChange::Expired));
        assert!(!power.is_active());
        assert_eq!(power.tick(), None);
    }

    #[test]
    fn combo_grows_per_eat_and_caps() {
        let mut power = power(60, 4);
        power.activate();
        let points: Vec<u32> = (0..5).map(|_| power.award_eat(20).0).collect();
        assert_eq!(points, vec![20, 40, 60, 80, 80]);
        assert_eq!(power.combo(), 4);
    }

    #[test]
    fn combo_survives_expiry_and_resets_on_next_activation() {
        let mut power = power(1, 4);
        power.activate();
        power.award_eat(20);
        power.award_eat(20);
        assert_eq!(power.tick(), Some(PowerChange::Expired));
        assert_eq!(power.combo(), 3);

        assert_eq!(power.activate(), PowerChange::Started);
        assert_eq!(power.combo(), 1);
    }

    #[test]
    fn activation_while_active_refreshes_timer() {
        let mut power = power(10, 4);
        power.activate();
        power.tick();
        power.award_eat(20);
        assert_eq!(power.activate(), PowerChange::Refreshed);
        assert_eq!(power.timer(), 10);
        assert_eq!(power.combo(), 1);
    }

    #[test]
    fn vulnerability_transitions_leave_eaten_alone() {
        assert_eq!(Vulnerability::Normal.empowered(), Vulnerability::Vulnerable);
        assert_eq!(Vulnerability::Eaten.empowered(), Vulnerability::Eaten);
        assert_eq!(Vulnerability::Vulnerable.expired(), Vulnerability::Normal);
        assert_eq!(Vulnerability::Eaten.expired(), Vulnerability::Eaten);
        assert_eq!(Contact::with(Vulnerability::Normal), Contact::Caught);
        assert_eq!(Contact::with(Vulnerability::Vulnerable), Contact::Eat);
        assert_eq!(Contact::with(Vulnerability::Eaten), Contact::Ignore);
    }
}
