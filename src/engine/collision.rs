use super::RoundController;
use crate::power::Contact;
use crate::rng::RandomSource;
use crate::types::{Outcome, RoundEvent, Vec2, Vulnerability};

impl<R: RandomSource> RoundController<R> {
    /// Resolves every player/adversary contact. `before` holds the player cell
    /// and adversary cells from the start of the tick so that two entities
    /// passing through each other also count.
    ///
    /// Returns `true` when the contact ended the tick (life lost or round lost).
    pub(super) fn resolve_contacts(&mut self, before: Option<(Vec2, &[Vec2])>) -> bool {
        let player_now = self.player.motion.pos;

        for idx in 0..self.adversaries.len() {
            let adversary_now = self.adversaries[idx].motion.pos;
            let overlap = adversary_now == player_now;
            let swapped = match before {
                Some((player_before, adversaries_before)) => adversaries_before
                    .get(idx)
                    .map(|adversary_before| {
                        *adversary_before == player_now && player_before == adversary_now
                    })
                    .unwrap_or(false),
                None => false,
            };
            if !overlap && !swapped {
                continue;
            }

            match Contact::with(self.adversaries[idx].vulnerability) {
                Contact::Ignore => {}
                Contact::Eat => {
                    let (points, combo) = self.power.award_eat(self.tuning.eat_base_score);
                    self.score = self.score.saturating_add(points);
                    self.adversaries[idx].vulnerability = Vulnerability::Eaten;
                    self.events.push(RoundEvent::AdversaryEaten {
                        id: self.adversaries[idx].id,
                        points,
                        combo,
                    });
                }
                Contact::Caught => {
                    self.lose_life(self.adversaries[idx].id);
                    return true;
                }
            }
        }
        false
    }

    fn lose_life(&mut self, by: usize) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(RoundEvent::PlayerCaught { by });
        if self.lives == 0 {
            self.outcome = Outcome::Lost;
            self.events.push(RoundEvent::RoundLost);
            return;
        }
        self.events.push(RoundEvent::LifeLost { lives: self.lives });
        self.reset_positions();
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Tuning;
    use crate::engine::RoundController;
    use crate::layout::MazeLayout;
    use crate::motion::Motion;
    use crate::types::{Direction, Outcome, RoundEvent, Vec2, Vulnerability};

    const LANE: [&str; 5] = ["########", "#P....o#", "########", "#W     #", "########"];

    fn round() -> RoundController {
        let layout = MazeLayout::parse(&LANE).expect("lane parses");
        RoundController::new(&layout, Tuning::default(), 100).expect("lane playable")
    }

    #[test]
    fn swap_collision_catches_player() {
        let mut round = round();
        round.player.motion = Motion {
            pos: Vec2::new(4, 1),
            dir: Direction::Right,
            progress: 0,
        };
        round.adversaries[0].motion = Motion {
            pos: Vec2::new(3, 1),
            dir: Direction::Left,
            progress: 0,
        };

        let ended = round.resolve_contacts(Some((Vec2::new(3, 1), &[Vec2::new(4, 1)][..])));
        assert!(ended);
        assert_eq!(round.outcome(), Outcome::Lost);
    }

    #[test]
    fn passing_by_without_swap_is_safe() {
        let mut round = round();
        round.player.motion = Motion::at(Vec2::new(4, 1));
        round.adversaries[0].motion = Motion::at(Vec2::new(2, 1));

        let ended = round.resolve_contacts(Some((Vec2::new(3, 1), &[Vec2::new(1, 1)][..])));
        assert!(!ended);
        assert_eq!(round.outcome(), Outcome::InProgress);
    }

    #[test]
    fn eaten_adversary_is_ignored() {
        let mut round = round();
        round.adversaries[0].vulnerability = Vulnerability::Eaten;
        round.adversaries[0].motion = Motion::at(Vec2::new(1, 1));

        assert!(!round.resolve_contacts(None));
        assert_eq!(round.score(), 0);
        assert!(round.events.is_empty());
    }

    #[test]
    fn consecutive_eats_raise_combo() {
        let layout = MazeLayout::parse(&["########", "#P....o#", "#WW ####", "########"])
            .expect("layout parses");
        let mut round =
            RoundController::new(&layout, Tuning::default(), 5).expect("layout playable");
        round.power.activate();
        for adversary in &mut round.adversaries {
            adversary.vulnerability = Vulnerability::Vulnerable;
            adversary.motion = Motion::at(Vec2::new(1, 1));
        }

        assert!(!round.resolve_contacts(None));
        assert_eq!(round.score(), 20 + 40);
        assert_eq!(round.power.combo(), 3);
        assert_eq!(
            round.events,
            vec![
                RoundEvent::AdversaryEaten {
                    id: 0,
                    points: 20,
                    combo: 1,
                },
                RoundEvent::AdversaryEaten {
                    id: 1,
                    points: 40,
                    combo: 2,
                },
            ]
        );
    }
}
