use crate::constants::STEP_UNITS;
use crate::grid::Grid;
use crate::types::{Direction, Mover, Vec2};

/// Cell, heading and sub-cell progress of one moving entity.
///
/// `pos` is the last cell the entity fully entered. While `progress > 0` it is
/// travelling from `pos` toward the neighbor in `dir`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Motion {
    pub pos: Vec2,
    pub dir: Direction,
    pub progress: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// The entity entered a new cell this tick.
    pub arrived: bool,
    /// The requested direction was adopted this tick.
    pub honored: bool,
}

impl Motion {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            dir: Direction::None,
            progress: 0,
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.progress == 0
    }

    /// Picks the heading for an aligned entity. Returns whether `requested` was taken.
    fn steer(&mut self, grid: &Grid, mover: Mover, requested: Direction) -> bool {
        if requested != Direction::None && grid.can_enter(self.pos, requested, mover) {
            self.dir = requested;
            return true;
        }
        if self.dir != Direction::None && grid.can_enter(self.pos, self.dir, mover) {
            return false;
        }
        self.dir = Direction::None;
        false
    }

    /// Runs one tick of movement at `speed` step units.
    pub fn advance(&mut self, grid: &Grid, mover: Mover, requested: Direction, speed: u32) -> Step {
        let from = self.pos;
        let honored = if self.is_aligned() {
            self.steer(grid, mover, requested)
        } else {
            false
        };

        if self.dir == Direction::None {
            return Step {
                arrived: false,
                honored,
            };
        }

        self.progress = self.progress.saturating_add(speed);
        if self.progress < STEP_UNITS {
            return Step {
                arrived: false,
                honored,
            };
        }

        self.progress = 0;
        match grid.neighbor(self.pos, self.dir) {
            Some(next) if grid.is_passable(next, mover) => self.pos = next,
            _ => self.dir = Direction::None,
        }
        Step {
            arrived: self.pos != from,
            honored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MazeLayout;

    fn grid(rows: &[&str]) -> Grid {
        let layout = MazeLayout::parse(rows).expect("test layout parses");
        Grid::new(&layout).expect("test layout is playable")
    }

    const RING: [&str; 5] = ["######", "#P...#", "#.##.#", "#o..W#", "######"];

    #[test]
    fn requested_direction_taken_when_open() {
        let grid = grid(&RING);
        let mut motion = Motion::at(Vec2::new(1, 1));
        let step = motion.advance(&grid, Mover::Player, Direction::Right, STEP_UNITS);
        assert!(step.honored);
        assert!(step.arrived);
        assert_eq!(motion.pos, Vec2::new(2, 1));
        assert_eq!(motion.dir, Direction::Right);
    }

    #[test]
    fn blocked_request_keeps_current_heading() {
        let grid = grid(&RING);
        let mut motion = Motion {
            pos: Vec2::new(2, 1),
            dir: Direction::Right,
            progress: 0,
        };
        let step = motion.advance(&grid, Mover::Player, Direction::Down, STEP_UNITS);
        assert!(!step.honored);
        assert_eq!(motion.pos, Vec2::new(3, 1));
        assert_eq!(motion.dir, Direction::Right);

        motion.advance(&grid, Mover::Player, Direction::Right, STEP_UNITS);
        let step = motion.advance(&grid, Mover::Player, Direction::Down, STEP_UNITS);
        assert!(step.honored);
        assert_eq!(motion.pos, Vec2::new(4, 2));
    }

    #[test]
    fn wall_ahead_stops_entity() {
        let grid = grid(&RING);
        let mut motion = Motion {
            pos: Vec2::new(4, 1),
            dir: Direction::Right,
            progress: 0,
        };
        let step = motion.advance(&grid, Mover::Player, Direction::None, STEP_UNITS);
        assert!(!step.arrived);
        assert_eq!(motion.pos, Vec2::new(4, 1));
        assert_eq!(motion.dir, Direction::None);
    }

    #[test]
    fn half_speed_needs_two_ticks_per_cell() {
        let grid = grid(&RING);
        let mut motion = Motion::at(Vec2::new(1, 1));

        let step = motion.advance(&grid, Mover::Adversary, Direction::Right, STEP_UNITS / 2);
        assert!(!step.arrived);
        assert_eq!(motion.pos, Vec2::new(1, 1));
        assert!(!motion.is_aligned());

        let step = motion.advance(&grid, Mover::Adversary, Direction::Right, STEP_UNITS / 2);
        assert!(step.arrived);
        assert_eq!(motion.pos, Vec2::new(2, 1));
        assert!(motion.is_aligned());
    }

    #[test]
    fn turns_are_ignored_between_cells() {
        let grid = grid(&RING);
        let mut motion = Motion {
            pos: Vec2::new(1, 1),
            dir: Direction::Right,
            progress: STEP_UNITS / 2,
        };
        let step = motion.advance(&grid, Mover::Player, Direction::Down, STEP_UNITS / 2);
        assert!(!step.honored);
        assert_eq!(motion.pos, Vec2::new(2, 1));
        assert_eq!(motion.dir, Direction::Right);
    }

    #[test]
    fn tunnel_edge_wraps_with_same_heading() {
        let grid = grid(&["#####", "#Po.#", "T . T", "##W##", "#####"]);
        let mut motion = Motion {
            pos: Vec2::new(0, 2),
            dir: Direction::Left,
            progress: 0,
        };
        motion.advance(&grid, Mover::Adversary, Direction::None, STEP_UNITS);
        assert_eq!(motion.pos, Vec2::new(4, 2));
        assert_eq!(motion.dir, Direction::Left);

        motion.advance(&grid, Mover::Adversary, Direction::None, STEP_UNITS);
        assert_eq!(motion.pos, Vec2::new(3, 2));
    }

    #[test]
    fn player_cannot_turn_into_gate() {
        let grid = grid(&["#######", "#P.o..#", "###=###", "#  W  #", "#######"]);
        let mut player = Motion::at(Vec2::new(3, 1));
        player.advance(&grid, Mover::Player, Direction::Down, STEP_UNITS);
        assert_eq!(player.pos, Vec2::new(3, 1));
        assert_eq!(player.dir, Direction::None);

        let mut adversary = Motion::at(Vec2::new(3, 1));
        adversary.advance(&grid, Mover::Adversary, Direction::Down, STEP_UNITS);
        assert_eq!(adversary.pos, Vec2::new(3, 2));
    }
}
