use std::cmp::Reverse;

use crate::grid::{DistanceField, Grid};
use crate::motion::Motion;
use crate::rng::RandomSource;
use crate::types::{AdversaryBehavior, Direction, Mover, Vec2, Vulnerability};

/// What an adversary can see when it picks a direction.
#[derive(Clone, Copy, Debug)]
pub struct Outlook<'a> {
    pub grid: &'a Grid,
    pub player: Vec2,
    pub flee_when_vulnerable: bool,
}

/// Open directions from `pos` in priority order, without the reversal of
/// `heading` unless reversing is the only way out.
pub fn legal_directions(grid: &Grid, pos: Vec2, heading: Direction) -> Vec<Direction> {
    let open: Vec<Direction> = Direction::PRIORITY
        .into_iter()
        .filter(|dir| grid.can_enter(pos, *dir, Mover::Adversary))
        .collect();
    if heading == Direction::None {
        return open;
    }
    let forward: Vec<Direction> = open
        .iter()
        .copied()
        .filter(|dir| *dir != heading.opposite())
        .collect();
    if forward.is_empty() {
        open
    } else {
        forward
    }
}

fn next_cell(grid: &Grid, pos: Vec2, dir: Direction) -> Vec2 {
    grid.neighbor(pos, dir).unwrap_or(pos)
}

pub fn pursue(grid: &Grid, pos: Vec2, heading: Direction, target: Vec2) -> Direction {
    legal_directions(grid, pos, heading)
        .into_iter()
        .min_by_key(|dir| next_cell(grid, pos, *dir).manhattan(target))
        .unwrap_or(Direction::None)
}

pub fn flee(grid: &Grid, pos: Vec2, heading: Direction, threat: Vec2) -> Direction {
    legal_directions(grid, pos, heading)
        .into_iter()
        .min_by_key(|dir| Reverse(next_cell(grid, pos, *dir).manhattan(threat)))
        .unwrap_or(Direction::None)
}

pub fn wander<R: RandomSource + ?Sized>(
    grid: &Grid,
    pos: Vec2,
    heading: Direction,
    rng: &mut R,
) -> Direction {
    let options = legal_directions(grid, pos, heading);
    if options.is_empty() {
        return Direction::None;
    }
    options[rng.pick_index(options.len())]
}

/// Steps down the distance field toward its target. Reversal is allowed.
pub fn return_home(grid: &Grid, pos: Vec2, field: &DistanceField) -> Direction {
    if pos == field.target() {
        return Direction::None;
    }
    Direction::PRIORITY
        .into_iter()
        .filter(|dir| grid.can_enter(pos, *dir, Mover::Adversary))
        .filter_map(|dir| field.get(next_cell(grid, pos, dir)).map(|steps| (dir, steps)))
        .min_by_key(|(_, steps)| *steps)
        .map(|(dir, _)| dir)
        .unwrap_or(Direction::None)
}

impl AdversaryBehavior {
    /// Direction requested by an aligned adversary this tick.
    pub fn decide<R: RandomSource + ?Sized>(
        self,
        vulnerability: Vulnerability,
        motion: &Motion,
        home: &DistanceField,
        outlook: &Outlook<'_>,
        rng: &mut R,
    ) -> Direction {
        let grid = outlook.grid;
        match (vulnerability, self) {
            (Vulnerability::Eaten, _) => return_home(grid, motion.pos, home),
            (Vulnerability::Vulnerable, AdversaryBehavior::Pursuer)
                if outlook.flee_when_vulnerable =>
            {
                flee(grid, motion.pos, motion.dir, outlook.player)
            }
            (_, AdversaryBehavior::Pursuer) => pursue(grid, motion.pos, motion.dir, outlook.player),
            (_, AdversaryBehavior::Wanderer) => wander(grid, motion.pos, motion.dir, rng),
        }
    }
}
