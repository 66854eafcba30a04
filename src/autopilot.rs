use std::collections::{HashSet, VecDeque};

use crate::grid::Grid;
use crate::types::{Direction, Mover, RoundSnapshot, Vec2, Vulnerability};

/// Direction a scripted player should press this tick.
///
/// Heads for the nearest pickup by BFS, or for the nearest vulnerable
/// adversary while power mode runs. Cells holding or touching a normal
/// adversary are treated as walls; when nothing is reachable that way the
/// player backs off from the closest threat instead.
pub fn next_input(grid: &Grid, snapshot: &RoundSnapshot) -> Direction {
    let player = Vec2::new(snapshot.player.x, snapshot.player.y);
    let threats: Vec<Vec2> = snapshot
        .adversaries
        .iter()
        .filter(|a| a.vulnerability == Vulnerability::Normal)
        .map(|a| Vec2::new(a.x, a.y))
        .collect();
    let danger = danger_cells(grid, &threats);

    if snapshot.power_timer > 0 {
        let prey: HashSet<Vec2> = snapshot
            .adversaries
            .iter()
            .filter(|a| a.vulnerability == Vulnerability::Vulnerable)
            .map(|a| Vec2::new(a.x, a.y))
            .collect();
        if let Some(dir) = first_step_toward(grid, player, &danger, |pos| prey.contains(&pos)) {
            return dir;
        }
    }

    if let Some(dir) =
        first_step_toward(grid, player, &danger, |pos| grid.cell_at(pos).is_pickup())
    {
        return dir;
    }

    escape_direction(grid, player, &threats)
}

fn danger_cells(grid: &Grid, threats: &[Vec2]) -> HashSet<Vec2> {
    let mut out = HashSet::new();
    for threat in threats {
        out.insert(*threat);
        for dir in Direction::PRIORITY {
            if let Some(next) = grid.neighbor(*threat, dir) {
                out.insert(next);
            }
        }
    }
    out
}

fn first_step_toward<F>(
    grid: &Grid,
    start: Vec2,
    blocked: &HashSet<Vec2>,
    is_target: F,
) -> Option<Direction>
where
    F: Fn(Vec2) -> bool,
{
    let mut seen = HashSet::from([start]);
    let mut queue: VecDeque<(Vec2, Direction)> = VecDeque::new();

    for dir in Direction::PRIORITY {
        let Some(next) = grid.neighbor(start, dir) else {
            continue;
        };
        if !grid.is_passable(next, Mover::Player) || blocked.contains(&next) {
            continue;
        }
        if is_target(next) {
            return Some(dir);
        }
        if seen.insert(next) {
            queue.push_back((next, dir));
        }
    }

    while let Some((pos, first)) = queue.pop_front() {
        for dir in Direction::PRIORITY {
            let Some(next) = grid.neighbor(pos, dir) else {
                continue;
            };
            if !grid.is_passable(next, Mover::Player) || blocked.contains(&next) {
                continue;
            }
            if !seen.insert(next) {
                continue;
            }
            if is_target(next) {
                return Some(first);
            }
            queue.push_back((next, first));
        }
    }

    None
}

fn escape_direction(grid: &Grid, player: Vec2, threats: &[Vec2]) -> Direction {
    let mut best = Direction::None;
    let mut best_dist = i32::MIN;
    for dir in Direction::PRIORITY {
        if !grid.can_enter(player, dir, Mover::Player) {
            continue;
        }
        let next = grid.neighbor(player, dir).unwrap_or(player);
        let dist = threats
            .iter()
            .map(|threat| next.manhattan(*threat))
            .min()
            .unwrap_or(99);
        if dist > best_dist {
            best_dist = dist;
            best = dir;
        }
    }
    best
}
