use std::collections::{HashSet, VecDeque};

use crate::error::{LayoutIssue, MazeResult};
use crate::layout::MazeLayout;
use crate::types::{CellKind, Consumed, Direction, Mover, Vec2};

/// The maze for one round: static walls plus pickups that are eaten away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
    remaining: usize,
}

/// BFS step counts toward one target cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceField {
    target: Vec2,
    width: i32,
    height: i32,
    steps: Vec<Option<u32>>,
}

impl DistanceField {
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn get(&self, pos: Vec2) -> Option<u32> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.steps[(pos.y * self.width + pos.x) as usize]
    }
}

impl Grid {
    /// Builds the grid and checks that the layout can actually be played.
    pub fn new(layout: &MazeLayout) -> MazeResult<Self> {
        let grid = Self::from_cells(&layout.cells)?;
        grid.validate_spawns(layout)?;
        Ok(grid)
    }

    fn from_cells(rows: &[Vec<CellKind>]) -> MazeResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(LayoutIssue::Empty.into());
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LayoutIssue::RaggedRow {
                    row: y,
                    expected: width,
                    actual: row.len(),
                }
                .into());
            }
            cells.extend_from_slice(row);
        }

        let grid = Self {
            width: width as i32,
            height: height as i32,
            remaining: cells.iter().filter(|kind| kind.is_pickup()).count(),
            cells,
        };
        grid.validate_border()?;

        if !grid.cells.contains(&CellKind::Pickup) {
            return Err(LayoutIssue::NoPickups.into());
        }
        if !grid.cells.contains(&CellKind::PowerPickup) {
            return Err(LayoutIssue::NoPowerPickups.into());
        }
        Ok(grid)
    }

    fn validate_border(&self) -> MazeResult<()> {
        for (pos, kind) in self.cells() {
            let on_side = pos.x == 0 || pos.x == self.width - 1;
            let on_cap = pos.y == 0 || pos.y == self.height - 1;
            match kind {
                CellKind::Wall => {}
                CellKind::TunnelEdge => {
                    if !on_side || on_cap {
                        return Err(LayoutIssue::MisplacedTunnel { x: pos.x, y: pos.y }.into());
                    }
                    let counterpart = Vec2::new(self.width - 1 - pos.x, pos.y);
                    if self.cell_at(counterpart) != CellKind::TunnelEdge {
                        return Err(LayoutIssue::UnpairedTunnel { x: pos.x, y: pos.y }.into());
                    }
                }
                _ if on_side || on_cap => {
                    return Err(LayoutIssue::OpenBorder { x: pos.x, y: pos.y }.into());
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn validate_spawns(&self, layout: &MazeLayout) -> MazeResult<()> {
        if layout.adversaries.is_empty() {
            return Err(LayoutIssue::NoAdversaries.into());
        }
        self.validate_start("player", layout.player_start, Mover::Player)?;
        for spawn in &layout.adversaries {
            self.validate_start("adversary", spawn.home, Mover::Adversary)?;
            if spawn.home == layout.player_start {
                return Err(LayoutIssue::AdversaryOnPlayerStart {
                    x: spawn.home.x,
                    y: spawn.home.y,
                }
                .into());
            }
        }

        let reachable = self.reachable_from(layout.player_start, Mover::Player);
        for (pos, kind) in self.cells() {
            if kind.is_pickup() && !reachable.contains(&pos) {
                return Err(LayoutIssue::UnreachablePickup { x: pos.x, y: pos.y }.into());
            }
        }
        Ok(())
    }

    fn validate_start(&self, entity: &str, pos: Vec2, mover: Mover) -> MazeResult<()> {
        if !self.is_passable(pos, mover) {
            return Err(LayoutIssue::StartNotWalkable {
                entity: entity.to_string(),
                x: pos.x,
                y: pos.y,
            }
            .into());
        }
        let open = Direction::PRIORITY.iter().any(|dir| {
            self.neighbor(pos, *dir)
                .map(|next| self.is_passable(next, mover))
                .unwrap_or(false)
        });
        if !open {
            return Err(LayoutIssue::StartEnclosed {
                entity: entity.to_string(),
                x: pos.x,
                y: pos.y,
            }
            .into());
        }
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Cells outside the grid read as walls.
    pub fn cell_at(&self, pos: Vec2) -> CellKind {
        if !self.in_bounds(pos) {
            return CellKind::Wall;
        }
        self.cells[(pos.y * self.width + pos.x) as usize]
    }

    pub fn is_walkable(&self, pos: Vec2) -> bool {
        self.cell_at(pos) != CellKind::Wall
    }

    pub fn is_passable(&self, pos: Vec2, mover: Mover) -> bool {
        match self.cell_at(pos) {
            CellKind::Wall => false,
            CellKind::Gate => mover == Mover::Adversary,
            _ => true,
        }
    }

    pub fn consume_pickup(&mut self, pos: Vec2) -> Consumed {
        let consumed = match self.cell_at(pos) {
            CellKind::Pickup => Consumed::Score,
            CellKind::PowerPickup => Consumed::PowerScore,
            _ => return Consumed::None,
        };
        self.cells[(pos.y * self.width + pos.x) as usize] = CellKind::Empty;
        self.remaining = self.remaining.saturating_sub(1);
        consumed
    }

    pub fn remaining_pickup_count(&self) -> usize {
        self.remaining
    }

    /// Moves a tunnel-edge position moving outward to its paired edge; identity otherwise.
    pub fn wrap(&self, pos: Vec2, dir: Direction) -> Vec2 {
        if self.cell_at(pos) != CellKind::TunnelEdge {
            return pos;
        }
        let outward = (pos.x == 0 && dir == Direction::Left)
            || (pos.x == self.width - 1 && dir == Direction::Right);
        if outward {
            Vec2::new(self.width - 1 - pos.x, pos.y)
        } else {
            pos
        }
    }

    /// Cell one step away in `dir`, with tunnel wrap applied; `None` off the grid.
    pub fn neighbor(&self, pos: Vec2, dir: Direction) -> Option<Vec2> {
        if dir == Direction::None {
            return None;
        }
        let wrapped = self.wrap(pos, dir);
        if wrapped != pos {
            return Some(wrapped);
        }
        let next = pos.offset(dir);
        self.in_bounds(next).then_some(next)
    }

    pub fn can_enter(&self, pos: Vec2, dir: Direction, mover: Mover) -> bool {
        self.neighbor(pos, dir)
            .map(|next| self.is_passable(next, mover))
            .unwrap_or(false)
    }

    pub fn cells(&self) -> impl Iterator<Item = (Vec2, CellKind)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, kind)| (Vec2::new(idx as i32 % width, idx as i32 / width), *kind))
    }

    pub fn tiles(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|kind| kind.symbol()).collect::<String>())
            .collect()
    }

    pub fn reachable_from(&self, start: Vec2, mover: Mover) -> HashSet<Vec2> {
        let mut out = HashSet::new();
        if !self.is_passable(start, mover) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for dir in Direction::PRIORITY {
                let Some(next) = self.neighbor(pos, dir) else {
                    continue;
                };
                if !self.is_passable(next, mover) {
                    continue;
                }
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        out
    }

    pub fn distance_field(&self, target: Vec2, mover: Mover) -> DistanceField {
        let mut steps = vec![None; self.cells.len()];
        let mut queue = VecDeque::new();
        if self.is_passable(target, mover) {
            steps[(target.y * self.width + target.x) as usize] = Some(0);
            queue.push_back(target);
        }

        while let Some(pos) = queue.pop_front() {
            let here = steps[(pos.y * self.width + pos.x) as usize].unwrap_or(0);
            for dir in Direction::PRIORITY {
                let Some(next) = self.neighbor(pos, dir) else {
                    continue;
                };
                if !self.is_passable(next, mover) {
                    continue;
                }
                let slot = &mut steps[(next.y * self.width + next.x) as usize];
                if slot.is_none() {
                    *slot = Some(here + 1);
                    queue.push_back(next);
                }
            }
        }

        DistanceField {
            target,
            width: self.width,
            height: self.height,
            steps,
        }
    }
}
