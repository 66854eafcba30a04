use serde::Serialize;

use crate::error::{LayoutIssue, MazeResult};
use crate::types::{AdversaryBehavior, CellKind, Vec2};

/// Arcade maze with a gated adversary house and one wrap-around tunnel row.
pub const CLASSIC: [&str; 30] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###==### ##.######",
    "######.## #      # ##.######",
    "T     .   # A  W #   .     T",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P........##..o#",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#..........................#",
    "#.####.#####.##.#####.####.#",
    "#o........................o#",
    "############################",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AdversarySpawn {
    pub home: Vec2,
    pub behavior: AdversaryBehavior,
}

/// Already-parsed maze description consumed by `Grid` and the round controller.
///
/// `cells` is row-major (`cells[y][x]`). Start and home cells are ordinary
/// walkable cells; their markers only exist in the ASCII form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MazeLayout {
    pub cells: Vec<Vec<CellKind>>,
    pub player_start: Vec2,
    pub adversaries: Vec<AdversarySpawn>,
}

impl MazeLayout {
    /// Reads the ASCII legend:
    /// `#` wall, `.` pickup, `o` power pickup, ` ` empty, `=` gate,
    /// `T` tunnel edge, `P` player start, `A` pursuer home, `W` wanderer home.
    /// A blank on the left or right border reads as a tunnel edge.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> MazeResult<Self> {
        if rows.is_empty() {
            return Err(LayoutIssue::Empty.into());
        }
        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(LayoutIssue::Empty.into());
        }

        let mut cells = Vec::with_capacity(rows.len());
        let mut player_start = None;
        let mut adversaries = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(LayoutIssue::RaggedRow {
                    row: y,
                    expected: width,
                    actual,
                }
                .into());
            }

            let mut out = Vec::with_capacity(width);
            for (x, symbol) in row.chars().enumerate() {
                let pos = Vec2::new(x as i32, y as i32);
                let on_side = x == 0 || x == width - 1;
                let kind = match symbol {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Pickup,
                    'o' => CellKind::PowerPickup,
                    '=' => CellKind::Gate,
                    'T' => CellKind::TunnelEdge,
                    ' ' if on_side => CellKind::TunnelEdge,
                    ' ' => CellKind::Empty,
                    'P' => {
                        if player_start.replace(pos).is_some() {
                            return Err(LayoutIssue::DuplicatePlayerStart.into());
                        }
                        CellKind::Empty
                    }
                    'A' => {
                        adversaries.push(AdversarySpawn {
                            home: pos,
                            behavior: AdversaryBehavior::Pursuer,
                        });
                        CellKind::Empty
                    }
                    'W' => {
                        adversaries.push(AdversarySpawn {
                            home: pos,
                            behavior: AdversaryBehavior::Wanderer,
                        });
                        CellKind::Empty
                    }
                    other => {
                        return Err(LayoutIssue::UnknownSymbol {
                            symbol: other,
                            x: pos.x,
                            y: pos.y,
                        }
                        .into())
                    }
                };
                out.push(kind);
            }
            cells.push(out);
        }

        let player_start = player_start.ok_or(LayoutIssue::MissingPlayerStart)?;
        Ok(Self {
            cells,
            player_start,
            adversaries,
        })
    }

    pub fn classic() -> MazeResult<Self> {
        Self::parse(&CLASSIC)
    }

    pub fn width(&self) -> i32 {
        self.cells.first().map(|row| row.len() as i32).unwrap_or(0)
    }

    pub fn height(&self) -> i32 {
        self.cells.len() as i32
    }
}
