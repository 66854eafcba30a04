use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Fixed tie-break order used wherever several directions score the same.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: Vec2) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Empty,
    Pickup,
    PowerPickup,
    TunnelEdge,
    /// Door of the adversary home; the player may never cross it.
    Gate,
}

impl CellKind {
    pub fn symbol(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Empty => ' ',
            Self::Pickup => '.',
            Self::PowerPickup => 'o',
            Self::TunnelEdge => 'T',
            Self::Gate => '=',
        }
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, Self::Pickup | Self::PowerPickup)
    }
}

/// Result of stepping onto a cell that may hold a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumed {
    None,
    Score,
    PowerScore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mover {
    Player,
    Adversary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdversaryBehavior {
    Pursuer,
    Wanderer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vulnerability {
    Normal,
    Vulnerable,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "queuedDir")]
    pub queued_dir: Direction,
    /// Units travelled toward the next cell along `dir`, out of `STEP_UNITS`.
    pub progress: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdversaryView {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub progress: u32,
    pub behavior: AdversaryBehavior,
    pub vulnerability: Vulnerability,
    pub home: Vec2,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    PickupEaten {
        x: i32,
        y: i32,
        points: u32,
    },
    PowerStarted {
        x: i32,
        y: i32,
        points: u32,
        ticks: u32,
    },
    /// A power pickup eaten while power mode was already running.
    PowerRefreshed {
        x: i32,
        y: i32,
        points: u32,
        ticks: u32,
    },
    PowerEnded,
    AdversaryEaten {
        id: usize,
        points: u32,
        combo: u32,
    },
    AdversaryHome {
        id: usize,
    },
    PlayerCaught {
        by: usize,
    },
    LifeLost {
        lives: u32,
    },
    RoundWon,
    RoundLost,
    LevelStarted {
        level: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundSnapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub player: PlayerView,
    pub adversaries: Vec<AdversaryView>,
    pub score: u32,
    pub combo: u32,
    #[serde(rename = "powerTimer")]
    pub power_timer: u32,
    #[serde(rename = "remainingPickups")]
    pub remaining_pickups: usize,
    pub lives: u32,
    pub level: u32,
    pub outcome: Outcome,
    pub events: Vec<RoundEvent>,
}
