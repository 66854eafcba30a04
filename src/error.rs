use thiserror::Error;

/// The one failure the simulation surfaces: a maze that cannot be played.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("invalid maze layout: {0}")]
    InvalidMazeLayout(LayoutIssue),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutIssue {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} has width {actual}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown cell symbol {symbol:?} at ({x},{y})")]
    UnknownSymbol { symbol: char, x: i32, y: i32 },
    #[error("border cell ({x},{y}) is open but is not a tunnel edge")]
    OpenBorder { x: i32, y: i32 },
    #[error("tunnel edge ({x},{y}) is not on the left or right border")]
    MisplacedTunnel { x: i32, y: i32 },
    #[error("tunnel edge ({x},{y}) has no counterpart on the opposite border")]
    UnpairedTunnel { x: i32, y: i32 },
    #[error("layout has no player start")]
    MissingPlayerStart,
    #[error("layout has more than one player start")]
    DuplicatePlayerStart,
    #[error("layout has no adversary homes")]
    NoAdversaries,
    #[error("layout has no pickups")]
    NoPickups,
    #[error("layout has no power pickups")]
    NoPowerPickups,
    #[error("{entity} start ({x},{y}) is not walkable")]
    StartNotWalkable { entity: String, x: i32, y: i32 },
    #[error("{entity} start ({x},{y}) has no open neighbor")]
    StartEnclosed { entity: String, x: i32, y: i32 },
    #[error("adversary home ({x},{y}) is the player start")]
    AdversaryOnPlayerStart { x: i32, y: i32 },
    #[error("pickup ({x},{y}) cannot be reached from the player start")]
    UnreachablePickup { x: i32, y: i32 },
}

impl From<LayoutIssue> for MazeError {
    fn from(issue: LayoutIssue) -> Self {
        Self::InvalidMazeLayout(issue)
    }
}

pub type MazeResult<T> = Result<T, MazeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_defect() {
        let err = MazeError::from(LayoutIssue::UnpairedTunnel { x: 0, y: 4 });
        assert_eq!(
            err.to_string(),
            "invalid maze layout: tunnel edge (0,4) has no counterpart on the opposite border"
        );
    }
}
