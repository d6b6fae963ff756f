use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use game::*;
pub use particle::*;
pub use render::*;
pub use rng::*;
pub use types::*;

mod board;
mod error;
mod game;
mod particle;
mod render;
mod rng;
mod types;

/// Pixel size of one board cell; the default 20x20 board spans 140x140 units.
pub const CELL_PX: f32 = 7.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub bombs: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, bombs: CellCount) -> Self {
        Self { size, bombs }
    }

    /// Clamps the dimensions to a playable range: room for at least one bomb
    /// and one bomb-free cell.
    pub fn new((size_x, size_y): Coord2, bombs: CellCount) -> Self {
        let size_x = size_x.max(1);
        // a 1x1 board cannot hold a bomb and stay playable
        let size_y = if size_x == 1 {
            size_y.max(2)
        } else {
            size_y.max(1)
        };
        let max_bombs = mult(size_x, size_y).saturating_sub(1);
        let bombs = bombs.clamp(1, max_bombs);
        Self::new_unchecked((size_x, size_y), bombs)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked((20, 20), 40)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    /// Whether this outcome could have caused a visible update.
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_to_playable_values() {
        let config = GameConfig::new((0, 5), 9999);
        assert_eq!(config.size, (1, 5));
        assert_eq!(config.bombs, 4);
    }

    #[test]
    fn single_cell_request_grows_to_a_playable_board() {
        let config = GameConfig::new((1, 1), 1);
        assert_eq!(config.size, (1, 2));
        assert!(config.bombs < config.total_cells());
        assert!(Game::with_config(config, 1).is_ok());
    }

    #[test]
    fn mark_outcome_reports_visible_updates() {
        assert!(MarkOutcome::Changed.has_update());
        assert!(!MarkOutcome::NoChange.has_update());
    }

    #[test]
    fn default_config_matches_the_standard_board() {
        let config = GameConfig::default();
        assert_eq!(config.size, (20, 20));
        assert_eq!(config.bombs, 40);
        assert_eq!(config.total_cells(), 400);
    }
}
