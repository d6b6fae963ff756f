use std::collections::VecDeque;
use std::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Reveal status of a single cell.
///
/// `Opened` is terminal: no transition leaves it. Reveal moves
/// `Unopened -> Opened`; toggle-mark flips `Unopened <-> Marked`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Unopened,
    Opened,
    Marked,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub state: CellState,
    pub has_bomb: bool,
}

/// The playing field: a fixed-size grid of cells with bombs assigned once at
/// construction. `has_bomb` never changes afterwards; only `state` moves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// Builds a board and scatters `config.bombs` distinct bombs using `rng`.
    ///
    /// Rejection-samples coordinates until every bomb lands on a bomb-free
    /// cell. The sampling loop is bounded: the scrambler has a fixed point,
    /// and an unlucky seed would otherwise repeat one coordinate forever. Any
    /// bombs still unplaced after the bound fall back to the first free cells
    /// in row-major order, keeping generation deterministic.
    pub fn generate(config: GameConfig, rng: &mut Scrambler) -> Result<Self> {
        let (width, height) = config.size;
        let total = config.total_cells();
        if config.bombs >= total {
            return Err(GameError::TooManyBombs);
        }

        let mut board = Self::empty(config.size);
        let mut placed: CellCount = 0;
        let mut attempts: u32 = 0;
        let max_attempts = u32::from(total) * 64;

        while placed < config.bombs && attempts < max_attempts {
            attempts += 1;
            let cx = rng.next_byte() % width;
            let cy = rng.next_byte() % height;
            let cell = &mut board[(cx, cy)];
            if !cell.has_bomb {
                cell.has_bomb = true;
                placed += 1;
            }
        }

        if placed < config.bombs {
            log::warn!(
                "bomb sampling stalled after {} attempts, placing remaining {} by scan",
                attempts,
                config.bombs - placed
            );
            'scan: for y in 0..height {
                for x in 0..width {
                    if placed == config.bombs {
                        break 'scan;
                    }
                    let cell = &mut board[(x, y)];
                    if !cell.has_bomb {
                        cell.has_bomb = true;
                        placed += 1;
                    }
                }
            }
        }

        Ok(board)
    }

    /// Builds a board with bombs at the given coordinates, mostly for tests.
    pub fn from_bomb_coords(size: Coord2, bomb_coords: &[Coord2]) -> Result<Self> {
        let mut board = Self::empty(size);
        for &coords in bomb_coords {
            board.validate_coords(coords)?;
            board[coords].has_bomb = true;
        }
        Ok(board)
    }

    fn empty(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn bomb_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.has_bomb)
            .count()
            .try_into()
            .unwrap()
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Number of adjacent cells holding a bomb; the cell's own bomb flag is
    /// never counted.
    pub fn adjacent_bomb_count(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbors(coords)
            .filter(|&pos| self[pos].has_bomb)
            .count()
            .try_into()
            .unwrap()
    }

    /// Flips the player mark on an unopened cell. Opened cells are immune.
    pub fn toggle_mark(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use CellState::*;
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;

        Ok(match self[coords].state {
            Unopened => {
                self[coords].state = Marked;
                Changed
            }
            Marked => {
                self[coords].state = Unopened;
                Changed
            }
            Opened => NoChange,
        })
    }

    /// Opens a cell, flood-filling through the contiguous zero-bomb-neighbor
    /// region. Returns every newly opened coordinate so the caller can attach
    /// effects per cell. Opened and marked cells are left untouched.
    ///
    /// The fill runs on an explicit worklist rather than recursion, so depth
    /// is independent of board size. Bombed neighbors never enter the
    /// cascade; a bomb cell only opens when targeted directly or by a chord.
    pub fn uncover(&mut self, coords: Coord2) -> Result<Vec<Coord2>> {
        let coords = self.validate_coords(coords)?;
        let mut opened = Vec::new();

        if self[coords].state != CellState::Unopened {
            return Ok(opened);
        }

        self[coords].state = CellState::Opened;
        opened.push(coords);
        let count = self.adjacent_bomb_count(coords);
        log::debug!("opened cell at {:?}, bomb count: {}", coords, count);

        if count == 0 {
            let mut to_visit: VecDeque<_> = self.fill_candidates(coords).collect();

            while let Some(visit_coords) = to_visit.pop_front() {
                // the queue may hold duplicates; the state check filters them
                if self[visit_coords].state != CellState::Unopened {
                    continue;
                }

                self[visit_coords].state = CellState::Opened;
                opened.push(visit_coords);

                let visit_count = self.adjacent_bomb_count(visit_coords);
                log::trace!(
                    "flood opened cell at {:?}, bomb count: {}",
                    visit_coords,
                    visit_count
                );

                if visit_count == 0 {
                    to_visit.extend(self.fill_candidates(visit_coords));
                }
            }
        }

        Ok(opened)
    }

    /// Unopened, bomb-free neighbors eligible for the flood fill.
    fn fill_candidates(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.cells.iter_neighbors(coords).filter(|&pos| {
            let cell = self[pos];
            !cell.has_bomb && cell.state == CellState::Unopened
        })
    }

    /// Bulk-reveals the neighbors of an opened cell once the player's marks
    /// account for every surrounding bomb. On a mark/bomb count mismatch this
    /// changes nothing. Marked neighbors are trusted and never force-opened,
    /// which means a misplaced mark can leave a bomb for the cascade of an
    /// unmarked neighbor to hit.
    pub fn chord(&mut self, coords: Coord2) -> Result<Vec<Coord2>> {
        let coords = self.validate_coords(coords)?;

        if self[coords].state != CellState::Opened {
            return Ok(Vec::new());
        }

        let mut neighbors = self.cells.iter_neighbors(coords);
        let marks = neighbors
            .by_ref()
            .filter(|&pos| self[pos].state == CellState::Marked)
            .count();
        if marks != usize::from(self.adjacent_bomb_count(coords)) {
            log::debug!("chord at {:?} aborted, {} marks", coords, marks);
            return Ok(Vec::new());
        }

        neighbors.reset();
        let mut opened = Vec::new();
        for pos in neighbors {
            if self[pos].state == CellState::Unopened {
                opened.extend(self.uncover(pos)?);
            }
        }
        Ok(opened)
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
