use crate::*;

/// Particles launched from every newly opened cell.
const PARTICLES_PER_REVEAL: usize = 10;

/// The three-entry-point façade the host drives: build it once, feed it
/// clicks between frames, call [`Game::advance_frame`] once per frame and
/// upload [`Game::vertex_bytes`] afterwards.
///
/// All state is owned here and mutated synchronously; the host must call from
/// a single logical thread and never reentrantly.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    particles: ParticlePool,
    vertices: VertexBuffer,
    rng: Scrambler,
}

impl Game {
    /// A standard game: 20x20 cells, 40 bombs.
    pub fn new(seed: i32) -> Self {
        Self::with_config(GameConfig::default(), seed).expect("default config is valid")
    }

    pub fn with_config(config: GameConfig, seed: i32) -> Result<Self> {
        let mut rng = Scrambler::new(seed);
        let board = Board::generate(config, &mut rng)?;
        Ok(Self {
            config,
            board,
            particles: ParticlePool::new(PARTICLE_CAPACITY),
            vertices: VertexBuffer::new(VERTEX_CAPACITY),
            rng,
        })
    }

    /// Starts a fresh game with the same configuration, replacing all prior
    /// state wholesale.
    pub fn reset(&mut self, seed: i32) {
        *self = Self::with_config(self.config, seed).expect("config was already validated");
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    /// The triangle stream built by the last [`Game::advance_frame`] call,
    /// valid until the next call into the game.
    pub fn vertices(&self) -> &[Vertex] {
        self.vertices.as_slice()
    }

    /// Same stream as raw bytes, ready for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        self.vertices.as_bytes()
    }

    fn cell_from_pixel(&self, x: f32, y: f32) -> Option<Coord2> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let (width, height) = self.config.size;
        let cx = (x / CELL_PX) as u32;
        let cy = (y / CELL_PX) as u32;
        (cx < u32::from(width) && cy < u32::from(height))
            .then(|| (cx as Coord, cy as Coord))
    }

    /// Resolves a pixel-space click. Secondary action toggles the mark;
    /// primary action chords on an opened cell and reveals otherwise.
    /// Clicks outside the board are ignored.
    pub fn on_click(&mut self, x: f32, y: f32, secondary: bool) -> Result<()> {
        let Some(coords) = self.cell_from_pixel(x, y) else {
            log::debug!("click at ({}, {}) misses the board, ignored", x, y);
            return Ok(());
        };

        if secondary {
            if self.board.toggle_mark(coords)?.has_update() {
                log::debug!("mark toggled at {:?}", coords);
            }
            return Ok(());
        }

        let opened = if self.board.cell_at(coords).state == CellState::Opened {
            self.board.chord(coords)?
        } else {
            self.board.uncover(coords)?
        };

        for opened_coords in opened {
            self.spawn_burst(opened_coords)?;
        }
        Ok(())
    }

    fn spawn_burst(&mut self, (cx, cy): Coord2) -> Result<()> {
        let pos = [f32::from(cx) * CELL_PX, f32::from(cy) * CELL_PX];
        for _ in 0..PARTICLES_PER_REVEAL {
            self.particles.spawn(pos, PARTICLE_COLOR, &mut self.rng)?;
        }
        Ok(())
    }

    /// Advances particles and rebuilds the vertex buffer from scratch,
    /// returning the vertex count written. `timestamp` is accepted for the
    /// host's convenience but unused; motion is fixed-step per frame.
    pub fn advance_frame(&mut self, _timestamp: f64) -> Result<u32> {
        self.vertices.clear();
        self.vertices.draw_board(&self.board)?;
        let floor_y = f32::from(self.config.size.1) * CELL_PX;
        self.particles.update_and_draw(floor_y, &mut self.vertices)?;
        Ok(self.vertices.len() as u32)
    }
}
