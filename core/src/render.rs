use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::*;

/// RGBA color with components in `[0.0, 1.0]`.
pub type Rgba = [f32; 4];

pub const VERTEX_CAPACITY: usize = 64 * 1024;

/// uv of a solid texel in the atlas; untextured rects sample only this point.
const SOLID_UV: [f32; 2] = [0.4, 0.0];

/// Horizontal share of the atlas taken by one glyph.
const GLYPH_UV_SPAN: f32 = 0.1;

const GLYPH_W: f32 = 3.0;
const GLYPH_H: f32 = 5.0;

/// Checkerboard tints indexed by `(cx + cy) % 2`.
const GRASS_COLORS: [Rgba; 2] = [[0.3, 0.9, 0.3, 1.0], [0.5, 1.0, 0.5, 1.0]];
const DIRT_COLORS: [Rgba; 2] = [[0.1, 0.1, 0.1, 1.0], [0.3, 0.3, 0.3, 1.0]];

const BOMB_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];
pub const PARTICLE_COLOR: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Glyph tints; slots 0-8 are the digits, slot 9 is the mark glyph.
const GLYPH_COLORS: [Rgba; 10] = [
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [0.9, 0.3, 0.9, 1.0],
];

/// Atlas slot of the mark glyph.
const MARK_GLYPH: u8 = 9;

/// One corner of a textured triangle, laid out to match the host's vertex
/// attribute layout byte for byte.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: Rgba,
}

bitflags! {
    /// Layers a single cell contributes to the frame, back to front.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct DrawLayers: u8 {
        const GRASS = 1;
        const DIRT  = 1 << 1;
        const DIGIT = 1 << 2;
        const BOMB  = 1 << 3;
        const MARK  = 1 << 4;
    }
}

fn cell_layers(cell: Cell) -> DrawLayers {
    use CellState::*;
    match cell.state {
        Unopened => DrawLayers::GRASS,
        Marked => DrawLayers::GRASS | DrawLayers::MARK,
        Opened if cell.has_bomb => DrawLayers::DIRT | DrawLayers::BOMB,
        Opened => DrawLayers::DIRT | DrawLayers::DIGIT,
    }
}

/// The per-frame triangle stream handed to the host renderer.
///
/// Logical length resets at the start of every frame; contents are valid for
/// the host to read until the next call into the game.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexBuffer {
    verts: Vec<Vertex>,
    capacity: usize,
}

impl VertexBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            verts: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.verts.clear();
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.verts
    }

    /// Raw view for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.verts)
    }

    fn push_vertex(&mut self, pos: [f32; 2], uv: [f32; 2], color: Rgba) -> Result<()> {
        if self.verts.len() >= self.capacity {
            return Err(GameError::CapacityExceeded("vertex"));
        }
        self.verts.push(Vertex { pos, uv, color });
        Ok(())
    }

    /// Two triangles spanning the given rect, sampling `uv0..uv1`.
    fn push_quad(
        &mut self,
        [x0, y0]: [f32; 2],
        [x1, y1]: [f32; 2],
        [u0, v0]: [f32; 2],
        [u1, v1]: [f32; 2],
        color: Rgba,
    ) -> Result<()> {
        self.push_vertex([x0, y0], [u0, v0], color)?;
        self.push_vertex([x0, y1], [u0, v1], color)?;
        self.push_vertex([x1, y1], [u1, v1], color)?;
        self.push_vertex([x0, y0], [u0, v0], color)?;
        self.push_vertex([x1, y0], [u1, v0], color)?;
        self.push_vertex([x1, y1], [u1, v1], color)
    }

    /// Solid-colored rect.
    pub fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) -> Result<()> {
        self.push_quad([x, y], [x + w, y + h], SOLID_UV, SOLID_UV, color)
    }

    /// A glyph quad centered in cell `(cx, cy)`, sampling the horizontal
    /// atlas strip `[glyph * 0.1, glyph * 0.1 + 0.1] x [0, 1]`.
    fn draw_glyph(&mut self, (cx, cy): Coord2, glyph: u8) -> Result<()> {
        let x = f32::from(cx) * CELL_PX + (CELL_PX - GLYPH_W) / 2.0;
        let y = f32::from(cy) * CELL_PX + (CELL_PX - GLYPH_H) / 2.0;
        let u = GLYPH_UV_SPAN * f32::from(glyph);
        self.push_quad(
            [x, y],
            [x + GLYPH_W, y + GLYPH_H],
            [u, 0.0],
            [u + GLYPH_UV_SPAN, 1.0],
            GLYPH_COLORS[usize::from(glyph)],
        )
    }

    fn draw_cell(&mut self, board: &Board, coords: Coord2) -> Result<()> {
        let (cx, cy) = coords;
        let layers = cell_layers(board.cell_at(coords));
        let parity = (usize::from(cx) + usize::from(cy)) % 2;
        let x = f32::from(cx) * CELL_PX;
        let y = f32::from(cy) * CELL_PX;

        if layers.contains(DrawLayers::GRASS) {
            self.draw_rect(x, y, CELL_PX, CELL_PX, GRASS_COLORS[parity])?;
        }
        if layers.contains(DrawLayers::DIRT) {
            self.draw_rect(x, y, CELL_PX, CELL_PX, DIRT_COLORS[parity])?;
        }
        if layers.contains(DrawLayers::DIGIT) {
            self.draw_glyph(coords, board.adjacent_bomb_count(coords))?;
        }
        if layers.contains(DrawLayers::BOMB) {
            self.draw_rect(x + 1.0, y + 1.0, CELL_PX - 2.0, CELL_PX - 2.0, BOMB_COLOR)?;
        }
        if layers.contains(DrawLayers::MARK) {
            self.draw_glyph(coords, MARK_GLYPH)?;
        }
        Ok(())
    }

    /// Rasterizes every board cell in row-major order.
    pub fn draw_board(&mut self, board: &Board) -> Result<()> {
        let (width, height) = board.size();
        for cy in 0..height {
            for cx in 0..width {
                self.draw_cell(board, (cx, cy))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_board_emits_one_quad_per_cell() {
        let board = Board::from_bomb_coords((20, 20), &[(0, 0)]).unwrap();
        let mut out = VertexBuffer::new(VERTEX_CAPACITY);
        out.draw_board(&board).unwrap();
        assert_eq!(out.len(), 20 * 20 * 6);
    }

    #[test]
    fn opened_digit_cell_emits_two_quads() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();
        board.uncover((1, 1)).unwrap();
        let mut out = VertexBuffer::new(VERTEX_CAPACITY);
        out.draw_board(&board).unwrap();
        // 3 unopened cells + 1 dirt-with-digit cell
        assert_eq!(out.len(), 3 * 6 + 2 * 6);
    }

    #[test]
    fn digit_glyph_samples_its_atlas_strip() {
        let mut out = VertexBuffer::new(VERTEX_CAPACITY);
        out.draw_glyph((0, 0), 3).unwrap();

        let u0 = GLYPH_UV_SPAN * 3.0;
        let u1 = u0 + GLYPH_UV_SPAN;
        assert!((u0 - 0.3).abs() < 1e-6 && (u1 - 0.4).abs() < 1e-6);

        let us: Vec<f32> = out.as_slice().iter().map(|vert| vert.uv[0]).collect();
        let vs: Vec<f32> = out.as_slice().iter().map(|vert| vert.uv[1]).collect();
        assert!(us.iter().all(|&u| u == u0 || u == u1));
        assert!(vs.contains(&0.0) && vs.contains(&1.0));
    }

    #[test]
    fn overflow_is_a_typed_error() {
        let mut out = VertexBuffer::new(5);
        let result = out.draw_rect(0.0, 0.0, 1.0, 1.0, PARTICLE_COLOR);
        assert_eq!(result, Err(GameError::CapacityExceeded("vertex")));
    }

    #[test]
    fn vertex_byte_view_matches_layout() {
        let mut out = VertexBuffer::new(6);
        out.draw_rect(0.0, 0.0, 1.0, 1.0, PARTICLE_COLOR).unwrap();
        // 8 floats per vertex
        assert_eq!(out.as_bytes().len(), 6 * 8 * 4);
    }
}
