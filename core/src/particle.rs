use crate::*;

pub const PARTICLE_CAPACITY: usize = 8 * 1024;

/// Constant downward acceleration applied to `vel.y` each frame.
const GRAVITY: f32 = 0.1;

/// How far below the visible area a particle may fall before its slot is
/// recycled.
const CULL_MARGIN: f32 = 10.0;

const PARTICLE_SIZE: f32 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq)]
struct Particle {
    pos: [f32; 2],
    vel: [f32; 2],
    color: Rgba,
    alive: bool,
}

/// Fixed-capacity pool of decorative particles with free-slot recycling.
///
/// Every slot index is either active or on the free stack, never both; a
/// retired slot is not drawn again until a spawn reuses it.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    free: Vec<usize>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Particles currently being simulated and drawn.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots ever touched, live or recycled. Growth stops once spawns start
    /// reusing the free stack.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Launches a particle at `pos` with an RNG-derived velocity: horizontal
    /// component in [-1, 1], vertical in [-2, 0].
    pub fn spawn(&mut self, pos: [f32; 2], color: Rgba, rng: &mut Scrambler) -> Result<()> {
        let vel = [(rng.next_unit() - 0.5) * 2.0, rng.next_unit() * -2.0];
        let particle = Particle {
            pos,
            vel,
            color,
            alive: true,
        };

        if let Some(slot) = self.free.pop() {
            self.slots[slot] = particle;
        } else if self.slots.len() < self.capacity {
            self.slots.push(particle);
        } else {
            return Err(GameError::CapacityExceeded("particle"));
        }
        Ok(())
    }

    /// One simulation step: integrate, apply gravity, retire slots that fell
    /// past `floor_y` plus a margin, and emit a small quad per live particle.
    pub fn update_and_draw(&mut self, floor_y: f32, out: &mut VertexBuffer) -> Result<()> {
        for slot in 0..self.slots.len() {
            let particle = &mut self.slots[slot];
            if !particle.alive {
                continue;
            }

            particle.pos[0] += particle.vel[0];
            particle.pos[1] += particle.vel[1];
            particle.vel[1] += GRAVITY;

            if particle.pos[1] > floor_y + CULL_MARGIN {
                particle.alive = false;
                self.free.push(slot);
            } else {
                let Particle { pos, color, .. } = self.slots[slot];
                out.draw_rect(pos[0], pos[1], PARTICLE_SIZE, PARTICLE_SIZE, color)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_buffer() -> VertexBuffer {
        VertexBuffer::new(VERTEX_CAPACITY)
    }

    #[test]
    fn spawn_velocity_is_within_contract() {
        let mut rng = Scrambler::new(3);
        let mut pool = ParticlePool::new(16);
        for _ in 0..16 {
            pool.spawn([0.0, 0.0], PARTICLE_COLOR, &mut rng).unwrap();
        }
        for particle in &pool.slots {
            assert!((-1.0..=1.0).contains(&particle.vel[0]));
            assert!((-2.0..=0.0).contains(&particle.vel[1]));
        }
    }

    #[test]
    fn expired_slots_are_recycled_without_growth() {
        let mut rng = Scrambler::new(1);
        let mut pool = ParticlePool::new(16);
        // spawn below the floor so one step retires all three
        for _ in 0..3 {
            pool.spawn([0.0, 1000.0], PARTICLE_COLOR, &mut rng).unwrap();
        }
        pool.update_and_draw(140.0, &mut scratch_buffer()).unwrap();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.slot_count(), 3);

        for _ in 0..2 {
            pool.spawn([0.0, 0.0], PARTICLE_COLOR, &mut rng).unwrap();
        }
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.slot_count(), 3);
    }

    #[test]
    fn retired_slot_is_never_drawn() {
        let mut rng = Scrambler::new(1);
        let mut pool = ParticlePool::new(4);
        pool.spawn([0.0, 1000.0], PARTICLE_COLOR, &mut rng).unwrap();
        pool.update_and_draw(140.0, &mut scratch_buffer()).unwrap();

        let mut out = scratch_buffer();
        pool.update_and_draw(140.0, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn live_particle_emits_one_quad() {
        let mut rng = Scrambler::new(1);
        let mut pool = ParticlePool::new(4);
        pool.spawn([10.0, 10.0], PARTICLE_COLOR, &mut rng).unwrap();

        let mut out = scratch_buffer();
        pool.update_and_draw(140.0, &mut out).unwrap();
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn full_pool_rejects_spawn() {
        let mut rng = Scrambler::new(1);
        let mut pool = ParticlePool::new(2);
        pool.spawn([0.0, 0.0], PARTICLE_COLOR, &mut rng).unwrap();
        pool.spawn([0.0, 0.0], PARTICLE_COLOR, &mut rng).unwrap();
        assert_eq!(
            pool.spawn([0.0, 0.0], PARTICLE_COLOR, &mut rng),
            Err(GameError::CapacityExceeded("particle"))
        );
    }
}
