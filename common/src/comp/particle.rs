use serde::{Deserialize, Serialize};
use vek::*;

/// A point mass. Soldiers, projectiles, items and every skeleton joint are
/// all driven by this one integrator so their motion stays consistent.
///
/// Integration runs in per-tick units: `velocity` is displacement per tick
/// and `force` is velocity change per tick. Whatever pushed the particle
/// this tick is consumed by the step, which leaves `force` holding only
/// gravity for the next one.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub active: bool,
    pub pos: Vec2<f32>,
    pub old_pos: Vec2<f32>,
    pub velocity: Vec2<f32>,
    pub force: Vec2<f32>,
    pub one_over_mass: f32,
    pub damping: f32,
    pub gravity_mult: f32,
}

impl Particle {
    pub fn new(pos: Vec2<f32>, gravity: f32) -> Self {
        Self {
            active: true,
            pos,
            old_pos: pos,
            velocity: Vec2::zero(),
            force: Vec2::new(0.0, gravity),
            one_over_mass: 1.0,
            damping: 0.99,
            gravity_mult: 1.0,
        }
    }

    /// Forward Euler step used by live soldiers, projectiles and items.
    pub fn euler_step(&mut self, gravity: f32) {
        self.velocity += self.force * self.one_over_mass;
        self.velocity *= self.damping;
        self.old_pos = self.pos;
        self.pos += self.velocity;
        self.force = Vec2::new(0.0, gravity * self.gravity_mult);
    }

    /// Position Verlet step used by skeleton joints and dead bodies, where
    /// the constraint pass afterwards corrects positions directly.
    pub fn verlet_step(&mut self, gravity: f32) {
        let delta = (self.pos - self.old_pos) * self.damping + self.force * self.one_over_mass;
        self.old_pos = self.pos;
        self.pos += delta;
        self.velocity = delta;
        self.force = Vec2::new(0.0, gravity * self.gravity_mult);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_step_consumes_force_and_keeps_gravity() {
        let mut p = Particle::new(Vec2::zero(), 0.06);
        p.force += Vec2::new(1.0, 0.0);
        p.euler_step(0.06);
        // Impulse applied once, damped.
        assert!((p.velocity.x - 1.0 * p.damping).abs() < 1e-6);
        assert_eq!(p.force, Vec2::new(0.0, 0.06));
        let vx = p.velocity.x;
        p.euler_step(0.06);
        // No new horizontal force, only damping.
        assert!((p.velocity.x - vx * p.damping).abs() < 1e-6);
        assert!(p.velocity.y > 0.0, "gravity pulls downward (+y)");
    }

    #[test]
    fn verlet_step_preserves_motion() {
        let mut p = Particle::new(Vec2::new(10.0, 10.0), 0.0);
        p.damping = 1.0;
        p.force = Vec2::zero();
        p.pos += Vec2::new(2.0, 0.0);
        for _ in 0..3 {
            p.verlet_step(0.0);
        }
        // Uniform motion continues from the implied velocity.
        assert!((p.pos.x - 18.0).abs() < 1e-4);
        assert_eq!(p.pos.y, 10.0);
    }

    #[test]
    fn same_inputs_same_bits() {
        let step = |seed: f32| {
            let mut p = Particle::new(Vec2::new(seed, 0.0), 0.06);
            for i in 0..100 {
                p.force += Vec2::new((i % 3) as f32 * 0.01, -0.02);
                p.euler_step(0.06);
            }
            (p.pos.x.to_bits(), p.pos.y.to_bits(), p.velocity.x.to_bits(), p.velocity.y.to_bits())
        };
        assert_eq!(step(1.5), step(1.5));
    }
}
