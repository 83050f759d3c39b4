use crate::{comp::Particle, consts::EPSILON};
use serde::{Deserialize, Serialize};
use vek::*;

// Joint offsets from the soldier origin (between the feet), mirrored on x
// for a left-facing soldier. Indices are referenced by LINKS below.
const FRAME: [(f32, f32); 14] = [
    (-3.0, 0.0),   // 0 left foot
    (3.0, 0.0),    // 1 right foot
    (-2.5, -3.5),  // 2 left knee
    (2.5, -3.5),   // 3 right knee
    (-1.5, -7.0),  // 4 left hip
    (1.5, -7.0),   // 5 right hip
    (0.0, -7.5),   // 6 pelvis
    (0.0, -10.0),  // 7 torso
    (-2.0, -12.0), // 8 left shoulder
    (2.0, -12.0),  // 9 right shoulder
    (-3.5, -9.5),  // 10 left elbow
    (3.5, -9.5),   // 11 right elbow
    (0.0, -13.5),  // 12 neck
    (0.0, -15.0),  // 13 head
];

const LINKS: [(usize, usize); 13] = [
    (0, 2),
    (1, 3),
    (2, 4),
    (3, 5),
    (4, 6),
    (5, 6),
    (6, 7),
    (7, 8),
    (7, 9),
    (8, 10),
    (9, 11),
    (7, 12),
    (12, 13),
];

/// A rigid distance constraint between two joints.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Constraint {
    pub a: usize,
    pub b: usize,
    pub rest_length: f32,
}

/// The articulated body of a soldier: one particle per joint plus the
/// distance constraints that keep them bone-lengths apart.
///
/// While the soldier is alive the skeleton is kinematic, snapped to the
/// primary particle every tick by [`Skeleton::track`]. On death it goes
/// passive and [`Skeleton::verlet_step`] takes over.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Skeleton {
    pub particles: Vec<Particle>,
    pub constraints: Vec<Constraint>,
}

impl Skeleton {
    pub fn soldier(pos: Vec2<f32>, gravity: f32) -> Self {
        let particles: Vec<Particle> = FRAME
            .iter()
            .map(|&(x, y)| {
                let mut p = Particle::new(pos + Vec2::new(x, y), gravity);
                p.damping = 0.98;
                p
            })
            .collect();
        let constraints = LINKS
            .iter()
            .map(|&(a, b)| Constraint {
                a,
                b,
                rest_length: particles[a].pos.distance(particles[b].pos),
            })
            .collect();
        Self { particles, constraints }
    }

    /// Snaps every joint to its pose around the primary particle, facing
    /// `direction`. Joint velocity mirrors the primary so a body that dies
    /// mid-flight keeps its momentum.
    pub fn track(&mut self, primary: &Particle, direction: i8) {
        let flip = direction as f32;
        for (particle, &(x, y)) in self.particles.iter_mut().zip(FRAME.iter()) {
            particle.pos = primary.pos + Vec2::new(x * flip, y);
            particle.old_pos = particle.pos - primary.velocity;
            particle.velocity = primary.velocity;
        }
    }

    /// One passive ragdoll tick: Verlet-integrate every joint, then relax
    /// the constraints once.
    pub fn verlet_step(&mut self, gravity: f32) {
        for particle in &mut self.particles {
            particle.verlet_step(gravity);
        }
        self.satisfy_constraints();
    }

    pub fn satisfy_constraints(&mut self) {
        for c in &self.constraints {
            let delta = self.particles[c.b].pos - self.particles[c.a].pos;
            let dist = delta.magnitude();
            if dist < EPSILON {
                continue;
            }
            let correction = delta * 0.5 * ((dist - c.rest_length) / dist);
            self.particles[c.a].pos += correction;
            self.particles[c.b].pos -= correction;
        }
    }
}
