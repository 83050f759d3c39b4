use crate::comp::{Particle, SoldierId};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bullet,
    Grenade,
}

impl ProjectileKind {
    /// Ticks a projectile may live before it is culled.
    pub fn timeout(self) -> u32 {
        match self {
            ProjectileKind::Bullet => 180,
            ProjectileKind::Grenade => 150,
        }
    }

    /// Grenades arc, bullets barely drop.
    pub fn gravity_mult(self) -> f32 {
        match self {
            ProjectileKind::Bullet => 0.15,
            ProjectileKind::Grenade => 0.75,
        }
    }

    /// Health removed from a soldier on a direct hit.
    pub fn damage(self) -> f32 {
        match self {
            ProjectileKind::Bullet => 18.0,
            ProjectileKind::Grenade => 60.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: SoldierId,
    pub kind: ProjectileKind,
    pub particle: Particle,
    pub timeout: u32,
}

impl Projectile {
    pub fn new(owner: SoldierId, kind: ProjectileKind, mut particle: Particle) -> Self {
        particle.damping = 1.0;
        particle.gravity_mult = kind.gravity_mult();
        Self { owner, kind, particle, timeout: kind.timeout() }
    }
}
