use crate::comp::Particle;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Flag,
    Medkit,
}

/// A loose pickup lying in the world. Items share the soldier integrator so
/// a thrown flag arcs and settles like everything else.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub particle: Particle,
    /// Set once the item has come to rest on a surface.
    pub rested: bool,
}

impl Item {
    pub fn new(kind: ItemKind, mut particle: Particle) -> Self {
        particle.damping = 0.95;
        Self { kind, particle, rested: false }
    }
}
