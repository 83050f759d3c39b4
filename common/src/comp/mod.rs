pub mod animation;
pub mod controller;
pub mod item;
pub mod particle;
pub mod projectile;
pub mod skeleton;
pub mod soldier;
pub mod weapon;

// Reexports
pub use self::{
    animation::{AnimDescriptor, AnimId, Animation},
    controller::{Control, ExclusiveAction},
    item::{Item, ItemKind},
    particle::Particle,
    projectile::{Projectile, ProjectileKind},
    skeleton::{Constraint, Skeleton},
    soldier::{Soldier, SoldierId, Stance},
    weapon::{Weapon, WeaponKind},
};
