use crate::{
    comp::{AnimId, Animation, Control, Particle, Skeleton, Weapon, WeaponKind},
    geom,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use vek::*;

/// Stable 1-based handle of a soldier slot. Id `0` never exists on the
/// wire, which keeps an accidental zero-initialized id loud.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SoldierId(pub u8);

impl fmt::Display for SoldierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "soldier:{}", self.0)
    }
}

/// Body posture, decided every tick by the active leg state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Stance {
    Stand,
    Crouch,
    Prone,
}

/// One player avatar: a primary particle for movement, a skeleton for pose,
/// two animation channels and the flags the engine maintains around them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
    pub nickname: String,
    pub active: bool,
    pub dead_meat: bool,
    pub particle: Particle,
    pub skeleton: Skeleton,
    pub control: Control,
    pub legs: Animation,
    pub body: Animation,
    pub stance: Stance,
    /// Facing: `1` right, `-1` left. Follows the aim point.
    pub direction: i8,
    pub health: f32,
    /// Remaining jet fuel, in ticks of thrust.
    pub jets_count: i32,
    pub weapons: [Weapon; 2],
    pub active_weapon: usize,
    /// Ticks until the active weapon may fire again.
    pub fire_cooldown: u32,
    pub has_flag: bool,
    pub on_ground: bool,
    pub on_ground_for_law: bool,
    pub on_ground_last_frame: bool,
    pub on_ground_permanent: bool,
}

impl Soldier {
    pub const MAX_HEALTH: f32 = 100.0;

    pub fn new(id: SoldierId, nickname: impl Into<String>, pos: Vec2<f32>, gravity: f32) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            active: true,
            dead_meat: false,
            particle: Particle::new(pos, gravity),
            skeleton: Skeleton::soldier(pos, gravity),
            control: Control::default(),
            legs: Animation::new(AnimId::Stand),
            body: Animation::new(AnimId::Aim),
            stance: Stance::Stand,
            direction: 1,
            health: Self::MAX_HEALTH,
            jets_count: 0,
            weapons: [Weapon::new(WeaponKind::AssaultRifle), Weapon::new(WeaponKind::Shotgun)],
            active_weapon: 0,
            fire_cooldown: 0,
            has_flag: false,
            on_ground: false,
            on_ground_for_law: false,
            on_ground_last_frame: false,
            on_ground_permanent: false,
        }
    }

    /// Puts the soldier back into play at `pos` with full health and fuel.
    pub fn respawn(&mut self, pos: Vec2<f32>, jet_cap: i32, gravity: f32) {
        self.dead_meat = false;
        self.particle = Particle::new(pos, gravity);
        self.skeleton = Skeleton::soldier(pos, gravity);
        self.legs = Animation::new(AnimId::Stand);
        self.body = Animation::new(AnimId::Aim);
        self.stance = Stance::Stand;
        self.health = Self::MAX_HEALTH;
        self.jets_count = jet_cap;
        self.fire_cooldown = 0;
        self.has_flag = false;
        self.on_ground = false;
        self.on_ground_for_law = false;
        self.on_ground_last_frame = false;
        self.on_ground_permanent = false;
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapons[self.active_weapon]
    }

    pub fn weapon_mut(&mut self) -> &mut Weapon {
        &mut self.weapons[self.active_weapon]
    }

    pub fn switch_weapon(&mut self) {
        self.active_weapon ^= 1;
    }

    /// Unit vector from the soldier toward the aim point, falling back to
    /// straight-ahead when the cursor sits on the soldier.
    pub fn aim_dir(&self) -> Vec2<f32> {
        geom::normalized_or(
            self.control.aim - self.particle.pos,
            Vec2::new(self.direction as f32, 0.0),
        )
    }
}
