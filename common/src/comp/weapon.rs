use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum WeaponKind {
    Fists,
    AssaultRifle,
    Shotgun,
}

impl WeaponKind {
    pub fn clip_size(self) -> u32 {
        match self {
            WeaponKind::Fists => 0,
            WeaponKind::AssaultRifle => 25,
            WeaponKind::Shotgun => 7,
        }
    }

    /// Ticks between shots.
    pub fn fire_interval(self) -> u32 {
        match self {
            WeaponKind::Fists => 18,
            WeaponKind::AssaultRifle => 6,
            WeaponKind::Shotgun => 36,
        }
    }

    pub fn damage(self) -> f32 {
        match self {
            WeaponKind::Fists => 15.0,
            WeaponKind::AssaultRifle => 11.0,
            WeaponKind::Shotgun => 26.0,
        }
    }
}

/// One carried weapon slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub ammo: u32,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self { kind, ammo: kind.clip_size() }
    }

    pub fn fists() -> Self {
        Self::new(WeaponKind::Fists)
    }

    pub fn reload(&mut self) {
        self.ammo = self.kind.clip_size();
    }
}
