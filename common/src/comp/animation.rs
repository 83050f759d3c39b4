use serde::{Deserialize, Serialize};

/// Every animation the simulation knows. Legs and body animations share one
/// id space but drive two independent channels on a soldier.
///
/// Each id doubles as a movement state: transitions between them are decided
/// by the per-state behaviors in [`crate::states`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AnimId {
    // Legs channel
    Stand,
    Run,
    RunBack,
    Jump,
    JumpSide,
    Fall,
    Crouch,
    CrouchRun,
    CrouchRunBack,
    Prone,
    ProneMove,
    Roll,
    RollBack,
    GetUp,
    // Body channel
    Aim,
    Change,
    ThrowGrenade,
    ThrowWeapon,
    Punch,
    Reload,
}

/// Static playback data for one animation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AnimDescriptor {
    pub frames: u32,
    /// Ticks per frame.
    pub speed: u32,
    /// Looping animations wrap to frame 1, the rest hold their last frame.
    pub looped: bool,
}

impl AnimId {
    pub const ALL: [AnimId; 20] = [
        AnimId::Stand,
        AnimId::Run,
        AnimId::RunBack,
        AnimId::Jump,
        AnimId::JumpSide,
        AnimId::Fall,
        AnimId::Crouch,
        AnimId::CrouchRun,
        AnimId::CrouchRunBack,
        AnimId::Prone,
        AnimId::ProneMove,
        AnimId::Roll,
        AnimId::RollBack,
        AnimId::GetUp,
        AnimId::Aim,
        AnimId::Change,
        AnimId::ThrowGrenade,
        AnimId::ThrowWeapon,
        AnimId::Punch,
        AnimId::Reload,
    ];

    // All ids must be mapped here. Never add a catch-all arm: a new
    // animation without playback data is a bug we want at compile time.
    pub fn descriptor(self) -> &'static AnimDescriptor {
        match self {
            AnimId::Stand => &AnimDescriptor { frames: 20, speed: 3, looped: true },
            AnimId::Run => &AnimDescriptor { frames: 20, speed: 1, looped: true },
            AnimId::RunBack => &AnimDescriptor { frames: 20, speed: 1, looped: true },
            AnimId::Jump => &AnimDescriptor { frames: 17, speed: 1, looped: false },
            AnimId::JumpSide => &AnimDescriptor { frames: 19, speed: 1, looped: false },
            AnimId::Fall => &AnimDescriptor { frames: 13, speed: 1, looped: false },
            AnimId::Crouch => &AnimDescriptor { frames: 21, speed: 1, looped: false },
            AnimId::CrouchRun => &AnimDescriptor { frames: 17, speed: 2, looped: true },
            AnimId::CrouchRunBack => &AnimDescriptor { frames: 16, speed: 2, looped: true },
            AnimId::Prone => &AnimDescriptor { frames: 24, speed: 1, looped: false },
            AnimId::ProneMove => &AnimDescriptor { frames: 8, speed: 2, looped: true },
            AnimId::Roll => &AnimDescriptor { frames: 16, speed: 1, looped: false },
            AnimId::RollBack => &AnimDescriptor { frames: 16, speed: 1, looped: false },
            AnimId::GetUp => &AnimDescriptor { frames: 23, speed: 1, looped: false },
            AnimId::Aim => &AnimDescriptor { frames: 7, speed: 2, looped: false },
            AnimId::Change => &AnimDescriptor { frames: 25, speed: 1, looped: false },
            AnimId::ThrowGrenade => &AnimDescriptor { frames: 36, speed: 1, looped: false },
            AnimId::ThrowWeapon => &AnimDescriptor { frames: 16, speed: 1, looped: false },
            AnimId::Punch => &AnimDescriptor { frames: 11, speed: 1, looped: false },
            AnimId::Reload => &AnimDescriptor { frames: 25, speed: 2, looped: false },
        }
    }

    pub fn is_legs(self) -> bool {
        !self.is_body()
    }

    pub fn is_body(self) -> bool {
        matches!(
            self,
            AnimId::Aim
                | AnimId::Change
                | AnimId::ThrowGrenade
                | AnimId::ThrowWeapon
                | AnimId::Punch
                | AnimId::Reload
        )
    }
}

/// Playback position of one animation channel. Frames are 1-based like the
/// sprite sheets they index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub id: AnimId,
    pub frame: u32,
    pub count: u32,
    pub speed: u32,
}

impl Animation {
    pub fn new(id: AnimId) -> Self {
        Self { id, frame: 1, count: 0, speed: id.descriptor().speed }
    }

    /// Advances playback by one tick.
    pub fn do_animation(&mut self) {
        self.count += 1;
        if self.count >= self.speed {
            self.count = 0;
            self.frame += 1;
            let desc = self.id.descriptor();
            if self.frame > desc.frames {
                self.frame = if desc.looped { 1 } else { desc.frames };
            }
        }
    }

    /// A non-looping animation that has reached its final frame.
    pub fn done(&self) -> bool {
        let desc = self.id.descriptor();
        !desc.looped && self.frame >= desc.frames
    }
}
