use crate::comp::AnimId;
use serde::{Deserialize, Serialize};
use vek::*;

/// One tick of player intent: the raw input snapshot a client samples, sends
/// over the wire and feeds into the engine. `aim` is the world-space point
/// the player is aiming at, not a direction.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub prone: bool,
    pub fire: bool,
    pub jets: bool,
    pub change: bool,
    pub throw_grenade: bool,
    pub drop: bool,
    pub reload: bool,
    pub flag_throw: bool,
    pub aim: Vec2<f32>,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            left: false,
            right: false,
            up: false,
            down: false,
            prone: false,
            fire: false,
            jets: false,
            change: false,
            throw_grenade: false,
            drop: false,
            reload: false,
            flag_throw: false,
            aim: Vec2::zero(),
        }
    }
}

/// The body actions that cannot overlap: a soldier has two hands.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExclusiveAction {
    None,
    ThrowGrenade,
    Change,
    Drop,
    Reload,
}

impl ExclusiveAction {
    /// Which exclusive action a body animation represents, if any.
    pub fn of(body: AnimId) -> Self {
        match body {
            AnimId::ThrowGrenade => ExclusiveAction::ThrowGrenade,
            AnimId::Change => ExclusiveAction::Change,
            AnimId::ThrowWeapon => ExclusiveAction::Drop,
            AnimId::Reload => ExclusiveAction::Reload,
            _ => ExclusiveAction::None,
        }
    }
}

impl Control {
    /// Resolves conflicting exclusive presses into at most one.
    ///
    /// An action already playing on the body channel always survives, so
    /// mashing keys cannot cancel it mid-animation. Otherwise the highest
    /// priority press wins, ordered grenade, weapon change, drop, reload.
    /// Pure: same inputs resolve the same way on client and server.
    pub fn resolve(mut self, active: ExclusiveAction) -> Control {
        let pressed = self.throw_grenade as u32
            + self.change as u32
            + self.drop as u32
            + self.reload as u32;
        if pressed <= 1 {
            return self;
        }

        let keep = match active {
            ExclusiveAction::ThrowGrenade if self.throw_grenade => ExclusiveAction::ThrowGrenade,
            ExclusiveAction::Change if self.change => ExclusiveAction::Change,
            ExclusiveAction::Drop if self.drop => ExclusiveAction::Drop,
            ExclusiveAction::Reload if self.reload => ExclusiveAction::Reload,
            _ if self.throw_grenade => ExclusiveAction::ThrowGrenade,
            _ if self.change => ExclusiveAction::Change,
            _ if self.drop => ExclusiveAction::Drop,
            _ => ExclusiveAction::Reload,
        };

        self.throw_grenade = keep == ExclusiveAction::ThrowGrenade;
        self.change = keep == ExclusiveAction::Change;
        self.drop = keep == ExclusiveAction::Drop;
        self.reload = keep == ExclusiveAction::Reload;
        self
    }

    /// Horizontal movement intent: `1` right, `-1` left, `0` neither or both.
    pub fn move_dir(&self) -> i8 {
        self.right as i8 - self.left as i8
    }
}
