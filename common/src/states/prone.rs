use crate::{
    comp::{AnimId, Soldier, Stance},
    consts::*,
    event::Emitter,
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

pub struct Prone;

impl StateBehavior for Prone {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        // Prone is held, not toggled: releasing the key stands back up.
        if ctx.control.up || !ctx.control.prone {
            return Some(AnimId::GetUp);
        }
        if ctx.control.move_dir() != 0 {
            return Some(AnimId::ProneMove);
        }
        None
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Prone;
        utils::apply_friction(soldier, PRONE_FRICTION);
    }
}

pub struct ProneMove;

impl StateBehavior for ProneMove {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        if ctx.control.up || !ctx.control.prone {
            return Some(AnimId::GetUp);
        }
        if ctx.control.move_dir() == 0 {
            return Some(AnimId::Prone);
        }
        None
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Prone;
        if soldier.on_ground {
            utils::accelerate(
                soldier,
                soldier.control.move_dir(),
                PRONE_MOVE_ACCEL,
                PRONE_MOVE_SPEED,
            );
        }
    }
}
