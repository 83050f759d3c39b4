use crate::{
    comp::{AnimId, Soldier, Stance},
    consts::STAND_FRICTION,
    event::Emitter,
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        let dir = ctx.control.move_dir();
        if !ctx.on_ground {
            return Some(AnimId::Fall);
        }
        if ctx.control.up {
            return Some(if dir != 0 { AnimId::JumpSide } else { AnimId::Jump });
        }
        if ctx.control.prone {
            return Some(AnimId::Prone);
        }
        if ctx.control.down {
            return Some(if dir != 0 {
                utils::crouch_run_state(dir, ctx.direction)
            } else {
                AnimId::Crouch
            });
        }
        if dir != 0 {
            return Some(utils::run_state(dir, ctx.direction));
        }
        None
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Stand;
        utils::apply_friction(soldier, STAND_FRICTION);
    }
}
