use crate::{
    comp::{AnimId, Soldier, Stance},
    event::Emitter,
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        if !ctx.anim_done {
            return None;
        }
        if !ctx.on_ground {
            return Some(AnimId::Fall);
        }
        let dir = ctx.control.move_dir();
        if ctx.control.down {
            return Some(AnimId::Crouch);
        }
        if dir != 0 {
            return Some(utils::run_state(dir, ctx.direction));
        }
        Some(AnimId::Stand)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        // Rising passes through a crouch silhouette.
        soldier.stance = Stance::Crouch;
    }
}
