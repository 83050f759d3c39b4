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
        if ctx.on_ground {
            return Some(utils::landing_state(ctx));
        }
        if ctx.control.prone {
            return Some(AnimId::Prone);
        }
        None
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Stand;
        utils::air_control(soldier);
    }
}
