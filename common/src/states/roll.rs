use crate::{
    comp::{AnimId, Soldier, Stance},
    consts::ROLL_SPEED,
    event::{Emitter, SimEvent},
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

const ROLL_ACCEL: f32 = 0.3;

// A roll is committed: nothing interrupts it until the animation ends.
fn roll_next(ctx: &StateCtx<'_>) -> Option<AnimId> {
    if !ctx.anim_done {
        return None;
    }
    if !ctx.on_ground {
        return Some(AnimId::Fall);
    }
    let dir = ctx.control.move_dir();
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
    Some(AnimId::Stand)
}

pub struct Roll;

impl StateBehavior for Roll {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        roll_next(ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Crouch;
        utils::accelerate(soldier, soldier.direction, ROLL_ACCEL, ROLL_SPEED);
    }

    fn on_enter(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        emitter.emit(SimEvent::Rolled { soldier: soldier.id, backwards: false });
    }
}

pub struct RollBack;

impl StateBehavior for RollBack {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        roll_next(ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Crouch;
        utils::accelerate(soldier, -soldier.direction, ROLL_ACCEL, ROLL_SPEED);
    }

    fn on_enter(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        emitter.emit(SimEvent::Rolled { soldier: soldier.id, backwards: true });
    }
}
