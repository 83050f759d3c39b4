use crate::{
    comp::{AnimId, Soldier, Stance},
    consts::*,
    event::Emitter,
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

// Backpedaling is slower than running forward.
const BACK_SPEED_MULT: f32 = 0.8;

fn next_state(current: AnimId, ctx: &StateCtx<'_>) -> Option<AnimId> {
    let dir = ctx.control.move_dir();
    if !ctx.on_ground {
        return Some(AnimId::Fall);
    }
    if ctx.control.up {
        return Some(if dir != 0 { AnimId::JumpSide } else { AnimId::Jump });
    }
    if ctx.control.prone {
        return Some(if ctx.vel.x.abs() > ROLL_TRIGGER_SPEED {
            utils::roll_state(ctx.vel.x, ctx.direction)
        } else {
            AnimId::Prone
        });
    }
    if ctx.control.down {
        return Some(if dir != 0 {
            utils::crouch_run_state(dir, ctx.direction)
        } else {
            AnimId::Crouch
        });
    }
    if dir == 0 {
        return Some(AnimId::Stand);
    }
    // Flip between forward and backward run when facing or input reverses.
    let want = utils::run_state(dir, ctx.direction);
    (want != current).then_some(want)
}

pub struct Run;

impl StateBehavior for Run {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        next_state(AnimId::Run, ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Stand;
        utils::accelerate(soldier, soldier.control.move_dir(), RUN_ACCEL, RUN_SPEED);
    }
}

pub struct RunBack;

impl StateBehavior for RunBack {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        next_state(AnimId::RunBack, ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Stand;
        utils::accelerate(
            soldier,
            soldier.control.move_dir(),
            RUN_ACCEL,
            RUN_SPEED * BACK_SPEED_MULT,
        );
    }
}
