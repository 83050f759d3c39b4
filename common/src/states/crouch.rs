use crate::{
    comp::{AnimId, Soldier, Stance},
    consts::*,
    event::Emitter,
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

pub struct Crouch;

impl StateBehavior for Crouch {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        let dir = ctx.control.move_dir();
        if !ctx.on_ground {
            return Some(AnimId::Fall);
        }
        if ctx.control.up {
            return Some(AnimId::Jump);
        }
        if ctx.control.prone {
            return Some(AnimId::Prone);
        }
        if dir != 0 {
            return Some(utils::crouch_run_state(dir, ctx.direction));
        }
        if !ctx.control.down {
            return Some(AnimId::Stand);
        }
        None
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Crouch;
        utils::apply_friction(soldier, CROUCH_FRICTION);
    }
}

fn crouch_run_next(current: AnimId, ctx: &StateCtx<'_>) -> Option<AnimId> {
    let dir = ctx.control.move_dir();
    if !ctx.on_ground {
        return Some(AnimId::Fall);
    }
    if ctx.control.up {
        return Some(AnimId::JumpSide);
    }
    if ctx.control.prone {
        return Some(AnimId::Prone);
    }
    if dir == 0 {
        return Some(if ctx.control.down { AnimId::Crouch } else { AnimId::Stand });
    }
    if !ctx.control.down {
        return Some(utils::run_state(dir, ctx.direction));
    }
    let want = utils::crouch_run_state(dir, ctx.direction);
    (want != current).then_some(want)
}

pub struct CrouchRun;

impl StateBehavior for CrouchRun {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        crouch_run_next(AnimId::CrouchRun, ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Crouch;
        utils::accelerate(
            soldier,
            soldier.control.move_dir(),
            CROUCH_RUN_ACCEL,
            CROUCH_RUN_SPEED,
        );
    }
}

pub struct CrouchRunBack;

impl StateBehavior for CrouchRunBack {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        crouch_run_next(AnimId::CrouchRunBack, ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Crouch;
        utils::accelerate(
            soldier,
            soldier.control.move_dir(),
            CROUCH_RUN_ACCEL,
            CROUCH_RUN_SPEED,
        );
    }
}
