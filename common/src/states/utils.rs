use crate::{
    comp::{AnimId, Soldier},
    consts::*,
    states::behavior::StateCtx,
};

/// Pushes horizontally toward `dir` while below `target_speed` in that
/// direction. Past the target no force is added and damping takes over,
/// which gives the asymptotic ramp toward top speed.
pub fn accelerate(soldier: &mut Soldier, dir: i8, accel: f32, target_speed: f32) {
    if dir == 0 {
        return;
    }
    if soldier.particle.velocity.x * (dir as f32) < target_speed {
        soldier.particle.force.x += accel * dir as f32;
    }
}

/// Bleeds horizontal speed while standing on something.
pub fn apply_friction(soldier: &mut Soldier, friction: f32) {
    if soldier.on_ground {
        soldier.particle.velocity.x *= friction;
    }
}

/// Weak horizontal steering while airborne.
pub fn air_control(soldier: &mut Soldier) {
    if !soldier.on_ground {
        accelerate(soldier, soldier.control.move_dir(), FLY_ACCEL, FLY_SPEED);
    }
}

/// Forward or backward run depending on whether movement matches facing.
pub fn run_state(move_dir: i8, facing: i8) -> AnimId {
    if move_dir == facing { AnimId::Run } else { AnimId::RunBack }
}

pub fn crouch_run_state(move_dir: i8, facing: i8) -> AnimId {
    if move_dir == facing { AnimId::CrouchRun } else { AnimId::CrouchRunBack }
}

/// Roll direction from current horizontal motion, backwards when the
/// soldier is moving against their facing.
pub fn roll_state(vel_x: f32, facing: i8) -> AnimId {
    if vel_x * facing as f32 >= 0.0 { AnimId::Roll } else { AnimId::RollBack }
}

/// Where to land when ground reappears under the feet. Holding down while
/// moving fast converts the landing into a roll.
pub fn landing_state(ctx: &StateCtx<'_>) -> AnimId {
    let dir = ctx.control.move_dir();
    if ctx.control.down {
        if ctx.vel.x.abs() > ROLL_TRIGGER_SPEED {
            roll_state(ctx.vel.x, ctx.direction)
        } else if dir != 0 {
            crouch_run_state(dir, ctx.direction)
        } else {
            AnimId::Crouch
        }
    } else if dir != 0 {
        run_state(dir, ctx.direction)
    } else {
        AnimId::Stand
    }
}
