use crate::{
    comp::{AnimId, Soldier, Stance},
    consts::*,
    event::{Emitter, SimEvent},
    states::{
        behavior::{StateBehavior, StateCtx},
        utils,
    },
};

fn airborne_next(ctx: &StateCtx<'_>) -> Option<AnimId> {
    if ctx.control.prone {
        return Some(AnimId::Prone);
    }
    // Past the apex the jump becomes a fall. Landing is handled there too,
    // so a jump cut short by a ceiling still resolves.
    if ctx.anim_done || (ctx.vel.y > 0.0 && !ctx.on_ground) {
        return Some(AnimId::Fall);
    }
    None
}

pub struct Jump;

impl StateBehavior for Jump {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        airborne_next(ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Stand;
        utils::air_control(soldier);
    }

    fn on_enter(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        soldier.particle.force.y -= JUMP_FORCE;
        emitter.emit(SimEvent::Jumped { soldier: soldier.id, sideways: false });
    }
}

pub struct JumpSide;

impl StateBehavior for JumpSide {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        airborne_next(ctx)
    }

    fn update(&self, soldier: &mut Soldier, _emitter: &mut Emitter) {
        soldier.stance = Stance::Stand;
        utils::air_control(soldier);
    }

    fn on_enter(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        let dir = match soldier.control.move_dir() {
            0 => soldier.direction,
            d => d,
        };
        soldier.particle.force.y -= JUMP_SIDE_FORCE_Y;
        soldier.particle.force.x += JUMP_SIDE_FORCE_X * dir as f32;
        emitter.emit(SimEvent::Jumped { soldier: soldier.id, sideways: true });
    }
}
