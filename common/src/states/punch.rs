use crate::{
    comp::{AnimId, Soldier},
    event::{Emitter, SimEvent},
    states::behavior::{StateBehavior, StateCtx},
};

const STRIKE_FRAME: u32 = 4;
const FIST_REACH: f32 = 10.0;

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        ctx.anim_done.then_some(AnimId::Aim)
    }

    fn update(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        if soldier.body.frame == STRIKE_FRAME && soldier.body.count == 0 {
            emitter.emit(SimEvent::MeleeStrike {
                soldier: soldier.id,
                pos: soldier.particle.pos + soldier.aim_dir() * FIST_REACH,
            });
        }
    }
}
