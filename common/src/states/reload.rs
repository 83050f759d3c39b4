use crate::{
    comp::{AnimId, Soldier},
    event::{Emitter, SimEvent},
    states::behavior::{StateBehavior, StateCtx},
};

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        ctx.anim_done.then_some(AnimId::Aim)
    }

    // The clip refills when the animation completes. The only way out of
    // this state is finishing it, so the exit hook is the completion hook.
    fn on_exit(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        soldier.weapon_mut().reload();
        emitter.emit(SimEvent::WeaponReloaded { soldier: soldier.id });
    }
}
