use crate::{
    comp::{AnimId, Soldier},
    event::{Emitter, SimEvent},
    states::behavior::{StateBehavior, StateCtx},
};

/// Frame at which the weapons visually trade places.
const SWAP_FRAME: u32 = 13;

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        ctx.anim_done.then_some(AnimId::Aim)
    }

    fn update(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        // `count == 0` holds for exactly one update per frame, so the swap
        // fires once even for animations slower than one frame per tick.
        if soldier.body.frame == SWAP_FRAME && soldier.body.count == 0 {
            soldier.switch_weapon();
            emitter.emit(SimEvent::WeaponSwapped {
                soldier: soldier.id,
                to: soldier.weapon().kind,
            });
        }
    }
}
