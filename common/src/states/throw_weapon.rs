use crate::{
    comp::{AnimId, Soldier, Weapon, WeaponKind},
    event::{Emitter, SimEvent},
    states::behavior::{StateBehavior, StateCtx},
};

/// Frame at which the weapon leaves the hand.
const RELEASE_FRAME: u32 = 8;

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        ctx.anim_done.then_some(AnimId::Aim)
    }

    fn update(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        if soldier.body.frame == RELEASE_FRAME && soldier.body.count == 0 {
            let kind = soldier.weapon().kind;
            // Empty hands have nothing to throw; the animation still plays.
            if kind != WeaponKind::Fists {
                soldier.weapons[soldier.active_weapon] = Weapon::fists();
                emitter.emit(SimEvent::WeaponDropped { soldier: soldier.id, kind });
            }
        }
    }
}
