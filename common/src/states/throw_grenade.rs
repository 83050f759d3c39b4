use crate::{
    comp::{AnimId, ProjectileKind, Soldier},
    consts::{GRENADE_SPEED, MUZZLE_OFFSET},
    event::{Emitter, SimEvent},
    states::behavior::{StateBehavior, StateCtx},
};

/// Frame at which the grenade leaves the hand.
const RELEASE_FRAME: u32 = 24;

pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        ctx.anim_done.then_some(AnimId::Aim)
    }

    fn update(&self, soldier: &mut Soldier, emitter: &mut Emitter) {
        if soldier.body.frame == RELEASE_FRAME && soldier.body.count == 0 {
            let dir = soldier.aim_dir();
            emitter.emit(SimEvent::ProjectileSpawned {
                owner: soldier.id,
                kind: ProjectileKind::Grenade,
                pos: soldier.particle.pos + dir * MUZZLE_OFFSET,
                // Inherits the thrower's momentum.
                vel: dir * GRENADE_SPEED + soldier.particle.velocity,
            });
        }
    }
}
