use crate::{
    comp::AnimId,
    states::behavior::{StateBehavior, StateCtx},
};

/// The resting body state. Shooting happens here, handled by the engine so
/// the cooldown bookkeeping stays in one place; this behavior only decides
/// when to leave for an exclusive action.
pub struct Behavior;

impl StateBehavior for Behavior {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId> {
        // Control resolution guarantees at most one of these is set.
        if ctx.control.throw_grenade {
            return Some(AnimId::ThrowGrenade);
        }
        if ctx.control.change {
            return Some(AnimId::Change);
        }
        if ctx.control.drop {
            return Some(AnimId::ThrowWeapon);
        }
        if ctx.control.reload {
            return Some(AnimId::Reload);
        }
        if ctx.control.fire && ctx.fists {
            return Some(AnimId::Punch);
        }
        None
    }
}
