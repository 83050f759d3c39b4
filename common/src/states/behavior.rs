use crate::{
    comp::{AnimId, Control, Soldier, Stance, WeaponKind},
    event::Emitter,
};
use vek::*;

/// Read-only view of a soldier that transition decisions run against.
///
/// Built per channel: `anim_done` refers to the channel being asked, so a
/// finished leg animation never ends a body action early.
pub struct StateCtx<'a> {
    pub control: &'a Control,
    pub stance: Stance,
    pub direction: i8,
    pub on_ground: bool,
    pub vel: Vec2<f32>,
    pub anim_done: bool,
    /// Active weapon is bare fists.
    pub fists: bool,
}

impl<'a> StateCtx<'a> {
    pub fn legs(soldier: &'a Soldier) -> Self {
        Self::build(soldier, soldier.legs.done())
    }

    pub fn body(soldier: &'a Soldier) -> Self {
        Self::build(soldier, soldier.body.done())
    }

    fn build(soldier: &'a Soldier, anim_done: bool) -> Self {
        Self {
            control: &soldier.control,
            stance: soldier.stance,
            direction: soldier.direction,
            on_ground: soldier.on_ground,
            vel: soldier.particle.velocity,
            anim_done,
            fists: soldier.weapon().kind == WeaponKind::Fists,
        }
    }
}

/// One movement or body state.
///
/// `handle_input` is pure: it looks at the context and names the next state,
/// or `None` to stay. All mutation happens in `update` and the enter/exit
/// hooks, which the engine calls in a fixed order every tick.
pub trait StateBehavior: Sync {
    fn handle_input(&self, ctx: &StateCtx<'_>) -> Option<AnimId>;

    fn update(&self, _soldier: &mut Soldier, _emitter: &mut Emitter) {}

    fn on_enter(&self, _soldier: &mut Soldier, _emitter: &mut Emitter) {}

    fn on_exit(&self, _soldier: &mut Soldier, _emitter: &mut Emitter) {}
}
