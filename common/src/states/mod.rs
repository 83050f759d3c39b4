//! Movement and body states, one module per state.
//!
//! Every [`AnimId`] maps to exactly one behavior through [`behavior`], and
//! transitions only ever name ids from the same closed set, so the state
//! machine cannot reach an undefined state at runtime.

pub mod aim;
pub mod behavior;
pub mod change;
pub mod crouch;
pub mod fall;
pub mod get_up;
pub mod jump;
pub mod prone;
pub mod punch;
pub mod reload;
pub mod roll;
pub mod run;
pub mod stand;
pub mod throw_grenade;
pub mod throw_weapon;
pub mod utils;

pub use self::behavior::{StateBehavior, StateCtx};

use crate::comp::AnimId;

/// The behavior driving a state. All ids must be matched here; a new
/// animation without a behavior should fail to compile, not fall through.
pub fn behavior(id: AnimId) -> &'static dyn StateBehavior {
    match id {
        AnimId::Stand => &stand::Behavior,
        AnimId::Run => &run::Run,
        AnimId::RunBack => &run::RunBack,
        AnimId::Jump => &jump::Jump,
        AnimId::JumpSide => &jump::JumpSide,
        AnimId::Fall => &fall::Behavior,
        AnimId::Crouch => &crouch::Crouch,
        AnimId::CrouchRun => &crouch::CrouchRun,
        AnimId::CrouchRunBack => &crouch::CrouchRunBack,
        AnimId::Prone => &prone::Prone,
        AnimId::ProneMove => &prone::ProneMove,
        AnimId::Roll => &roll::Roll,
        AnimId::RollBack => &roll::RollBack,
        AnimId::GetUp => &get_up::Behavior,
        AnimId::Aim => &aim::Behavior,
        AnimId::Change => &change::Behavior,
        AnimId::ThrowGrenade => &throw_grenade::Behavior,
        AnimId::ThrowWeapon => &throw_weapon::Behavior,
        AnimId::Punch => &punch::Behavior,
        AnimId::Reload => &reload::Behavior,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comp::{AnimId, Animation, Control, Soldier, SoldierId},
        consts::GRAVITY,
    };
    use vek::*;

    fn soldier() -> Soldier {
        Soldier::new(SoldierId(1), "grid", Vec2::zero(), GRAVITY)
    }

    /// Exhaustively drives every state through a grid of inputs and
    /// contexts. Any transition must stay within the id space and within
    /// the channel the state belongs to.
    #[test]
    fn transitions_are_total_and_channel_closed() {
        let velocities = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.5, 0.0),
            Vec2::new(-2.5, 0.8),
            Vec2::new(0.4, -1.2),
        ];
        let mut s = soldier();
        for id in AnimId::ALL {
            for bits in 0u32..32 {
                for exclusive in 0..5 {
                    for fire in [false, true] {
                        for on_ground in [false, true] {
                            for done in [false, true] {
                                for vel in velocities {
                                    let mut control = Control {
                                        left: bits & 1 != 0,
                                        right: bits & 2 != 0,
                                        up: bits & 4 != 0,
                                        down: bits & 8 != 0,
                                        prone: bits & 16 != 0,
                                        fire,
                                        ..Control::default()
                                    };
                                    match exclusive {
                                        1 => control.throw_grenade = true,
                                        2 => control.change = true,
                                        3 => control.drop = true,
                                        4 => control.reload = true,
                                        _ => {},
                                    }
                                    s.control = control;
                                    s.on_ground = on_ground;
                                    s.particle.velocity = vel;
                                    s.direction = if bits & 1 != 0 { -1 } else { 1 };
                                    let frame =
                                        if done { id.descriptor().frames } else { 1 };
                                    let anim = Animation {
                                        id,
                                        frame,
                                        count: 0,
                                        speed: id.descriptor().speed,
                                    };
                                    let next = if id.is_legs() {
                                        s.legs = anim;
                                        behavior(id).handle_input(&StateCtx::legs(&s))
                                    } else {
                                        s.body = anim;
                                        behavior(id).handle_input(&StateCtx::body(&s))
                                    };
                                    if let Some(next) = next {
                                        assert_eq!(
                                            next.is_legs(),
                                            id.is_legs(),
                                            "{:?} crossed channels to {:?}",
                                            id,
                                            next
                                        );
                                        assert!(next.descriptor().frames > 0);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn stand_to_run_respects_facing() {
        let mut s = soldier();
        s.on_ground = true;
        s.control.right = true;
        s.direction = 1;
        assert_eq!(
            behavior(AnimId::Stand).handle_input(&StateCtx::legs(&s)),
            Some(AnimId::Run)
        );
        s.direction = -1;
        assert_eq!(
            behavior(AnimId::Stand).handle_input(&StateCtx::legs(&s)),
            Some(AnimId::RunBack)
        );
    }

    #[test]
    fn fast_landing_with_down_held_rolls() {
        let mut s = soldier();
        s.legs = Animation::new(AnimId::Fall);
        s.on_ground = true;
        s.control.down = true;
        s.direction = 1;
        s.particle.velocity = Vec2::new(2.0, 0.0);
        assert_eq!(
            behavior(AnimId::Fall).handle_input(&StateCtx::legs(&s)),
            Some(AnimId::Roll)
        );
        s.particle.velocity = Vec2::new(-2.0, 0.0);
        assert_eq!(
            behavior(AnimId::Fall).handle_input(&StateCtx::legs(&s)),
            Some(AnimId::RollBack)
        );
        // Too slow to roll.
        s.particle.velocity = Vec2::new(0.5, 0.0);
        assert_eq!(
            behavior(AnimId::Fall).handle_input(&StateCtx::legs(&s)),
            Some(AnimId::Crouch)
        );
    }

    #[test]
    fn prone_is_held_not_toggled() {
        let mut s = soldier();
        s.legs = Animation::new(AnimId::Prone);
        s.on_ground = true;
        s.control.prone = true;
        assert_eq!(behavior(AnimId::Prone).handle_input(&StateCtx::legs(&s)), None);
        s.control.prone = false;
        assert_eq!(
            behavior(AnimId::Prone).handle_input(&StateCtx::legs(&s)),
            Some(AnimId::GetUp)
        );
    }

    #[test]
    fn roll_commits_until_animation_ends() {
        let mut s = soldier();
        s.on_ground = true;
        s.control.up = true;
        s.legs = Animation::new(AnimId::Roll);
        assert_eq!(behavior(AnimId::Roll).handle_input(&StateCtx::legs(&s)), None);
        s.legs.frame = AnimId::Roll.descriptor().frames;
        assert!(behavior(AnimId::Roll).handle_input(&StateCtx::legs(&s)).is_some());
    }

    #[test]
    fn aim_starts_exclusive_actions() {
        let mut s = soldier();
        s.control.throw_grenade = true;
        assert_eq!(
            behavior(AnimId::Aim).handle_input(&StateCtx::body(&s)),
            Some(AnimId::ThrowGrenade)
        );
        s.control = Control { reload: true, ..Control::default() };
        assert_eq!(
            behavior(AnimId::Aim).handle_input(&StateCtx::body(&s)),
            Some(AnimId::Reload)
        );
    }
}
