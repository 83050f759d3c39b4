//! The soldier physics engine: one function that advances one soldier by
//! exactly one tick.
//!
//! The step order is rigid and shared by live simulation, server catch-up
//! and client replay, which is what makes reconciliation exact:
//!
//! 1. integrate the primary particle
//! 2. resolve conflicting control presses
//! 3. advance the aim point by the tick's velocity, update facing
//! 4. legs state transition
//! 5. fire and flag side effects, then body state transition
//! 6. state updates and animation advance for both channels
//! 7. jet thrust
//! 8. skeleton tracking
//! 9. collision probes against the map
//! 10. ground flag bookkeeping
//! 11. jet fuel regeneration
//! 12. dead soldiers ragdoll instead of 4-11
//! 13. per-axis velocity clamp

use crate::{
    comp::{AnimId, Animation, ExclusiveAction, ProjectileKind, Soldier, Stance, WeaponKind},
    consts::*,
    event::{Emitter, SimEvent},
    geom,
    map::{PolyMap, PolyType, SpawnKind},
    settings::SimSettings,
    states::{self, StateCtx},
};
use vek::*;

const FLAG_THROW_SPEED: f32 = 3.0;

#[derive(Copy, Clone)]
enum Channel {
    Legs,
    Body,
}

pub struct SoldierPhysics;

impl SoldierPhysics {
    pub fn update(
        soldier: &mut Soldier,
        map: &PolyMap,
        settings: &SimSettings,
        emitter: &mut Emitter,
    ) {
        soldier.particle.euler_step(settings.gravity);

        let active = ExclusiveAction::of(soldier.body.id);
        soldier.control = soldier.control.resolve(active);

        // The aim point rides along with the soldier, so an input replayed
        // later keeps the same aim relative to the body.
        soldier.control.aim += soldier.particle.velocity;
        soldier.direction =
            if soldier.control.aim.x >= soldier.particle.pos.x { 1 } else { -1 };

        if soldier.dead_meat {
            soldier.skeleton.verlet_step(settings.gravity);
            Self::clamp_velocity(soldier, settings.max_velocity);
            return;
        }

        Self::transition(soldier, emitter, Channel::Legs);
        Self::try_fire(soldier, emitter);
        Self::try_flag_throw(soldier, emitter);
        Self::transition(soldier, emitter, Channel::Body);

        states::behavior(soldier.legs.id).update(soldier, emitter);
        soldier.legs.do_animation();
        states::behavior(soldier.body.id).update(soldier, emitter);
        soldier.body.do_animation();

        Self::apply_jets(soldier, settings);

        let primary = soldier.particle;
        soldier.skeleton.track(&primary, soldier.direction);

        let was_on_ground = soldier.on_ground;
        soldier.on_ground = false;
        soldier.on_ground_for_law = false;
        Self::check_probes(soldier, map, emitter);

        // The permanent flag only follows the live flag once it has held
        // the same value two ticks in a row, filtering one-tick blips.
        soldier.on_ground_permanent = if soldier.on_ground == was_on_ground {
            soldier.on_ground
        } else {
            soldier.on_ground_permanent
        };
        soldier.on_ground_last_frame = was_on_ground;

        if !soldier.control.jets && soldier.jets_count < map.jet_cap {
            soldier.jets_count += 1;
        }

        Self::clamp_velocity(soldier, settings.max_velocity);
    }

    fn transition(soldier: &mut Soldier, emitter: &mut Emitter, channel: Channel) {
        let current = match channel {
            Channel::Legs => soldier.legs.id,
            Channel::Body => soldier.body.id,
        };
        let next = {
            let ctx = match channel {
                Channel::Legs => StateCtx::legs(soldier),
                Channel::Body => StateCtx::body(soldier),
            };
            states::behavior(current).handle_input(&ctx)
        };
        let next = match next {
            Some(next) if next != current => next,
            _ => return,
        };
        states::behavior(current).on_exit(soldier, emitter);
        match channel {
            Channel::Legs => soldier.legs = Animation::new(next),
            Channel::Body => soldier.body = Animation::new(next),
        }
        states::behavior(next).on_enter(soldier, emitter);
    }

    /// Ticks the fire cooldown and spawns a bullet when the trigger is held
    /// with a ready, loaded weapon. Fists go through the punch state
    /// instead.
    fn try_fire(soldier: &mut Soldier, emitter: &mut Emitter) {
        if soldier.fire_cooldown > 0 {
            soldier.fire_cooldown -= 1;
        }
        if !soldier.control.fire
            || soldier.body.id != AnimId::Aim
            || soldier.fire_cooldown > 0
        {
            return;
        }
        let weapon = *soldier.weapon();
        if weapon.kind == WeaponKind::Fists || weapon.ammo == 0 {
            return;
        }
        soldier.weapon_mut().ammo -= 1;
        soldier.fire_cooldown = weapon.kind.fire_interval();
        let dir = soldier.aim_dir();
        emitter.emit(SimEvent::ProjectileSpawned {
            owner: soldier.id,
            kind: ProjectileKind::Bullet,
            pos: soldier.particle.pos + dir * MUZZLE_OFFSET,
            vel: dir * BULLET_SPEED,
        });
    }

    fn try_flag_throw(soldier: &mut Soldier, emitter: &mut Emitter) {
        if soldier.control.flag_throw && soldier.has_flag {
            soldier.has_flag = false;
            let dir = soldier.aim_dir();
            emitter.emit(SimEvent::FlagThrown {
                soldier: soldier.id,
                pos: soldier.particle.pos + dir * MUZZLE_OFFSET,
                vel: dir * FLAG_THROW_SPEED + soldier.particle.velocity,
            });
        }
    }

    fn apply_jets(soldier: &mut Soldier, settings: &SimSettings) {
        if !soldier.control.jets || soldier.jets_count <= 0 {
            return;
        }
        // Thrust scales with map gravity so jets feel the same on low-g
        // maps instead of turning into rockets.
        let scale = settings.gravity / GRAVITY;
        if soldier.stance == Stance::Prone {
            // Prone jets scoot the soldier backwards along the ground.
            soldier.particle.force.x -=
                soldier.direction as f32 * JET_PRONE_THRUST_X * scale;
            soldier.particle.force.y -= JET_PRONE_THRUST_Y * scale;
        } else if soldier.on_ground {
            soldier.particle.force.y -= JET_THRUST * JET_GROUND_BOOST * scale;
        } else {
            soldier.particle.force.y -= JET_THRUST * scale;
        }
        soldier.jets_count -= 1;
    }

    fn check_probes(soldier: &mut Soldier, map: &PolyMap, emitter: &mut Emitter) {
        let (head_y, side_y) = match soldier.stance {
            Stance::Stand => (PROBE_HEAD_Y_STAND, PROBE_SIDE_Y_STAND),
            Stance::Crouch => (PROBE_HEAD_Y_CROUCH, PROBE_SIDE_Y_CROUCH),
            Stance::Prone => (PROBE_HEAD_Y_PRONE, PROBE_SIDE_Y_PRONE),
        };
        let probes = [
            (Vec2::new(-PROBE_HEAD_X, head_y), 1),
            (Vec2::new(PROBE_HEAD_X, head_y), 1),
            (Vec2::new(0.0, PROBE_GROUND_Y), 1),
            (Vec2::new(-PROBE_SIDE_X, side_y), 0),
            (Vec2::new(PROBE_SIDE_X, side_y), 0),
        ];
        for (offset, area) in probes {
            if Self::check_map_collision(soldier, map, offset, area, emitter) {
                // Touched something lethal and got moved to a spawn; the
                // remaining probes would test the old surroundings.
                return;
            }
        }
        Self::check_radius_collision(soldier, map, emitter);
        Self::check_vertex_collision(soldier, map, emitter);
    }

    /// Tests one probe point against every polygon in its sector and
    /// resolves penetrations in place. `area` 1 probes may ground the
    /// soldier, `area` 0 probes only push. Returns whether a lethal
    /// polygon ended the pass.
    fn check_map_collision(
        soldier: &mut Soldier,
        map: &PolyMap,
        offset: Vec2<f32>,
        area: u8,
        emitter: &mut Emitter,
    ) -> bool {
        let ids = map.sector(soldier.particle.pos + offset);
        for &poly_id in ids {
            let poly = &map.polygons()[poly_id as usize];
            if !poly.kind.collides_with_soldiers() {
                continue;
            }
            // Earlier resolutions this pass may have moved the probe.
            let probe = soldier.particle.pos + offset;
            if !poly.contains(probe) {
                continue;
            }
            if poly.kind.is_lethal() {
                Self::lethal_touch(soldier, map, poly_id, poly.kind, emitter);
                return true;
            }
            let (perp, edge, dist) = poly.closest_perpendicular(probe);
            let unit = if dist > EPSILON { perp / dist } else { poly.perps[edge] };
            if poly.kind == PolyType::Bouncy {
                // Reflect about the surface normal with restitution. The
                // inbound check keeps a pair of coplanar triangles from
                // reflecting the same contact twice.
                let vn = soldier.particle.velocity.dot(unit);
                if vn < 0.0 {
                    soldier.particle.velocity -= unit * vn * (1.0 + poly.bounciness);
                }
                soldier.particle.pos += unit * dist.max(EPSILON);
            } else {
                soldier.particle.pos += unit * dist;
                soldier.particle.velocity += unit * dist;
            }
            if area == 1 && unit.y < -0.5 {
                soldier.on_ground = true;
            }
            emitter.emit(SimEvent::PolygonCollision {
                soldier: soldier.id,
                poly: poly_id,
                pos: probe,
            });
        }
        false
    }

    fn lethal_touch(
        soldier: &mut Soldier,
        map: &PolyMap,
        poly_id: u16,
        kind: PolyType,
        emitter: &mut Emitter,
    ) {
        emitter.emit(SimEvent::SpecialPolygon { soldier: soldier.id, poly: poly_id, kind });
        let spawn = map.find_first_spawn(SpawnKind::General).unwrap_or_default();
        soldier.particle.pos = spawn;
        soldier.particle.old_pos = spawn;
        soldier.particle.velocity = Vec2::zero();
        emitter.emit(SimEvent::Respawned { soldier: soldier.id, pos: spawn });
    }

    /// Circle probe around the body center. A generous radius arms the
    /// grounded-for-launchers flag, a tighter one snaps the body out of
    /// slopes it has sunk into.
    fn check_radius_collision(soldier: &mut Soldier, map: &PolyMap, emitter: &mut Emitter) {
        let ids = map.sector(soldier.particle.pos + Vec2::new(0.0, RADIUS_PROBE_CENTER_Y));
        for &poly_id in ids {
            let poly = &map.polygons()[poly_id as usize];
            if !poly.kind.collides_with_soldiers() || poly.kind.is_lethal() {
                continue;
            }
            for edge in 0..3 {
                let center =
                    soldier.particle.pos + Vec2::new(0.0, RADIUS_PROBE_CENTER_Y);
                let a = poly.vertices[edge];
                let b = poly.vertices[(edge + 1) % 3];
                let dist = geom::point_segment_distance(center, a, b);
                if dist < LAW_RADIUS {
                    soldier.on_ground_for_law = true;
                }
                if dist < SNAP_RADIUS {
                    soldier.particle.pos += poly.perps[edge] * (SNAP_RADIUS - dist);
                    emitter.emit(SimEvent::PolygonCollision {
                        soldier: soldier.id,
                        poly: poly_id,
                        pos: center,
                    });
                }
            }
        }
    }

    /// Pushes the body center away from polygon corners it has come too
    /// close to, so soldiers do not snag on sharp tips.
    fn check_vertex_collision(soldier: &mut Soldier, map: &PolyMap, emitter: &mut Emitter) {
        let ids = map.sector(soldier.particle.pos);
        for &poly_id in ids {
            let poly = &map.polygons()[poly_id as usize];
            if !poly.kind.collides_with_soldiers() || poly.kind.is_lethal() {
                continue;
            }
            for vertex in poly.vertices {
                let delta = soldier.particle.pos - vertex;
                let dist = delta.magnitude();
                if dist < VERTEX_RADIUS {
                    let unit = geom::normalized_or(delta, Vec2::new(0.0, -1.0));
                    soldier.particle.pos += unit * (VERTEX_RADIUS - dist);
                    emitter.emit(SimEvent::PolygonCollision {
                        soldier: soldier.id,
                        poly: poly_id,
                        pos: vertex,
                    });
                }
            }
        }
    }

    fn clamp_velocity(soldier: &mut Soldier, max: f32) {
        let vel = &mut soldier.particle.velocity;
        vel.x = vel.x.clamp(-max, max);
        vel.y = vel.y.clamp(-max, max);
    }
}
