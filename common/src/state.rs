//! Game state shared by client and server: the soldier arena, loose
//! projectiles and items, the map and the tick counter.
//!
//! Soldiers live in a fixed-capacity slot arena indexed by `id - 1`, so a
//! [`SoldierId`] is a stable handle both peers agree on. Everything here
//! mutates entities only through the engine or through the explicit
//! accessors; nothing holds pointers across ticks.

use crate::{
    comp::{Item, Projectile, Soldier, SoldierId},
    consts::{EPSILON, MAX_SOLDIERS, RADIUS_PROBE_CENTER_Y, SOLDIER_HIT_RADIUS},
    event::{Emitter, SimEvent},
    geom,
    map::PolyMap,
    settings::SimSettings,
    sim::SoldierPhysics,
};
use tracing::{error, warn};
use vek::*;

pub struct StateManager {
    map: PolyMap,
    settings: SimSettings,
    soldiers: Vec<Option<Soldier>>,
    projectiles: Vec<Projectile>,
    items: Vec<Item>,
    tick: u64,
}

impl StateManager {
    pub fn new(map: PolyMap, settings: SimSettings) -> Self {
        Self {
            map,
            settings,
            soldiers: vec![None; MAX_SOLDIERS],
            projectiles: Vec::new(),
            items: Vec::new(),
            tick: 0,
        }
    }

    pub fn map(&self) -> &PolyMap {
        &self.map
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Completed world ticks since this state was created.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn slot(id: SoldierId) -> Option<usize> {
        let idx = id.0 as usize;
        (1..=MAX_SOLDIERS).contains(&idx).then(|| idx - 1)
    }

    /// Claims the lowest free slot for a new soldier. The soldier starts at
    /// the origin and inactive until [`Self::spawn_soldier`] places it.
    /// `None` means the arena is full.
    pub fn create_soldier(&mut self, nickname: impl Into<String>) -> Option<SoldierId> {
        let idx = self.soldiers.iter().position(Option::is_none)?;
        let id = SoldierId(idx as u8 + 1);
        let mut soldier = Soldier::new(id, nickname, Vec2::zero(), self.settings.gravity);
        soldier.active = false;
        self.soldiers[idx] = Some(soldier);
        Some(id)
    }

    /// Installs a soldier at the slot its id names, replacing any previous
    /// occupant. Clients use this to mirror soldiers the server announced,
    /// whose ids were assigned remotely. An out-of-range id comes from the
    /// network and is dropped with a warning.
    pub fn insert_soldier(&mut self, soldier: Soldier) {
        match Self::slot(soldier.id) {
            Some(idx) => self.soldiers[idx] = Some(soldier),
            None => warn!(id = soldier.id.0, "dropping soldier with out-of-range id"),
        }
    }

    /// Puts a created soldier into play at `pos` with full health and the
    /// map's fuel budget.
    pub fn spawn_soldier(&mut self, id: SoldierId, pos: Vec2<f32>) {
        let jet_cap = self.map.jet_cap;
        let gravity = self.settings.gravity;
        let soldier = self.soldier_mut(id);
        soldier.respawn(pos, jet_cap, gravity);
        soldier.active = true;
    }

    pub fn remove_soldier(&mut self, id: SoldierId) -> Option<Soldier> {
        Self::slot(id).and_then(|idx| self.soldiers[idx].take())
    }

    /// Panics when `id` is unoccupied. Server logic only derives ids from
    /// slots it created, so a miss here is a bug, not bad remote data; use
    /// [`Self::try_soldier`] for ids that arrived over the wire.
    pub fn soldier(&self, id: SoldierId) -> &Soldier {
        match Self::slot(id).and_then(|idx| self.soldiers[idx].as_ref()) {
            Some(soldier) => soldier,
            None => {
                error!(id = id.0, "lookup of unoccupied soldier slot");
                panic!("no soldier with id {}", id.0);
            },
        }
    }

    pub fn soldier_mut(&mut self, id: SoldierId) -> &mut Soldier {
        match Self::slot(id).and_then(|idx| self.soldiers[idx].as_mut()) {
            Some(soldier) => soldier,
            None => {
                error!(id = id.0, "lookup of unoccupied soldier slot");
                panic!("no soldier with id {}", id.0);
            },
        }
    }

    pub fn try_soldier(&self, id: SoldierId) -> Option<&Soldier> {
        Self::slot(id).and_then(|idx| self.soldiers[idx].as_ref())
    }

    pub fn try_soldier_mut(&mut self, id: SoldierId) -> Option<&mut Soldier> {
        Self::slot(id).and_then(|idx| self.soldiers[idx].as_mut())
    }

    pub fn soldiers(&self) -> impl Iterator<Item = &Soldier> {
        self.soldiers.iter().flatten()
    }

    /// Advances one soldier by one engine tick. Which soldiers get ticked,
    /// and how often, is the caller's business: the server runs one tick
    /// per accepted input, a client ticks only its own avatar.
    pub fn tick_soldier(&mut self, id: SoldierId, emitter: &mut Emitter) {
        let soldier = match Self::slot(id).and_then(|idx| self.soldiers[idx].as_mut()) {
            Some(soldier) => soldier,
            None => {
                error!(id = id.0, "tick of unoccupied soldier slot");
                panic!("no soldier with id {}", id.0);
            },
        };
        SoldierPhysics::update(soldier, &self.map, &self.settings, emitter);
    }

    /// Advances everything that is not a soldier: projectiles, items and
    /// the tick counter. Soldiers are deliberately excluded so that remote
    /// mirrors a client holds are moved only by authoritative snapshots.
    pub fn tick_world(&mut self, emitter: &mut Emitter) {
        self.tick += 1;
        self.tick_projectiles(emitter);
        self.tick_items();
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    fn tick_projectiles(&mut self, emitter: &mut Emitter) {
        let mut i = 0;
        while i < self.projectiles.len() {
            let mut projectile = self.projectiles[i];
            projectile.particle.euler_step(self.settings.gravity);
            projectile.timeout = projectile.timeout.saturating_sub(1);

            let sweep = (projectile.particle.old_pos, projectile.particle.pos);
            let target = Self::swept_soldier_hit(&self.soldiers, &projectile, sweep);
            let hit_world = target.is_none() && Self::sweep_hits_map(&self.map, sweep);

            if target.is_some() || hit_world {
                emitter.emit(SimEvent::ProjectileHit {
                    owner: projectile.owner,
                    kind: projectile.kind,
                    target,
                    pos: projectile.particle.pos,
                });
                self.projectiles.swap_remove(i);
            } else if projectile.timeout == 0 {
                self.projectiles.swap_remove(i);
            } else {
                self.projectiles[i] = projectile;
                i += 1;
            }
        }
    }

    /// First soldier whose body circle the path `sweep` passes through.
    /// The owner is immune to their own shot for its whole flight.
    fn swept_soldier_hit(
        soldiers: &[Option<Soldier>],
        projectile: &Projectile,
        sweep: (Vec2<f32>, Vec2<f32>),
    ) -> Option<SoldierId> {
        soldiers
            .iter()
            .flatten()
            .filter(|s| s.active && !s.dead_meat && s.id != projectile.owner)
            .find(|s| {
                let center = s.particle.pos + Vec2::new(0.0, RADIUS_PROBE_CENTER_Y);
                geom::point_segment_distance(center, sweep.0, sweep.1) < SOLDIER_HIT_RADIUS
            })
            .map(|s| s.id)
    }

    fn sweep_hits_map(map: &PolyMap, sweep: (Vec2<f32>, Vec2<f32>)) -> bool {
        // Check the sectors under both endpoints; a projectile fast enough
        // to skip a whole sector in one tick also skips this check, which
        // the velocity clamp rules out for everything the engine spawns.
        let mut hit = false;
        for probe in [sweep.0, sweep.1] {
            for &poly_id in map.sector(probe) {
                let poly = &map.polygons()[poly_id as usize];
                if poly.kind.collides_with_bullets() && poly.intersects_segment(sweep.0, sweep.1) {
                    hit = true;
                }
            }
        }
        hit
    }

    fn tick_items(&mut self) {
        for item in &mut self.items {
            if item.rested {
                continue;
            }
            item.particle.euler_step(self.settings.gravity);
            for &poly_id in self.map.sector(item.particle.pos) {
                let poly = &self.map.polygons()[poly_id as usize];
                if !poly.kind.collides_with_soldiers() || !poly.contains(item.particle.pos) {
                    continue;
                }
                let (perp, edge, dist) = poly.closest_perpendicular(item.particle.pos);
                let unit = if dist > EPSILON { perp / dist } else { poly.perps[edge] };
                item.particle.pos += unit * dist;
                if unit.y < -0.5 {
                    // Landed on a floor-ish surface.
                    item.particle.velocity = Vec2::zero();
                    item.rested = true;
                } else {
                    item.particle.velocity += unit * dist;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comp::{Item, ItemKind, Particle, Projectile, ProjectileKind};

    fn state() -> StateManager {
        StateManager::new(PolyMap::flat_arena(), SimSettings::default())
    }

    #[test]
    fn ids_are_one_based_and_slots_are_reused() {
        let mut state = state();
        let a = state.create_soldier("a").unwrap();
        let b = state.create_soldier("b").unwrap();
        assert_eq!(a, SoldierId(1));
        assert_eq!(b, SoldierId(2));

        assert!(state.remove_soldier(a).is_some());
        assert!(state.try_soldier(a).is_none());
        // The freed low slot is claimed before a fresh one.
        assert_eq!(state.create_soldier("c"), Some(SoldierId(1)));
        assert_eq!(state.soldier(SoldierId(1)).nickname, "c");
    }

    #[test]
    fn arena_rejects_soldiers_past_capacity() {
        let mut state = state();
        for i in 0..MAX_SOLDIERS {
            assert!(state.create_soldier(format!("s{}", i)).is_some());
        }
        assert_eq!(state.create_soldier("overflow"), None);
    }

    #[test]
    #[should_panic(expected = "no soldier with id 9")]
    fn missing_soldier_lookup_panics() {
        let state = state();
        state.soldier(SoldierId(9));
    }

    #[test]
    fn try_soldier_absorbs_bad_remote_ids() {
        let state = state();
        assert!(state.try_soldier(SoldierId(0)).is_none());
        assert!(state.try_soldier(SoldierId(200)).is_none());
    }

    #[test]
    fn tick_world_leaves_soldiers_alone() {
        let mut state = state();
        let id = state.create_soldier("idle").unwrap();
        state.spawn_soldier(id, Vec2::new(0.0, -100.0));
        let pos = state.soldier(id).particle.pos;

        let mut emitter = Emitter::new();
        for _ in 0..10 {
            state.tick_world(&mut emitter);
        }
        assert_eq!(state.tick(), 10);
        // Mid-air and untouched: only tick_soldier moves soldiers.
        assert_eq!(state.soldier(id).particle.pos, pos);
    }

    #[test]
    fn projectile_expires_against_a_polygon() {
        let mut state = state();
        // Fired straight down at the floor slab from just above it.
        let mut particle = Particle::new(Vec2::new(0.0, 40.0), state.settings().gravity);
        particle.velocity = Vec2::new(0.0, 6.0);
        state.add_projectile(Projectile::new(SoldierId(7), ProjectileKind::Bullet, particle));

        let mut emitter = Emitter::new();
        for _ in 0..5 {
            state.tick_world(&mut emitter);
        }
        assert!(state.projectiles().is_empty());
        assert!(emitter.events().iter().any(|e| matches!(
            e,
            SimEvent::ProjectileHit { owner: SoldierId(7), target: None, .. }
        )));
    }

    #[test]
    fn projectile_reports_soldier_hits_without_touching_health() {
        let mut state = state();
        let victim = state.create_soldier("victim").unwrap();
        state.spawn_soldier(victim, Vec2::new(60.0, 40.0));

        let mut particle = Particle::new(Vec2::new(0.0, 36.0), state.settings().gravity);
        particle.velocity = Vec2::new(8.0, 0.0);
        state.add_projectile(Projectile::new(SoldierId(9), ProjectileKind::Bullet, particle));

        let mut emitter = Emitter::new();
        for _ in 0..12 {
            state.tick_world(&mut emitter);
        }
        let hit = emitter.events().iter().find_map(|e| match e {
            SimEvent::ProjectileHit { target: Some(t), .. } => Some(*t),
            _ => None,
        });
        assert_eq!(hit, Some(victim));
        assert!(state.projectiles().is_empty());
        // Damage is the server's decision, not the simulation's.
        assert_eq!(state.soldier(victim).health, Soldier::MAX_HEALTH);
    }

    #[test]
    fn own_shots_never_hit_their_shooter() {
        let mut state = state();
        let shooter = state.create_soldier("shooter").unwrap();
        state.spawn_soldier(shooter, Vec2::new(0.0, 40.0));

        // Spawned inside the shooter's own hit circle, flying out of it.
        let mut particle = Particle::new(Vec2::new(0.0, 36.0), state.settings().gravity);
        particle.velocity = Vec2::new(8.0, -1.0);
        state.add_projectile(Projectile::new(shooter, ProjectileKind::Bullet, particle));

        let mut emitter = Emitter::new();
        for _ in 0..3 {
            state.tick_world(&mut emitter);
        }
        assert!(!emitter
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::ProjectileHit { target: Some(_), .. })));
    }

    #[test]
    fn projectile_times_out_in_open_air() {
        let mut state = state();
        // Fired upward into the open sky.
        let mut particle = Particle::new(Vec2::new(0.0, -100.0), state.settings().gravity);
        particle.velocity = Vec2::new(0.0, -3.0);
        let projectile = Projectile::new(SoldierId(2), ProjectileKind::Bullet, particle);
        let timeout = projectile.timeout;
        state.add_projectile(projectile);

        let mut emitter = Emitter::new();
        for _ in 0..timeout {
            state.tick_world(&mut emitter);
        }
        assert!(state.projectiles().is_empty());
        assert!(emitter.is_empty(), "timing out is not a hit");
    }

    #[test]
    fn dropped_item_falls_and_rests_on_the_floor() {
        let mut state = state();
        let particle = Particle::new(Vec2::new(50.0, 0.0), state.settings().gravity);
        state.add_item(Item::new(ItemKind::Flag, particle));

        let mut emitter = Emitter::new();
        for _ in 0..600 {
            state.tick_world(&mut emitter);
            if state.items()[0].rested {
                break;
            }
        }
        let item = &state.items()[0];
        assert!(item.rested);
        assert_eq!(item.particle.velocity, Vec2::zero());
        // Resting on the floor slab, not inside it.
        assert!((item.particle.pos.y - 50.0).abs() < 1.0);
    }
}
