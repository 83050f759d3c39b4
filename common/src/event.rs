//! Side effects of a simulation tick, collected instead of performed.
//!
//! The engine never spawns projectiles, plays sounds or touches anything
//! outside the soldier it is stepping. It records what happened into an
//! [`Emitter`] handed in by the caller, who decides what the events mean:
//! the server turns them into world changes and broadcasts, a client turns
//! them into effects, and replayed prediction ticks usually route them into
//! a muted emitter so the same jump does not thud twice.

use crate::{
    comp::{ProjectileKind, SoldierId, WeaponKind},
    map::PolyType,
};
use vek::*;

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// A probe resolved against a polygon.
    PolygonCollision { soldier: SoldierId, poly: u16, pos: Vec2<f32> },
    /// A lethal polygon was touched and the soldier was moved to a spawn.
    SpecialPolygon { soldier: SoldierId, poly: u16, kind: PolyType },
    Respawned { soldier: SoldierId, pos: Vec2<f32> },
    Jumped { soldier: SoldierId, sideways: bool },
    Rolled { soldier: SoldierId, backwards: bool },
    ProjectileSpawned {
        owner: SoldierId,
        kind: ProjectileKind,
        pos: Vec2<f32>,
        vel: Vec2<f32>,
    },
    ProjectileHit {
        owner: SoldierId,
        kind: ProjectileKind,
        target: Option<SoldierId>,
        pos: Vec2<f32>,
    },
    WeaponSwapped { soldier: SoldierId, to: WeaponKind },
    WeaponDropped { soldier: SoldierId, kind: WeaponKind },
    WeaponReloaded { soldier: SoldierId },
    MeleeStrike { soldier: SoldierId, pos: Vec2<f32> },
    FlagThrown { soldier: SoldierId, pos: Vec2<f32>, vel: Vec2<f32> },
}

/// Collects [`SimEvent`]s for one tick. A muted emitter swallows everything,
/// which is what reconciliation replays use by default.
#[derive(Debug, Default)]
pub struct Emitter {
    events: Vec<SimEvent>,
    muted: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn muted() -> Self {
        Self { events: Vec::new(), muted: true }
    }

    pub fn emit(&mut self, event: SimEvent) {
        if !self.muted {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muted_emitter_swallows_events() {
        let mut emitter = Emitter::muted();
        emitter.emit(SimEvent::Jumped { soldier: SoldierId(1), sideways: false });
        assert!(emitter.is_empty());
    }

    #[test]
    fn drain_empties_in_order() {
        let mut emitter = Emitter::new();
        emitter.emit(SimEvent::Jumped { soldier: SoldierId(1), sideways: false });
        emitter.emit(SimEvent::Jumped { soldier: SoldierId(2), sideways: true });
        let drained: Vec<_> = emitter.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(matches!(
            drained[0],
            SimEvent::Jumped { soldier: SoldierId(1), .. }
        ));
        assert!(emitter.is_empty());
    }
}
