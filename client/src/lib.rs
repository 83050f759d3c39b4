//! The predicting game client.
//!
//! The client runs the same engine as the server. Each tick it simulates
//! its own soldier immediately from local input, remembers the input as
//! pending, and sends it off. When an authoritative snapshot arrives it
//! overwrites the soldier, drops the inputs the server has consumed and
//! replays the rest, so the soldier ends up where the server will put it
//! once those inputs land. Remote soldiers are never simulated here; they
//! move only when snapshots say so.

#![deny(unsafe_code)]

pub mod error;
pub mod prediction;

// Reexports
pub use crate::error::Error;

use crate::prediction::{PendingInput, PendingInputs, SoldierSnapshot};
use common::{
    comp::{Control, Particle, Projectile, Soldier, SoldierId},
    consts::{PING_INTERVAL_TICKS, RECONCILE_EPSILON},
    event::Emitter,
    map::PolyMap,
    settings::SimSettings,
    state::StateManager,
};
use common_net::{ClientMsg, ClientPostbox, ServerMsg, SoldierInput, SoldierState};
use tracing::{debug, trace, warn};

/// What to do with events the engine emits while replaying pending inputs
/// during reconciliation.
///
/// A replayed jump already thudded when it was predicted; replaying it
/// again every snapshot would stutter effects, so replay is silent unless
/// a frontend asks otherwise.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ReplayEvents {
    #[default]
    Suppress,
    Emit,
}

/// Lifecycle of a session, advanced by server messages.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionStage {
    /// Join sent, nothing heard back yet.
    Connecting,
    /// The server has spoken but not assigned a soldier.
    Connected,
    /// A soldier is assigned; inputs flow.
    Active,
    /// The session is over: we left, or the transport died.
    Disconnected,
}

pub struct Client {
    postbox: ClientPostbox,
    stage: SessionStage,
    soldier_id: Option<SoldierId>,
    world: StateManager,
    pending: PendingInputs,
    replay_events: ReplayEvents,
    tick: u64,
    last_ping_tick: u64,
    awaiting_pong: bool,
    rtt_ticks: Option<u64>,
}

impl Client {
    /// Opens a session over `postbox` by sending the join request. The
    /// client needs the same map and settings as the server; both ends
    /// simulating different worlds cannot reconcile.
    pub fn connect(
        mut postbox: ClientPostbox,
        nickname: impl Into<String>,
        map: PolyMap,
        settings: SimSettings,
    ) -> Self {
        postbox.send_message(ClientMsg::Join { nickname: nickname.into() });
        Self {
            postbox,
            stage: SessionStage::Connecting,
            soldier_id: None,
            world: StateManager::new(map, settings),
            pending: PendingInputs::new(),
            replay_events: ReplayEvents::Suppress,
            tick: 0,
            last_ping_tick: 0,
            awaiting_pong: false,
            rtt_ticks: None,
        }
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn soldier_id(&self) -> Option<SoldierId> {
        self.soldier_id
    }

    /// The locally simulated world, for rendering.
    pub fn world(&self) -> &StateManager {
        &self.world
    }

    /// The client's own soldier, once assigned and announced.
    pub fn soldier(&self) -> Option<&Soldier> {
        self.soldier_id.and_then(|id| self.world.try_soldier(id))
    }

    pub fn pending_inputs(&self) -> &PendingInputs {
        &self.pending
    }

    /// Round trip time of the last completed ping probe, in client ticks.
    pub fn rtt_ticks(&self) -> Option<u64> {
        self.rtt_ticks
    }

    pub fn set_replay_events(&mut self, replay_events: ReplayEvents) {
        self.replay_events = replay_events;
    }

    /// Tells the server we are leaving and ends the session. The world is
    /// kept as it was for a last render; further ticks do nothing.
    pub fn disconnect(&mut self) {
        self.postbox.send_message(ClientMsg::Leave);
        self.stage = SessionStage::Disconnected;
    }

    /// Advances the session by one tick. The per-tick order:
    ///
    /// 1) apply everything the server sent, reconciling our soldier
    /// 2) predict our soldier one tick forward from `control`
    /// 3) record the input as pending and send it to the server
    /// 4) advance projectiles and items
    /// 5) ping housekeeping
    ///
    /// Events from prediction land in `emitter`; replay events obey
    /// [`ReplayEvents`].
    pub fn tick(&mut self, control: Control, emitter: &mut Emitter) -> Result<(), Error> {
        if let Some(err) = self.postbox.error() {
            self.stage = SessionStage::Disconnected;
            return Err(err.into());
        }
        if self.stage == SessionStage::Disconnected {
            return Ok(());
        }

        for msg in self.postbox.new_messages() {
            self.handle_server_msg(msg, emitter)?;
        }

        if let (SessionStage::Active, Some(id)) = (self.stage, self.soldier_id) {
            if let Some(soldier) = self.world.try_soldier_mut(id) {
                soldier.control = control;
                self.world.tick_soldier(id, emitter);

                let pos = self.world.soldier(id).particle.pos;
                let sequence = self.pending.push(self.tick, pos, control);
                self.postbox.send_message(ClientMsg::Input(SoldierInput {
                    sequence,
                    tick: self.tick,
                    pos,
                    control,
                }));
            }
        }

        self.world.tick_world(emitter);

        if !self.awaiting_pong && self.tick - self.last_ping_tick >= PING_INTERVAL_TICKS {
            self.postbox.send_message(ClientMsg::Ping);
            self.awaiting_pong = true;
            self.last_ping_tick = self.tick;
        }

        self.tick += 1;
        Ok(())
    }

    fn handle_server_msg(&mut self, msg: ServerMsg, emitter: &mut Emitter) -> Result<(), Error> {
        if self.stage == SessionStage::Connecting {
            self.stage = SessionStage::Connected;
        }
        match msg {
            ServerMsg::AssignId(id) => {
                debug!(id = id.0, "soldier slot assigned");
                self.stage = SessionStage::Active;
                self.soldier_id = Some(id);
            },
            ServerMsg::SoldierInfo { id, nickname, pos } => {
                let mut soldier =
                    Soldier::new(id, nickname, pos, self.world.settings().gravity);
                soldier.jets_count = self.world.map().jet_cap;
                self.world.insert_soldier(soldier);
            },
            ServerMsg::SoldierState(state) => self.apply_soldier_state(state, emitter),
            ServerMsg::ProjectileSpawn { owner, kind, pos, vel } => {
                // All projectiles, own shots included, spawn only on the
                // server's say-so; prediction never spawns them locally.
                let mut particle = Particle::new(pos, self.world.settings().gravity);
                particle.velocity = vel;
                self.world.add_projectile(Projectile::new(owner, kind, particle));
            },
            ServerMsg::PlayerLeave(id) => {
                if self.world.remove_soldier(id).is_none() {
                    warn!(id = id.0, "leave notice for a soldier we never knew");
                }
            },
            ServerMsg::KillCommand(id) => match self.world.try_soldier_mut(id) {
                Some(soldier) => soldier.dead_meat = true,
                None => warn!(id = id.0, "kill notice for a soldier we never knew"),
            },
            ServerMsg::Ping => self.postbox.send_message(ClientMsg::Pong),
            ServerMsg::Pong => {
                self.awaiting_pong = false;
                self.rtt_ticks = Some(self.tick - self.last_ping_tick);
            },
            ServerMsg::Error(err) => return Err(Error::ServerRejected(err)),
        }
        Ok(())
    }

    /// Applies one authoritative snapshot. Remote soldiers take it as-is;
    /// our own gets it as the new base under a replay of whatever inputs
    /// the server had not seen when it took the snapshot.
    fn apply_soldier_state(&mut self, state: SoldierState, emitter: &mut Emitter) {
        let own = Some(state.id) == self.soldier_id;
        let id = state.id;

        let soldier = match self.world.try_soldier_mut(id) {
            Some(soldier) => soldier,
            None => {
                warn!(id = id.0, "snapshot for a soldier we never knew");
                return;
            },
        };
        if !own {
            state.apply_to(soldier);
            return;
        }

        // Diff what we predicted for the input the server just finished
        // with against what it actually computed. A mismatch means the two
        // engines applied a different rule to the same input.
        let before = SoldierSnapshot::of(soldier);
        let acked_prediction = self
            .pending
            .iter()
            .find(|input| input.sequence == state.last_processed_input_id)
            .map(|input| input.predicted_pos);
        state.apply_to(soldier);
        if let Some(predicted) = acked_prediction {
            let drift = predicted.distance(soldier.particle.pos);
            if drift > RECONCILE_EPSILON {
                warn!(drift, ?before, "authoritative state diverged from our prediction");
            }
        }

        let pruned = self.pending.acknowledge(state.last_processed_input_id);
        trace!(
            pruned,
            outstanding = self.pending.len(),
            ack = state.last_processed_input_id,
            "reconciling"
        );

        let replay: Vec<PendingInput> = self.pending.iter().copied().collect();
        let mut muted = Emitter::muted();
        let mut last_prediction = None;
        for input in replay {
            self.world.soldier_mut(id).control = input.control;
            match self.replay_events {
                ReplayEvents::Suppress => self.world.tick_soldier(id, &mut muted),
                ReplayEvents::Emit => self.world.tick_soldier(id, emitter),
            }
            last_prediction = Some(input.predicted_pos);
        }

        if let Some(predicted) = last_prediction {
            let replayed = self.world.soldier(id).particle.pos;
            let error = replayed.distance(predicted);
            if error > RECONCILE_EPSILON {
                debug!(error, "prediction diverged, replay corrected it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::event::SimEvent;
    use common_net::{pair, ServerError, ServerPostbox};
    use vek::*;

    fn client_and_server_end() -> (Client, ServerPostbox) {
        let (client_box, server_box) = pair();
        let client = Client::connect(
            client_box,
            "newbie",
            PolyMap::flat_arena(),
            SimSettings::default(),
        );
        (client, server_box)
    }

    #[test]
    fn connect_sends_join_and_waits() {
        let (client, mut server_box) = client_and_server_end();
        assert_eq!(client.stage(), SessionStage::Connecting);
        let msgs: Vec<ClientMsg> = server_box.new_messages().collect();
        assert!(matches!(
            msgs.as_slice(),
            [ClientMsg::Join { nickname }] if nickname == "newbie"
        ));
    }

    #[test]
    fn assignment_activates_the_session() {
        let (mut client, mut server_box) = client_and_server_end();
        server_box.send_message(ServerMsg::AssignId(SoldierId(1)));
        server_box.send_message(ServerMsg::SoldierInfo {
            id: SoldierId(1),
            nickname: "newbie".to_owned(),
            pos: Vec2::new(0.0, 40.0),
        });

        let mut emitter = Emitter::new();
        client.tick(Control::default(), &mut emitter).unwrap();
        assert_eq!(client.stage(), SessionStage::Active);
        assert_eq!(client.soldier_id(), Some(SoldierId(1)));
        assert!(client.soldier().is_some());

        // The first predicted input went out with sequence 1.
        let input = server_box.new_messages().find_map(|msg| match msg {
            ClientMsg::Input(input) => Some(input),
            _ => None,
        });
        assert_eq!(input.map(|i| i.sequence), Some(1));
        assert_eq!(client.pending_inputs().len(), 1);
    }

    #[test]
    fn rejection_surfaces_as_an_error() {
        let (mut client, mut server_box) = client_and_server_end();
        server_box.send_message(ServerMsg::Error(ServerError::ServerFull));
        let mut emitter = Emitter::new();
        assert!(matches!(
            client.tick(Control::default(), &mut emitter),
            Err(Error::ServerRejected(ServerError::ServerFull))
        ));
    }

    #[test]
    fn remote_soldiers_move_only_by_snapshot() {
        let (mut client, mut server_box) = client_and_server_end();
        server_box.send_message(ServerMsg::AssignId(SoldierId(1)));
        server_box.send_message(ServerMsg::SoldierInfo {
            id: SoldierId(1),
            nickname: "newbie".to_owned(),
            pos: Vec2::new(0.0, 40.0),
        });
        server_box.send_message(ServerMsg::SoldierInfo {
            id: SoldierId(2),
            nickname: "other".to_owned(),
            pos: Vec2::new(50.0, -200.0),
        });

        let mut emitter = Emitter::new();
        for _ in 0..30 {
            client.tick(Control::default(), &mut emitter).unwrap();
        }
        // Mid-air and motionless: no local gravity for mirrors.
        let remote = client.world().soldier(SoldierId(2));
        assert_eq!(remote.particle.pos, Vec2::new(50.0, -200.0));

        let mut moved = Soldier::new(SoldierId(2), "other", Vec2::new(60.0, -190.0), 0.06);
        moved.particle.velocity = Vec2::new(1.0, 0.5);
        server_box.send_message(ServerMsg::SoldierState(SoldierState::of(&moved, 0)));
        client.tick(Control::default(), &mut emitter).unwrap();
        let remote = client.world().soldier(SoldierId(2));
        assert_eq!(remote.particle.pos, Vec2::new(60.0, -190.0));
        assert_eq!(remote.particle.velocity, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn unknown_ids_are_dropped_not_fatal() {
        let (mut client, mut server_box) = client_and_server_end();
        let ghost = Soldier::new(SoldierId(9), "ghost", Vec2::zero(), 0.06);
        server_box.send_message(ServerMsg::SoldierState(SoldierState::of(&ghost, 0)));
        server_box.send_message(ServerMsg::KillCommand(SoldierId(9)));
        server_box.send_message(ServerMsg::PlayerLeave(SoldierId(9)));

        let mut emitter = Emitter::new();
        client.tick(Control::default(), &mut emitter).unwrap();
        assert_eq!(client.stage(), SessionStage::Connected);
        assert!(client.world().try_soldier(SoldierId(9)).is_none());
    }

    fn replay_collisions_with(policy: ReplayEvents) -> usize {
        let (mut client, mut server_box) = client_and_server_end();
        client.set_replay_events(policy);
        server_box.send_message(ServerMsg::AssignId(SoldierId(1)));
        server_box.send_message(ServerMsg::SoldierInfo {
            id: SoldierId(1),
            nickname: "newbie".to_owned(),
            pos: Vec2::new(0.0, 40.0),
        });

        // Fall to the floor and settle. These live events are not under
        // test, so they go into a scratch emitter.
        let mut scratch = Emitter::new();
        for _ in 0..40 {
            client.tick(Control::default(), &mut scratch).unwrap();
        }

        // A snapshot acknowledging only the first input: the other 39
        // replay on top of it, re-running the whole fall and landing.
        let mut reference = StateManager::new(PolyMap::flat_arena(), SimSettings::default());
        let mut soldier = Soldier::new(
            SoldierId(1),
            "newbie",
            Vec2::new(0.0, 40.0),
            reference.settings().gravity,
        );
        soldier.jets_count = reference.map().jet_cap;
        reference.insert_soldier(soldier);
        let mut sink = Emitter::muted();
        reference.tick_soldier(SoldierId(1), &mut sink);
        server_box.send_message(ServerMsg::SoldierState(SoldierState::of(
            reference.soldier(SoldierId(1)),
            1,
        )));

        let mut emitter = Emitter::new();
        client.tick(Control::default(), &mut emitter).unwrap();
        emitter
            .events()
            .iter()
            .filter(|event| matches!(event, SimEvent::PolygonCollision { .. }))
            .count()
    }

    #[test]
    fn replay_is_silent_unless_asked_to_emit() {
        let suppressed = replay_collisions_with(ReplayEvents::Suppress);
        let emitted = replay_collisions_with(ReplayEvents::Emit);
        // The live tick after reconciliation grinds against the floor
        // either way; only the replayed contacts are policy-gated.
        assert!(suppressed > 0);
        assert!(emitted > suppressed);
    }

    #[test]
    fn disconnect_sends_leave_and_goes_inert() {
        let (mut client, mut server_box) = client_and_server_end();
        client.disconnect();
        assert_eq!(client.stage(), SessionStage::Disconnected);
        assert!(server_box
            .new_messages()
            .any(|msg| matches!(msg, ClientMsg::Leave)));

        let mut emitter = Emitter::new();
        client.tick(Control::default(), &mut emitter).unwrap();
        assert!(client.pending_inputs().is_empty());
        assert_eq!(server_box.new_messages().len(), 0);
    }

    #[test]
    fn transport_failure_ends_the_session() {
        let (mut client, server_box) = client_and_server_end();
        drop(server_box);

        // The hangup is noticed while polling, surfaces next tick.
        let mut emitter = Emitter::new();
        client.tick(Control::default(), &mut emitter).unwrap();
        assert!(client.tick(Control::default(), &mut emitter).is_err());
        assert_eq!(client.stage(), SessionStage::Disconnected);
    }

    #[test]
    fn ping_goes_out_and_rtt_comes_back_in_ticks() {
        let (mut client, mut server_box) = client_and_server_end();
        let mut emitter = Emitter::new();
        for _ in 0..=PING_INTERVAL_TICKS {
            client.tick(Control::default(), &mut emitter).unwrap();
        }
        assert!(server_box
            .new_messages()
            .any(|msg| matches!(msg, ClientMsg::Ping)));

        server_box.send_message(ServerMsg::Pong);
        for _ in 0..3 {
            client.tick(Control::default(), &mut emitter).unwrap();
        }
        assert_eq!(client.rtt_ticks(), Some(1));
    }
}
