//! The authoritative game server.
//!
//! The server owns the one true world. Clients describe what they want
//! through sequenced inputs; the server simulates each input with the same
//! engine the clients predict with, then tells everyone what actually
//! happened. Nothing a client sends is trusted beyond its control bits.

#![deny(unsafe_code)]

pub mod client;
pub mod error;

// Reexports
pub use crate::{client::Client, error::Error};

use crate::client::CLIENT_TIMEOUT_TICKS;
use common::{
    comp::{Item, ItemKind, Particle, Projectile, Soldier, SoldierId, WeaponKind},
    consts::{RADIUS_PROBE_CENTER_Y, RECONCILE_EPSILON, SOLDIER_HIT_RADIUS},
    event::{Emitter, SimEvent},
    map::{PolyMap, SpawnKind},
    settings::SimSettings,
    state::StateManager,
};
use common_net::{
    validate_nickname, ClientMsg, ServerError, ServerMsg, ServerPostbox, SoldierInput,
    SoldierState,
};
use hashbrown::{HashMap, HashSet};
use rand::{seq::SliceRandom, thread_rng};
use tracing::{debug, info, trace, warn};
use vek::*;

// Ticks a dead soldier waits before being put back into play.
const RESPAWN_DELAY_TICKS: u64 = 180;

/// Things that happened during a tick that the frontend may care about.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    ClientConnected { id: SoldierId, nickname: String },
    ClientDisconnected { id: SoldierId },
}

pub struct Server {
    state: StateManager,
    clients: Vec<Client>,
    emitter: Emitter,
    /// Dead soldiers and the world tick they come back at.
    respawns: HashMap<SoldierId, u64>,
}

impl Server {
    pub fn new(map: PolyMap, settings: SimSettings) -> Self {
        info!(map = %map.name, "starting server");
        Self {
            state: StateManager::new(map, settings),
            clients: Vec::new(),
            emitter: Emitter::new(),
            respawns: HashMap::new(),
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateManager {
        &mut self.state
    }

    /// Registered connections, which is also the player count.
    pub fn player_count(&self) -> usize {
        self.clients.iter().filter(|c| c.registered()).count()
    }

    /// Adopts a fresh connection. Nothing happens until it sends `Join`.
    pub fn add_client(&mut self, postbox: ServerPostbox) {
        let tick = self.state.tick();
        self.clients.push(Client::new(postbox, tick));
    }

    /// Puts a server-driven soldier into play. No connection owns it, so
    /// the server steps it once per tick with whatever control it holds.
    pub fn create_npc(&mut self, nickname: impl Into<String>) -> Option<SoldierId> {
        let id = self.state.create_soldier(nickname)?;
        let pos = self.pick_spawn();
        self.state.spawn_soldier(id, pos);
        let nickname = self.state.soldier(id).nickname.clone();
        self.broadcast(ServerMsg::SoldierInfo { id, nickname, pos });
        Some(id)
    }

    /// Kills a soldier on the spot, as a console `kill` would.
    pub fn kill(&mut self, id: SoldierId) -> Result<(), Error> {
        if self.state.try_soldier(id).is_none() {
            return Err(Error::UnknownSoldier(id));
        }
        self.damage_soldier(id, Soldier::MAX_HEALTH);
        Ok(())
    }

    /// Executes a single server tick. The order of business:
    ///
    /// 1) Drain every connection's messages and apply them: joins register
    ///    soldiers, inputs step their soldier once each in arrival order
    /// 2) Step soldiers no connection owns, so they fall and bleed like
    ///    everyone else
    /// 3) Advance the non-soldier world: projectiles, items, tick counter
    /// 4) Turn simulation events into world changes and broadcasts
    /// 5) Put dead soldiers whose wait is over back into play
    /// 6) Send every client a snapshot of every active soldier
    /// 7) Drop connections that hung up, left or timed out
    ///
    /// Returns the events the frontend may want to report.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();

        // 1)
        for i in 0..self.clients.len() {
            let msgs: Vec<ClientMsg> = self.clients[i].postbox.new_messages().collect();
            if !msgs.is_empty() {
                self.clients[i].last_msg_tick = self.state.tick();
            }
            for msg in msgs {
                self.handle_client_msg(i, msg, &mut events);
            }
        }

        // 2)
        let owned: HashSet<SoldierId> =
            self.clients.iter().filter_map(|c| c.soldier_id).collect();
        let free: Vec<SoldierId> = self
            .state
            .soldiers()
            .filter(|s| s.active && !owned.contains(&s.id))
            .map(|s| s.id)
            .collect();
        for id in free {
            self.state.tick_soldier(id, &mut self.emitter);
        }

        // 3)
        self.state.tick_world(&mut self.emitter);

        // 4)
        self.apply_sim_events();

        // 5)
        self.respawn_due_soldiers();

        // 6)
        self.broadcast_snapshots();

        // 7)
        self.evict_dead_connections(&mut events);

        events
    }

    fn handle_client_msg(&mut self, i: usize, msg: ClientMsg, events: &mut Vec<Event>) {
        match msg {
            ClientMsg::Join { nickname } => self.register_client(i, nickname, events),
            ClientMsg::Input(input) => self.apply_input(i, input),
            ClientMsg::Leave => self.clients[i].wants_leave = true,
            ClientMsg::Ping => self.clients[i].postbox.send_message(ServerMsg::Pong),
            ClientMsg::Pong => (),
        }
    }

    fn register_client(&mut self, i: usize, nickname: String, events: &mut Vec<Event>) {
        if self.clients[i].registered() {
            warn!(%nickname, "join from an already registered connection");
            return;
        }
        if !validate_nickname(&nickname) {
            debug!(%nickname, "rejecting join with a bad nickname");
            self.clients[i]
                .postbox
                .send_message(ServerMsg::Error(ServerError::InvalidNickname));
            return;
        }
        let full = self.player_count() >= self.state.settings().max_players;
        let id = match (!full).then(|| self.state.create_soldier(nickname.clone())).flatten() {
            Some(id) => id,
            None => {
                debug!(%nickname, "turning a client away, server is full");
                self.clients[i]
                    .postbox
                    .send_message(ServerMsg::Error(ServerError::ServerFull));
                return;
            },
        };
        let pos = self.pick_spawn();
        self.state.spawn_soldier(id, pos);

        let roster: Vec<ServerMsg> = self
            .state
            .soldiers()
            .filter(|s| s.active && s.id != id)
            .map(|s| ServerMsg::SoldierInfo {
                id: s.id,
                nickname: s.nickname.clone(),
                pos: s.particle.pos,
            })
            .collect();

        let client = &mut self.clients[i];
        client.soldier_id = Some(id);
        client.nickname = Some(nickname.clone());
        client.postbox.send_message(ServerMsg::AssignId(id));
        for msg in roster {
            client.postbox.send_message(msg);
        }
        // Everyone, the newcomer included, learns of the new soldier.
        self.broadcast(ServerMsg::SoldierInfo { id, nickname: nickname.clone(), pos });
        info!(id = id.0, %nickname, "client joined");
        events.push(Event::ClientConnected { id, nickname });
    }

    /// Applies one sequenced input: sets the soldier's control and steps it
    /// one engine tick. Replaying the exact per-input stepping is what lets
    /// the client reconcile bit for bit.
    fn apply_input(&mut self, i: usize, input: SoldierInput) {
        let client = &mut self.clients[i];
        let id = match client.soldier_id {
            Some(id) => id,
            None => {
                warn!("dropping input from an unregistered connection");
                return;
            },
        };
        // A stale or repeated sequence would double-step the soldier.
        if input.sequence <= client.last_processed_input {
            trace!(
                sequence = input.sequence,
                newest = client.last_processed_input,
                "dropping stale input"
            );
            return;
        }
        client.last_processed_input = input.sequence;

        self.state.soldier_mut(id).control = input.control;
        self.state.tick_soldier(id, &mut self.emitter);

        let drift = self.state.soldier(id).particle.pos.distance(input.pos);
        if drift > RECONCILE_EPSILON {
            trace!(id = id.0, drift, "client predicted a different position");
        }
    }

    fn apply_sim_events(&mut self) {
        let sim_events: Vec<SimEvent> = self.emitter.drain().collect();
        for event in sim_events {
            match event {
                SimEvent::ProjectileSpawned { owner, kind, pos, vel } => {
                    let mut particle = Particle::new(pos, self.state.settings().gravity);
                    particle.velocity = vel;
                    self.state.add_projectile(Projectile::new(owner, kind, particle));
                    self.broadcast(ServerMsg::ProjectileSpawn { owner, kind, pos, vel });
                },
                SimEvent::ProjectileHit { kind, target: Some(victim), .. } => {
                    self.damage_soldier(victim, kind.damage());
                },
                SimEvent::MeleeStrike { soldier, pos } => {
                    let victims: Vec<SoldierId> = self
                        .state
                        .soldiers()
                        .filter(|s| s.active && !s.dead_meat && s.id != soldier)
                        .filter(|s| {
                            let center =
                                s.particle.pos + Vec2::new(0.0, RADIUS_PROBE_CENTER_Y);
                            center.distance(pos) < SOLDIER_HIT_RADIUS
                        })
                        .map(|s| s.id)
                        .collect();
                    for victim in victims {
                        self.damage_soldier(victim, WeaponKind::Fists.damage());
                    }
                },
                SimEvent::FlagThrown { pos, vel, .. } => {
                    let mut particle = Particle::new(pos, self.state.settings().gravity);
                    particle.velocity = vel;
                    self.state.add_item(Item::new(ItemKind::Flag, particle));
                },
                _ => {},
            }
        }
    }

    fn damage_soldier(&mut self, victim: SoldierId, amount: f32) {
        let tick = self.state.tick();
        let soldier = match self.state.try_soldier_mut(victim) {
            Some(soldier) if soldier.active && !soldier.dead_meat => soldier,
            _ => return,
        };
        soldier.health = (soldier.health - amount).max(0.0);
        if soldier.health > 0.0 {
            return;
        }
        soldier.dead_meat = true;
        debug!(id = victim.0, "soldier died");
        self.respawns.insert(victim, tick + RESPAWN_DELAY_TICKS);
        self.broadcast(ServerMsg::KillCommand(victim));
    }

    fn respawn_due_soldiers(&mut self) {
        let now = self.state.tick();
        let due: Vec<SoldierId> = self
            .respawns
            .iter()
            .filter(|&(_, &when)| when <= now)
            .map(|(&id, _)| id)
            .collect();
        for id in due {
            self.respawns.remove(&id);
            // The soldier may have left while waiting.
            if self.state.try_soldier(id).is_none() {
                continue;
            }
            let pos = self.pick_spawn();
            self.state.spawn_soldier(id, pos);
            let nickname = self.state.soldier(id).nickname.clone();
            debug!(id = id.0, "soldier respawned");
            self.broadcast(ServerMsg::SoldierInfo { id, nickname, pos });
        }
    }

    fn broadcast_snapshots(&mut self) {
        for i in 0..self.clients.len() {
            if !self.clients[i].registered() {
                continue;
            }
            let own_id = self.clients[i].soldier_id;
            let last = self.clients[i].last_processed_input;
            let msgs: Vec<ServerMsg> = self
                .state
                .soldiers()
                .filter(|s| s.active)
                .map(|s| {
                    // The ack only means something on the connection that
                    // owns the soldier.
                    let ack = if Some(s.id) == own_id { last } else { 0 };
                    ServerMsg::SoldierState(SoldierState::of(s, ack))
                })
                .collect();
            let client = &mut self.clients[i];
            for msg in msgs {
                client.postbox.send_message(msg);
            }
        }
    }

    fn evict_dead_connections(&mut self, events: &mut Vec<Event>) {
        let now = self.state.tick();
        let mut dropped = Vec::new();
        let mut i = 0;
        while i < self.clients.len() {
            let client = &self.clients[i];
            let timed_out = client.registered()
                && now.saturating_sub(client.last_msg_tick) > CLIENT_TIMEOUT_TICKS;
            if client.postbox.error().is_some() || client.wants_leave || timed_out {
                if timed_out {
                    info!(nickname = ?client.nickname, "connection timed out");
                }
                dropped.push(self.clients.swap_remove(i));
            } else {
                i += 1;
            }
        }
        for client in dropped {
            if let Some(id) = client.soldier_id {
                self.state.remove_soldier(id);
                self.respawns.remove(&id);
                self.broadcast(ServerMsg::PlayerLeave(id));
                info!(id = id.0, nickname = ?client.nickname, "client left");
                events.push(Event::ClientDisconnected { id });
            }
        }
    }

    fn broadcast(&mut self, msg: ServerMsg) {
        for client in self.clients.iter_mut().filter(|c| c.registered()) {
            client.postbox.send_message(msg.clone());
        }
    }

    fn pick_spawn(&self) -> Vec2<f32> {
        let generals: Vec<Vec2<f32>> = self
            .state
            .map()
            .spawn_points()
            .iter()
            .filter(|s| s.kind == SpawnKind::General)
            .map(|s| s.pos)
            .collect();
        generals.choose(&mut thread_rng()).copied().unwrap_or_else(Vec2::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::comp::{Control, ProjectileKind};
    use common_net::{pair, ClientPostbox};

    fn server() -> Server {
        Server::new(PolyMap::flat_arena(), SimSettings::default())
    }

    /// Connects and joins, returning the far end, the assigned id and the
    /// full join transcript.
    fn join(server: &mut Server, nickname: &str) -> (ClientPostbox, SoldierId, Vec<ServerMsg>) {
        let (mut client_box, server_box) = pair();
        server.add_client(server_box);
        client_box.send_message(ClientMsg::Join { nickname: nickname.to_owned() });
        server.tick();
        let msgs: Vec<ServerMsg> = client_box.new_messages().collect();
        let id = msgs
            .iter()
            .find_map(|msg| match msg {
                ServerMsg::AssignId(id) => Some(*id),
                _ => None,
            })
            .expect("join was not answered with a slot");
        (client_box, id, msgs)
    }

    fn input(sequence: u32, control: Control) -> ClientMsg {
        ClientMsg::Input(SoldierInput {
            sequence,
            tick: sequence as u64,
            pos: Vec2::zero(),
            control,
        })
    }

    #[test]
    fn join_assigns_a_slot_and_announces_the_soldier() {
        let mut server = server();
        let (mut client_box, server_box) = pair();
        server.add_client(server_box);
        client_box.send_message(ClientMsg::Join { nickname: "ana".to_owned() });

        let events = server.tick();
        assert_eq!(events, vec![Event::ClientConnected {
            id: SoldierId(1),
            nickname: "ana".to_owned(),
        }]);
        assert!(server.state().soldier(SoldierId(1)).active);

        let msgs: Vec<ServerMsg> = client_box.new_messages().collect();
        assert!(matches!(msgs.first(), Some(ServerMsg::AssignId(SoldierId(1)))));
        assert!(msgs.iter().any(|m| matches!(
            m,
            ServerMsg::SoldierInfo { id: SoldierId(1), nickname, .. } if nickname == "ana"
        )));
        assert!(msgs
            .iter()
            .any(|m| matches!(m, ServerMsg::SoldierState(s) if s.id == SoldierId(1))));
    }

    #[test]
    fn second_joiner_learns_the_existing_roster() {
        let mut server = server();
        let (mut ana_box, ana, _) = join(&mut server, "ana");
        let (_bob_box, bob, bob_msgs) = join(&mut server, "bob");
        assert_ne!(ana, bob);

        assert!(bob_msgs.iter().any(|m| matches!(
            m,
            ServerMsg::SoldierInfo { id, nickname, .. } if *id == ana && nickname == "ana"
        )));
        assert!(bob_msgs
            .iter()
            .any(|m| matches!(m, ServerMsg::SoldierInfo { id, .. } if *id == bob)));

        // The first client hears about the newcomer too.
        assert!(ana_box.new_messages().any(|m| matches!(
            m,
            ServerMsg::SoldierInfo { id, nickname, .. } if id == bob && nickname == "bob"
        )));
    }

    #[test]
    fn bad_nicknames_are_rejected_without_a_slot() {
        let mut server = server();
        let (mut client_box, server_box) = pair();
        server.add_client(server_box);
        client_box.send_message(ClientMsg::Join { nickname: "   ".to_owned() });

        let events = server.tick();
        assert!(events.is_empty());
        assert_eq!(server.state().soldiers().count(), 0);
        assert!(client_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::Error(ServerError::InvalidNickname))));
    }

    #[test]
    fn a_full_server_turns_joiners_away() {
        let settings = SimSettings { max_players: 1, ..SimSettings::default() };
        let mut server = Server::new(PolyMap::flat_arena(), settings);
        let _first = join(&mut server, "ana");

        let (mut late_box, server_box) = pair();
        server.add_client(server_box);
        late_box.send_message(ClientMsg::Join { nickname: "late".to_owned() });
        server.tick();
        assert!(late_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::Error(ServerError::ServerFull))));
        assert_eq!(server.player_count(), 1);
    }

    #[test]
    fn each_input_steps_the_soldier_exactly_once() {
        let mut server = server();
        let (mut client_box, id, _) = join(&mut server, "runner");

        let control = Control { right: true, aim: Vec2::new(1000.0, 40.0), ..Control::default() };
        for seq in 1..=3 {
            client_box.send_message(input(seq, control));
        }
        server.tick();

        // The same three steps through the same engine land on the same
        // position, bit for bit.
        let mut reference = StateManager::new(PolyMap::flat_arena(), SimSettings::default());
        let ref_id = reference.create_soldier("runner").unwrap();
        reference.spawn_soldier(ref_id, Vec2::new(0.0, 40.0));
        let mut emitter = Emitter::new();
        for _ in 0..3 {
            reference.soldier_mut(ref_id).control = control;
            reference.tick_soldier(ref_id, &mut emitter);
        }
        assert_eq!(
            server.state().soldier(id).particle.pos,
            reference.soldier(ref_id).particle.pos
        );

        // The snapshot acknowledges everything that was simulated.
        let ack = client_box
            .new_messages()
            .filter_map(|m| match m {
                ServerMsg::SoldierState(s) if s.id == id => Some(s.last_processed_input_id),
                _ => None,
            })
            .last();
        assert_eq!(ack, Some(3));
    }

    #[test]
    fn stale_and_repeated_inputs_are_dropped() {
        let mut server = server();
        let (mut client_box, id, _) = join(&mut server, "runner");

        let control = Control { right: true, aim: Vec2::new(1000.0, 40.0), ..Control::default() };
        for seq in 1..=3 {
            client_box.send_message(input(seq, control));
        }
        server.tick();
        let pos = server.state().soldier(id).particle.pos;

        client_box.send_message(input(2, control));
        client_box.send_message(input(3, control));
        server.tick();
        assert_eq!(server.state().soldier(id).particle.pos, pos);
    }

    #[test]
    fn snapshots_carry_each_connections_own_ack() {
        let mut server = server();
        let (mut ana_box, ana, _) = join(&mut server, "ana");
        let (mut bob_box, bob, _) = join(&mut server, "bob");

        for seq in 1..=2 {
            ana_box.send_message(input(seq, Control::default()));
        }
        for seq in 1..=5 {
            bob_box.send_message(input(seq, Control::default()));
        }
        server.tick();

        let ana_acks: Vec<(SoldierId, u32)> = ana_box
            .new_messages()
            .filter_map(|m| match m {
                ServerMsg::SoldierState(s) => Some((s.id, s.last_processed_input_id)),
                _ => None,
            })
            .collect();
        assert!(ana_acks.contains(&(ana, 2)));
        assert!(ana_acks.contains(&(bob, 0)));
        assert!(bob_box.new_messages().any(|m| matches!(
            m,
            ServerMsg::SoldierState(s) if s.id == bob && s.last_processed_input_id == 5
        )));
    }

    #[test]
    fn npcs_fall_and_settle_without_a_connection() {
        let mut server = server();
        let id = server.create_npc("bot").unwrap();
        assert_eq!(server.state().soldier(id).particle.pos, Vec2::new(0.0, 40.0));

        for _ in 0..60 {
            server.tick();
        }
        let soldier = server.state().soldier(id);
        assert!(soldier.on_ground);
        assert!((soldier.particle.pos.y - 48.0).abs() < 1.0);
    }

    #[test]
    fn bullets_wound_then_kill_then_the_dead_respawn() {
        let mut server = server();
        let (mut observer_box, shooter, _) = join(&mut server, "observer");
        let victim = server.create_npc("target").unwrap();
        server.state_mut().soldier_mut(victim).particle.pos = Vec2::new(100.0, 44.0);

        let fire_bullet = |server: &mut Server| {
            let mut particle = Particle::new(Vec2::new(60.0, 40.0), 0.06);
            particle.velocity = Vec2::new(9.0, 0.0);
            server
                .state_mut()
                .add_projectile(Projectile::new(shooter, ProjectileKind::Bullet, particle));
        };

        fire_bullet(&mut server);
        for _ in 0..8 {
            server.tick();
        }
        let expected = Soldier::MAX_HEALTH - ProjectileKind::Bullet.damage();
        assert_eq!(server.state().soldier(victim).health, expected);

        // Five more hits push it past zero.
        for _ in 0..5 {
            fire_bullet(&mut server);
            for _ in 0..8 {
                server.tick();
            }
        }
        assert!(server.state().soldier(victim).dead_meat);
        assert_eq!(server.state().soldier(victim).health, 0.0);
        assert!(observer_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::KillCommand(id) if id == victim)));

        for _ in 0..=RESPAWN_DELAY_TICKS {
            server.tick();
        }
        let soldier = server.state().soldier(victim);
        assert!(!soldier.dead_meat);
        assert_eq!(soldier.health, Soldier::MAX_HEALTH);
        assert!(observer_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::SoldierInfo { id, .. } if id == victim)));
    }

    #[test]
    fn kill_marks_dead_and_rejects_unknown_ids() {
        let mut server = server();
        let (mut observer_box, _oid, _) = join(&mut server, "observer");
        let victim = server.create_npc("bag").unwrap();

        assert_eq!(server.kill(victim), Ok(()));
        assert!(server.state().soldier(victim).dead_meat);
        assert!(observer_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::KillCommand(id) if id == victim)));

        assert_eq!(
            server.kill(SoldierId(20)),
            Err(Error::UnknownSoldier(SoldierId(20)))
        );
    }

    #[test]
    fn a_hangup_removes_the_soldier_and_tells_the_others() {
        let mut server = server();
        let (mut ana_box, _ana, _) = join(&mut server, "ana");
        let (bob_box, bob, _) = join(&mut server, "bob");

        drop(bob_box);
        let events = server.tick();
        assert_eq!(events, vec![Event::ClientDisconnected { id: bob }]);
        assert!(server.state().try_soldier(bob).is_none());
        assert!(ana_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::PlayerLeave(id) if id == bob)));
    }

    #[test]
    fn a_polite_leave_works_like_a_hangup() {
        let mut server = server();
        let (mut ana_box, _ana, _) = join(&mut server, "ana");
        let (mut bob_box, bob, _) = join(&mut server, "bob");

        bob_box.send_message(ClientMsg::Leave);
        let events = server.tick();
        assert_eq!(events, vec![Event::ClientDisconnected { id: bob }]);
        assert!(server.state().try_soldier(bob).is_none());
        assert!(ana_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::PlayerLeave(id) if id == bob)));
    }

    #[test]
    fn silent_connections_time_out() {
        let mut server = server();
        let (_afk_box, afk, _) = join(&mut server, "afk");
        let (mut alive_box, alive, _) = join(&mut server, "alive");

        for _ in 0..(CLIENT_TIMEOUT_TICKS + 2) {
            alive_box.send_message(ClientMsg::Ping);
            server.tick();
        }
        assert!(server.state().try_soldier(afk).is_none());
        assert!(server.state().try_soldier(alive).is_some());
        assert!(alive_box
            .new_messages()
            .any(|m| matches!(m, ServerMsg::PlayerLeave(id) if id == afk)));
    }
}
