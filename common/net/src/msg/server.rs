use common::comp::{Animation, ProjectileKind, Soldier, SoldierId, Stance};
use serde::{Deserialize, Serialize};
use vek::*;

/// Authoritative snapshot of one soldier, broadcast after every server
/// tick.
///
/// Carries exactly the state the engine reads when simulating: applying a
/// snapshot and replaying the same inputs reproduces the server's result
/// bit for bit. Inventory-ish fields that cannot move a soldier (ammo,
/// cooldowns) stay out; they are corrected by their own events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoldierState {
    pub id: SoldierId,
    pub pos: Vec2<f32>,
    pub old_pos: Vec2<f32>,
    pub velocity: Vec2<f32>,
    pub force: Vec2<f32>,
    pub legs: Animation,
    pub body: Animation,
    pub stance: Stance,
    pub direction: i8,
    /// World-space aim point, mirrored into `control.aim` on apply.
    pub aim: Vec2<f32>,
    pub on_ground: bool,
    pub on_ground_for_law: bool,
    pub on_ground_last_frame: bool,
    pub on_ground_permanent: bool,
    pub jets_count: i32,
    pub active_weapon: usize,
    pub health: f32,
    /// Highest input `sequence` of the receiving connection the server had
    /// simulated when this snapshot was taken.
    pub last_processed_input_id: u32,
}

impl SoldierState {
    pub fn of(soldier: &Soldier, last_processed_input_id: u32) -> Self {
        Self {
            id: soldier.id,
            pos: soldier.particle.pos,
            old_pos: soldier.particle.old_pos,
            velocity: soldier.particle.velocity,
            force: soldier.particle.force,
            legs: soldier.legs,
            body: soldier.body,
            stance: soldier.stance,
            direction: soldier.direction,
            aim: soldier.control.aim,
            on_ground: soldier.on_ground,
            on_ground_for_law: soldier.on_ground_for_law,
            on_ground_last_frame: soldier.on_ground_last_frame,
            on_ground_permanent: soldier.on_ground_permanent,
            jets_count: soldier.jets_count,
            active_weapon: soldier.active_weapon,
            health: soldier.health,
            last_processed_input_id,
        }
    }

    /// Overwrites every engine-visible field of `soldier` with this
    /// snapshot. The id is not touched; routing to the right soldier is the
    /// caller's job.
    pub fn apply_to(&self, soldier: &mut Soldier) {
        soldier.particle.pos = self.pos;
        soldier.particle.old_pos = self.old_pos;
        soldier.particle.velocity = self.velocity;
        soldier.particle.force = self.force;
        soldier.legs = self.legs;
        soldier.body = self.body;
        soldier.stance = self.stance;
        soldier.direction = self.direction;
        soldier.control.aim = self.aim;
        soldier.on_ground = self.on_ground;
        soldier.on_ground_for_law = self.on_ground_for_law;
        soldier.on_ground_last_frame = self.on_ground_last_frame;
        soldier.on_ground_permanent = self.on_ground_permanent;
        soldier.jets_count = self.jets_count;
        soldier.active_weapon = self.active_weapon;
        soldier.health = self.health;
    }
}

/// Messages sent from the server to its clients
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ServerMsg {
    /// Reply to a successful `Join`: the slot this connection now owns.
    AssignId(SoldierId),
    /// A soldier exists; sent for every active soldier on join and for
    /// every newcomer afterwards.
    SoldierInfo {
        id: SoldierId,
        nickname: String,
        pos: Vec2<f32>,
    },
    SoldierState(SoldierState),
    ProjectileSpawn {
        owner: SoldierId,
        kind: ProjectileKind,
        pos: Vec2<f32>,
        vel: Vec2<f32>,
    },
    PlayerLeave(SoldierId),
    /// The named soldier is dead until its next respawn.
    KillCommand(SoldierId),
    Ping,
    Pong,
    Error(ServerError),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ServerError {
    ServerFull,
    InvalidNickname,
}
