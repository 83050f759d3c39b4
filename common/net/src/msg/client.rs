use common::comp::Control;
use serde::{Deserialize, Serialize};
use vek::*;

/// One tick of input for the soldier a connection owns.
///
/// `sequence` is strictly increasing per connection; the server echoes the
/// highest value it has simulated back inside every snapshot, which is what
/// lets the client prune its prediction buffer. The aim point travels
/// inside `control`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoldierInput {
    pub sequence: u32,
    /// Client tick this input was sampled on.
    pub tick: u64,
    /// Where the client predicts its soldier ends up after this input.
    /// Purely diagnostic: the server simulates from its own state and may
    /// log the divergence, but never trusts this position.
    pub pos: Vec2<f32>,
    pub control: Control,
}

/// Messages sent from the client to the server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ClientMsg {
    Join { nickname: String },
    Input(SoldierInput),
    Leave,
    Ping,
    Pong,
}
