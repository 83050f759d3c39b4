//! The record of inputs the server has not confirmed yet.
//!
//! Every predicted tick pushes one entry; every authoritative snapshot
//! prunes the entries the server has caught up with and the remainder is
//! replayed on top of the snapshot. Sequence ids start at 1 and never
//! repeat within a session, so "server processed up to N" is unambiguous.

use common::comp::{AnimId, Control, Soldier, Stance};
use std::collections::VecDeque;
use vek::*;

#[derive(Copy, Clone, Debug)]
pub struct PendingInput {
    pub sequence: u32,
    /// Client tick this input was sampled on.
    pub tick: u64,
    /// Where the local simulation put the soldier after applying this
    /// input. Compared against the replayed result to measure divergence.
    pub predicted_pos: Vec2<f32>,
    pub control: Control,
}

/// The simulation-relevant fields of a soldier frozen at one instant.
///
/// Taken from the predicted soldier just before an authoritative state
/// overwrites it. When prediction and server disagree, logging this copy
/// next to the server's version shows which fields drifted.
#[derive(Copy, Clone, Debug)]
pub struct SoldierSnapshot {
    pub pos: Vec2<f32>,
    pub velocity: Vec2<f32>,
    pub legs: AnimId,
    pub legs_frame: u32,
    pub body: AnimId,
    pub body_frame: u32,
    pub stance: Stance,
    pub on_ground: bool,
    pub jets_count: i32,
}

impl SoldierSnapshot {
    pub fn of(soldier: &Soldier) -> Self {
        Self {
            pos: soldier.particle.pos,
            velocity: soldier.particle.velocity,
            legs: soldier.legs.id,
            legs_frame: soldier.legs.frame,
            body: soldier.body.id,
            body_frame: soldier.body.frame,
            stance: soldier.stance,
            on_ground: soldier.on_ground,
            jets_count: soldier.jets_count,
        }
    }
}

pub struct PendingInputs {
    inputs: VecDeque<PendingInput>,
    next_sequence: u32,
}

impl Default for PendingInputs {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingInputs {
    pub fn new() -> Self {
        Self { inputs: VecDeque::new(), next_sequence: 1 }
    }

    /// Records one predicted input and assigns its sequence id.
    pub fn push(&mut self, tick: u64, predicted_pos: Vec2<f32>, control: Control) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.inputs.push_back(PendingInput { sequence, tick, predicted_pos, control });
        sequence
    }

    /// Drops every input the server has already simulated, returning how
    /// many were pruned. Stale acknowledgements (lower than an earlier one)
    /// prune nothing.
    pub fn acknowledge(&mut self, last_processed: u32) -> usize {
        let before = self.inputs.len();
        while self.inputs.front().is_some_and(|i| i.sequence <= last_processed) {
            self.inputs.pop_front();
        }
        before - self.inputs.len()
    }

    /// Unacknowledged inputs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingInput> {
        self.inputs.iter()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
