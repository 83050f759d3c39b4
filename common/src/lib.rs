//! Deterministic simulation core shared by the jetfall client and server.
//!
//! Everything in here is plain single-threaded state advanced in fixed
//! ticks. All motion quantities are expressed per tick, never per second,
//! so replaying the same inputs over the same starting state produces
//! bit-identical results on every machine.

#![deny(unsafe_code)]

pub mod comp;
pub mod consts;
pub mod event;
pub mod geom;
pub mod map;
pub mod run;
pub mod settings;
pub mod sim;
pub mod state;
pub mod states;

// Reexports
pub use crate::{
    event::{Emitter, SimEvent},
    run::{Clock, LoopHandler, WorldLoop},
    settings::SimSettings,
    sim::SoldierPhysics,
    state::StateManager,
};
