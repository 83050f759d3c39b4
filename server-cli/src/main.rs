//! Headless dedicated server.
//!
//! Runs the authoritative world on the fixed-tick loop. With `--bots` it
//! also spins up scripted clients that connect over loopback pairs, which
//! drives the entire prediction and reconciliation path without a socket
//! in sight.

use clap::Parser;
use client::Client;
use common::{
    comp::Control,
    consts::TICK_RATE,
    event::Emitter,
    map::PolyMap,
    run::{LoopHandler, WorldLoop},
    settings::SimSettings,
};
use server::{Event, Server};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vek::*;

#[derive(Parser)]
#[command(about = "Headless jetfall server")]
struct Args {
    /// Path of the RON settings file; written with defaults when missing.
    #[arg(long, default_value = "server_settings.ron")]
    settings: PathBuf,
    /// Stop after this many world ticks instead of running forever.
    #[arg(long)]
    ticks: Option<u64>,
    /// Scripted loopback clients to fill the arena with.
    #[arg(long, default_value_t = 0)]
    bots: usize,
    /// Overrides the frame cap from the settings file.
    #[arg(long)]
    fps_cap: Option<u32>,
    /// Log only warnings and errors, whatever `RUST_LOG` says.
    #[arg(long)]
    quiet: bool,
}

struct Bot {
    client: Client,
    seed: u64,
}

impl Bot {
    /// A looping patrol: run one way, jet, turn around and come back.
    fn control(&self, tick: u64) -> Control {
        let phase = (tick + self.seed * 37) % 240;
        Control {
            right: phase < 90,
            left: (120..210).contains(&phase),
            up: phase % 60 == 0,
            jets: (40..70).contains(&phase),
            aim: Vec2::new(if phase < 120 { 600.0 } else { -600.0 }, 0.0),
            ..Control::default()
        }
    }
}

struct HeadlessServer {
    server: Server,
    bots: Vec<Bot>,
    emitter: Emitter,
    ticks_run: u64,
    tick_limit: Option<u64>,
}

impl LoopHandler for HeadlessServer {
    fn tick(&mut self, tick: u64) {
        let emitter = &mut self.emitter;
        self.bots.retain_mut(|bot| {
            let control = bot.control(tick);
            match bot.client.tick(control, emitter) {
                Ok(()) => true,
                Err(err) => {
                    warn!(?err, "dropping a failed bot");
                    false
                },
            }
        });
        // Bots have no screen or speakers; their effects go nowhere.
        let _ = self.emitter.drain();

        for event in self.server.tick() {
            match event {
                Event::ClientConnected { id, nickname } => {
                    info!(id = id.0, %nickname, "client connected");
                },
                Event::ClientDisconnected { id } => info!(id = id.0, "client disconnected"),
            }
        }
        self.ticks_run += 1;
    }

    fn should_stop(&self) -> bool {
        self.tick_limit.is_some_and(|limit| self.ticks_run >= limit)
    }
}

fn main() {
    let args = Args::parse();

    let filter = if args.quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = SimSettings::load(&args.settings);
    let fps_cap = args.fps_cap.unwrap_or(settings.fps_cap);
    let map = PolyMap::flat_arena();
    info!(map = %map.name, tick_rate = TICK_RATE, fps_cap, "starting headless server");

    let mut server = Server::new(map.clone(), settings.clone());
    let mut bots = Vec::new();
    for n in 0..args.bots {
        let (client_box, server_box) = common_net::pair();
        server.add_client(server_box);
        let client = Client::connect(
            client_box,
            format!("bot-{}", n + 1),
            map.clone(),
            settings.clone(),
        );
        bots.push(Bot { client, seed: n as u64 });
    }

    let mut handler = HeadlessServer {
        server,
        bots,
        emitter: Emitter::new(),
        ticks_run: 0,
        tick_limit: args.ticks,
    };
    WorldLoop::new(fps_cap).run(&mut handler);
    info!(ticks = handler.ticks_run, "server stopped");
}
