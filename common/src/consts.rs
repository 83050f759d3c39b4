//! Tuning constants for the soldier simulation. Everything kinematic is in
//! map units per tick; the tick itself is fixed at [`TICK_RATE`] per second.

/// Simulation ticks per second. The world advances in steps of exactly
/// `1.0 / TICK_RATE` seconds regardless of render framerate.
pub const TICK_RATE: u32 = 60;
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// Downward pull added to a particle's force every tick. Screen coordinates
// grow downward, so gravity is positive.
pub const GRAVITY: f32 = 0.06;

/// Hard per-axis speed limit applied at the end of every soldier tick.
pub const MAX_VELOCITY: f32 = 11.0;

// Running. Acceleration only applies while below RUN_SPEED, which combined
// with particle damping gives the asymptotic ramp-up.
pub const RUN_SPEED: f32 = 2.2;
pub const RUN_ACCEL: f32 = 0.25;
pub const CROUCH_RUN_SPEED: f32 = 1.2;
pub const CROUCH_RUN_ACCEL: f32 = 0.16;
pub const PRONE_MOVE_SPEED: f32 = 0.55;
pub const PRONE_MOVE_ACCEL: f32 = 0.09;
pub const ROLL_SPEED: f32 = 1.8;

// Air control while airborne without jets.
pub const FLY_SPEED: f32 = 1.6;
pub const FLY_ACCEL: f32 = 0.08;

// Jumping. A plain jump is straight up, a side jump trades some height for
// horizontal push.
pub const JUMP_FORCE: f32 = 3.3;
pub const JUMP_SIDE_FORCE_X: f32 = 1.6;
pub const JUMP_SIDE_FORCE_Y: f32 = 2.7;

// Jet boots. Thrust is scaled by the map gravity so low-gravity maps do not
// turn jets into rockets. Lifting off from the ground gets a boost so a
// short tap is enough to break contact.
pub const JET_THRUST: f32 = 0.1;
pub const JET_GROUND_BOOST: f32 = 2.0;
pub const JET_PRONE_THRUST_X: f32 = 0.2;
pub const JET_PRONE_THRUST_Y: f32 = 0.05;

/// Horizontal speed above which pressing prone turns into a roll.
pub const ROLL_TRIGGER_SPEED: f32 = 1.5;

// Ground friction multipliers applied by the standing-still leg states.
pub const STAND_FRICTION: f32 = 0.7;
pub const CROUCH_FRICTION: f32 = 0.6;
pub const PRONE_FRICTION: f32 = 0.45;

// Collision probe layout relative to the soldier origin, which sits between
// the feet. Negative y is up. Head and side probes drop with the stance so
// a prone soldier fits under low ceilings.
pub const PROBE_HEAD_X: f32 = 3.5;
pub const PROBE_HEAD_Y_STAND: f32 = -12.0;
pub const PROBE_HEAD_Y_CROUCH: f32 = -8.0;
pub const PROBE_HEAD_Y_PRONE: f32 = -3.0;
pub const PROBE_GROUND_Y: f32 = 2.0;
pub const PROBE_SIDE_X: f32 = 3.5;
pub const PROBE_SIDE_Y_STAND: f32 = -6.0;
pub const PROBE_SIDE_Y_CROUCH: f32 = -4.0;
pub const PROBE_SIDE_Y_PRONE: f32 = -1.5;
pub const RADIUS_PROBE_CENTER_Y: f32 = -4.0;
pub const LAW_RADIUS: f32 = 7.0;
pub const SNAP_RADIUS: f32 = 3.0;
pub const VERTEX_RADIUS: f32 = 3.0;

// Weapon muzzle distance from the soldier origin along the aim direction.
pub const MUZZLE_OFFSET: f32 = 10.0;
pub const BULLET_SPEED: f32 = 9.0;
pub const GRENADE_SPEED: f32 = 5.0;

/// Body circle used for projectile hit tests, centered like the radius probe.
pub const SOLDIER_HIT_RADIUS: f32 = 7.0;

pub const MAX_SOLDIERS: usize = 32;

/// Fuel ticks a soldier spawns with when the map does not override it.
pub const DEFAULT_JET_CAP: i32 = 200;

/// Ticks between client ping probes when no probe is outstanding.
pub const PING_INTERVAL_TICKS: u64 = 60;

/// Divergence between a replayed position and the recorded prediction that
/// is considered worth logging, in map units.
pub const RECONCILE_EPSILON: f32 = 1e-3;

/// Guard against division by a degenerate length.
pub const EPSILON: f32 = 1e-5;
