use common::comp::SoldierId;
use common_net::ServerPostbox;

// Ticks a registered connection may stay silent before it is dropped.
pub const CLIENT_TIMEOUT_TICKS: u64 = 600;

/// Per-connection bookkeeping. A connection starts unregistered and owns a
/// soldier only after a valid `Join`.
pub struct Client {
    pub postbox: ServerPostbox,
    pub soldier_id: Option<SoldierId>,
    pub nickname: Option<String>,
    /// Highest input `sequence` simulated for this connection, echoed back
    /// in every snapshot so the client can prune its replay buffer.
    pub last_processed_input: u32,
    /// World tick of the last message received, for timeout eviction.
    pub last_msg_tick: u64,
    pub wants_leave: bool,
}

impl Client {
    pub fn new(postbox: ServerPostbox, tick: u64) -> Self {
        Self {
            postbox,
            soldier_id: None,
            nickname: None,
            last_processed_input: 0,
            last_msg_tick: tick,
            wants_leave: false,
        }
    }

    pub fn registered(&self) -> bool {
        self.soldier_id.is_some()
    }
}
