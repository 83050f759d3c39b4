//! Wire messages and the postbox pairs the jetfall client and server talk
//! through. The message types are the protocol; the postbox is a duplex
//! channel that serializes everything crossing it, so both ends only ever
//! exchange bytes a real transport could carry.

#![deny(unsafe_code)]

pub mod msg;
pub mod postbox;

// Reexports
pub use crate::{
    msg::{
        validate_nickname, ClientMsg, ServerError, ServerMsg, SoldierInput, SoldierState,
        MAX_NICKNAME_LEN,
    },
    postbox::{pair, Error, PostMsg, Postbox},
};

/// The client's end of a connection: sends [`ClientMsg`], receives
/// [`ServerMsg`].
pub type ClientPostbox = Postbox<ClientMsg, ServerMsg>;

/// The server's end of one client connection.
pub type ServerPostbox = Postbox<ServerMsg, ClientMsg>;
