//! A duplex message pipe with the ergonomics of a socket wrapper: typed
//! ends, fire-and-forget sends, drained receives, sticky errors.
//!
//! Transport here is a pair of in-process channels; every message is still
//! serialized to bytes on send and deserialized on receive, so anything
//! that flows through a postbox is proven wire-safe and the two ends share
//! no structure. A real socket transport slots in behind the same surface.

use crossbeam_channel as channel;
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, sync::Arc};

#[derive(Clone, Debug)]
pub enum Error {
    Bincode(Arc<bincode::Error>),
    ChannelFailure,
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Bincode(Arc::new(err))
    }
}

impl From<channel::TryRecvError> for Error {
    fn from(_error: channel::TryRecvError) -> Self {
        Error::ChannelFailure
    }
}

impl<T> From<channel::SendError<T>> for Error {
    fn from(_error: channel::SendError<T>) -> Self {
        Error::ChannelFailure
    }
}

pub trait PostMsg: Serialize + DeserializeOwned + 'static + Send {}
impl<T: Serialize + DeserializeOwned + 'static + Send> PostMsg for T {}

/// One end of a connection. `S` is what this end sends, `R` what it
/// receives; [`pair`] hands out the two matching ends.
///
/// The first failure (encode, decode or a hung-up peer) is latched into
/// [`Self::error`] and the postbox goes quiet, mirroring how a dead socket
/// behaves. Callers poll `error()` to notice the disconnect.
pub struct Postbox<S: PostMsg, R: PostMsg> {
    send_tx: channel::Sender<Vec<u8>>,
    recv_rx: channel::Receiver<Vec<u8>>,
    error: Option<Error>,
    _phantom: PhantomData<(S, R)>,
}

/// Creates a connected pair: what one end sends, the other receives.
pub fn pair<S: PostMsg, R: PostMsg>() -> (Postbox<S, R>, Postbox<R, S>) {
    let (a_tx, a_rx) = channel::unbounded();
    let (b_tx, b_rx) = channel::unbounded();
    (
        Postbox { send_tx: a_tx, recv_rx: b_rx, error: None, _phantom: PhantomData },
        Postbox { send_tx: b_tx, recv_rx: a_rx, error: None, _phantom: PhantomData },
    )
}

impl<S: PostMsg, R: PostMsg> Postbox<S, R> {
    pub fn error(&self) -> Option<Error> {
        self.error.clone()
    }

    /// Queues `msg` for the peer. Sending never blocks; failures latch
    /// into the error slot instead of surfacing per call.
    pub fn send_message(&mut self, msg: S) {
        if self.error.is_some() {
            return;
        }
        match bincode::serialize(&msg) {
            Ok(bytes) => {
                if let Err(e) = self.send_tx.send(bytes) {
                    self.error = Some(e.into());
                }
            },
            Err(e) => self.error = Some(e.into()),
        }
    }

    /// Drains every message that has arrived since the last call, in send
    /// order.
    pub fn new_messages(&mut self) -> impl ExactSizeIterator<Item = R> {
        let mut new = Vec::new();

        if self.error.is_some() {
            return new.into_iter();
        }

        loop {
            match self.recv_rx.try_recv() {
                Ok(bytes) => match bincode::deserialize(&bytes) {
                    Ok(msg) => new.push(msg),
                    Err(e) => {
                        self.error = Some(e.into());
                        break;
                    },
                },
                Err(channel::TryRecvError::Empty) => break,
                Err(e) => {
                    self.error = Some(e.into());
                    break;
                },
            }
        }

        new.into_iter()
    }
}
