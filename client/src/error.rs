use common_net::{postbox, ServerError};

#[derive(Debug)]
pub enum Error {
    /// The postbox to the server failed; the session is over.
    Network(postbox::Error),
    /// The server answered the join request with a refusal.
    ServerRejected(ServerError),
}

impl From<postbox::Error> for Error {
    fn from(err: postbox::Error) -> Self {
        Self::Network(err)
    }
}
