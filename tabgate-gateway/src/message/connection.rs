use postage::{mpsc, oneshot};
use std::fmt;
use std::fmt::Display;
use tabgate_api::message::Message;
use tabgate_wire::message::connection::FrameSend;

/// Identifies one accepted client connection for the life of the gateway.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct ConnectionId(pub u64);

impl Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConnectionId(")?;
        self.0.fmt(f)?;
        f.write_str(")")?;

        Ok(())
    }
}

/// One client's handles, held by the dispatcher while the connection lives.
/// `sink` is the connection's bounded outbound channel.  Dropping `shutdown`
/// tears the connection down.
pub struct ClientConnection {
    pub id: ConnectionId,
    pub sink: mpsc::Sender<FrameSend>,
    pub shutdown: oneshot::Sender<ConnectionShutdown>,
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .finish()
    }
}

/// Ends one client session.  The gateway is not affected.
#[derive(Debug, Clone)]
pub struct ConnectionShutdown {}

/// Fan-in from every client connection into the dispatcher.  For a given
/// connection, `Connected` always precedes the first `Frame`, and
/// `Disconnected` follows the last.
#[derive(Debug)]
pub enum ConnectionRecv {
    Connected(ClientConnection),
    Frame(ConnectionId, Message),
    Disconnected(ConnectionId),
}
