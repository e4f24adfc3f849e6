use crate::message::connection::{
    ClientConnection, ConnectionId, ConnectionRecv, ConnectionShutdown,
};
use crate::prelude::*;
use anyhow::Context;
use lifeline::dyn_bus::DynBus;
use postage::{mpsc, oneshot};
use tabgate_wire::bus::FrameListenerBus;
use tabgate_wire::message::connection::{FrameRecv, FrameSend};
use tabgate_wire::message::listener::FrameConnectionMessage;
use tabgate_wire::resource::listener::FrameListenerResource;
use tabgate_wire::service::{FrameConnectionService, FrameListenerService};

/// Accepts client sockets and wires each into the dispatcher: a recv task
/// announces the connection (with its outbound sink) before forwarding
/// frames, and a session task holds the connection's lifelines until the
/// dispatcher drops the shutdown handle.
pub struct ListenerService {
    _listener: FrameListenerService,
    _new_session: Lifeline,
}

impl Service for ListenerService {
    type Bus = GatewayBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let listener_bus = FrameListenerBus::default();
        let resource = bus.resource::<FrameListenerResource>()?;
        listener_bus.store_resource(resource);

        let _listener = FrameListenerService::spawn(&listener_bus)?;

        let rx_conn = listener_bus.rx::<FrameConnectionMessage>()?;
        let tx_dispatch = bus.tx::<ConnectionRecv>()?;
        let _new_session = Self::try_task("new_session", Self::new_session(rx_conn, tx_dispatch));

        Ok(Self {
            _listener,
            _new_session,
        })
    }
}

struct ConnectionLifeline {
    _frames: FrameConnectionService,
    _recv: Lifeline,
}

impl ListenerService {
    async fn new_session(
        mut rx_conn: impl Stream<Item = FrameConnectionMessage> + Unpin,
        tx_dispatch: mpsc::Sender<ConnectionRecv>,
    ) -> anyhow::Result<()> {
        // TODO: reap finished session handles instead of collecting them for
        // the life of the process
        let mut sessions = Vec::new();
        let mut index = 0u64;

        while let Some(msg) = rx_conn.recv().await {
            let id = ConnectionId(index);
            index += 1;
            debug!("starting session for client {}", id);

            let sink = msg.bus.tx::<FrameSend>()?;
            let rx_frames = msg.bus.rx::<FrameRecv>()?;
            let (tx_shutdown, rx_shutdown) = oneshot::channel();

            let client = ClientConnection {
                id,
                sink,
                shutdown: tx_shutdown,
            };

            let _recv = Self::try_task(
                format!("connection_{}_recv", id.0).as_str(),
                Self::recv_frames(client, rx_frames, tx_dispatch.clone()),
            );

            let support = ConnectionLifeline {
                _frames: msg.lifeline,
                _recv,
            };
            let session = Self::task(
                format!("connection_{}", id.0).as_str(),
                Self::run_session(rx_shutdown, support),
            );
            sessions.push(session);
        }

        Ok(())
    }

    /// Announces the connection before its first frame, so the dispatcher
    /// always learns about a client on the same channel, in order.
    async fn recv_frames(
        client: ClientConnection,
        mut rx: impl Stream<Item = FrameRecv> + Unpin,
        mut tx: impl Sink<Item = ConnectionRecv> + Unpin,
    ) -> anyhow::Result<()> {
        let id = client.id;
        tx.send(ConnectionRecv::Connected(client))
            .await
            .context("tx ConnectionRecv closed")?;

        while let Some(FrameRecv(message)) = rx.recv().await {
            tx.send(ConnectionRecv::Frame(id, message))
                .await
                .context("tx ConnectionRecv closed")?;
        }

        tx.send(ConnectionRecv::Disconnected(id))
            .await
            .context("tx ConnectionRecv closed")?;

        Ok(())
    }

    /// Keeps the connection's tasks alive until the dispatcher releases it.
    async fn run_session(
        mut rx_shutdown: impl Stream<Item = ConnectionShutdown> + Unpin,
        support: ConnectionLifeline,
    ) {
        rx_shutdown.recv().await;
        drop(support);
    }
}
