use crate::bus::{FrameConnectionBus, FrameListenerBus};
use crate::message::listener::FrameConnectionMessage;
use crate::resource::{connection::FrameStreamResource, listener::FrameListenerResource};
use crate::service::FrameConnectionService;
use lifeline::{dyn_bus::DynBus, Bus, Lifeline, Service, Task};
use log::{debug, error};
use postage::sink::Sink;
use tokio::net::UnixListener;

/// Accepts sockets on the bound listener, and spawns a
/// [`FrameConnectionService`] for each.
pub struct FrameListenerService {
    _accept: Lifeline,
}

impl Service for FrameListenerService {
    type Bus = FrameListenerBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let listener = bus.resource::<FrameListenerResource>()?;

        let tx = bus.tx::<FrameConnectionMessage>()?;
        let _accept = Self::try_task("accept", accept_connections(listener.0, tx));

        Ok(Self { _accept })
    }
}

async fn accept_connections(
    listener: UnixListener,
    mut tx: impl Sink<Item = FrameConnectionMessage> + Unpin,
) -> anyhow::Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        debug!("connection opened");

        let conn_bus = FrameConnectionBus::default();
        conn_bus.store_resource(FrameStreamResource(stream));

        let lifeline = match FrameConnectionService::spawn(&conn_bus) {
            Ok(service) => service,
            Err(err) => {
                error!("error spawning connection service: {}", err);
                continue;
            }
        };

        let message = FrameConnectionMessage {
            bus: conn_bus,
            lifeline,
        };

        tx.send(message)
            .await
            .map_err(|_| anyhow::anyhow!("tx FrameConnectionMessage closed"))?;
    }
}
