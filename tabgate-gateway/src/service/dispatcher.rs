use crate::message::connection::{ClientConnection, ConnectionId, ConnectionRecv};
use crate::message::gateway::{BrowserRecv, BrowserSend, GatewayReady};
use crate::prelude::*;
use crate::state::tab::TabStore;
use anyhow::Context;
use std::collections::HashMap;
use std::time::Duration;
use tabgate_api::message::{method, Message, Request, Response};
use tabgate_api::tab::Tab;
use tabgate_wire::message::connection::FrameSend;
use tokio::{select, time};
use uuid::Uuid;

/// Deadline for the browser's reply to the startup `list` request.  Missing
/// it is fatal: the gateway never becomes ready.
const SEED_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on one send into a client's outbound channel.  A connection that
/// cannot drain within this window is dropped, so event fan-out never stalls
/// on the slowest subscriber.
const SUBSCRIBER_SEND_TIMEOUT: Duration = Duration::from_millis(500);

/// The gateway's single point of coordination.  The only task that touches
/// the tab store, the pending-request table, or the subscriber table.
///
/// Seeds the store from the browser, then routes: client requests to the
/// browser (or answers `list` locally), browser responses to the pending
/// client, and browser events to the store and every subscriber, in the
/// order they were read.
pub struct DispatcherService {
    _run: Lifeline,
}

impl Service for DispatcherService {
    type Bus = GatewayBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let rx_browser = bus.rx::<BrowserRecv>()?;
        let rx_connections = bus.rx::<ConnectionRecv>()?;
        let tx_browser = bus.tx::<BrowserSend>()?;
        let tx_ready = bus.tx::<GatewayReady>()?;

        let _run = Self::try_task(
            "run",
            Self::run(rx_browser, rx_connections, tx_browser, tx_ready),
        );

        Ok(Self { _run })
    }
}

impl DispatcherService {
    async fn run(
        mut rx_browser: impl Stream<Item = BrowserRecv> + Unpin,
        mut rx_connections: impl Stream<Item = ConnectionRecv> + Unpin,
        mut tx_browser: impl Sink<Item = BrowserSend> + Unpin,
        mut tx_ready: impl Sink<Item = GatewayReady> + Unpin,
    ) -> anyhow::Result<()> {
        let mut store = TabStore::new();
        let seeded = Self::seed(&mut store, &mut rx_browser, &mut tx_browser).await?;
        info!("received {} tabs from browser", seeded);
        tx_ready.send(GatewayReady { tabs: seeded }).await.ok();

        let mut pending: HashMap<Uuid, ConnectionId> = HashMap::new();
        let mut subscribers: HashMap<ConnectionId, ClientConnection> = HashMap::new();

        loop {
            select! {
                msg = rx_browser.recv() => match msg {
                    Some(BrowserRecv(message)) => {
                        Self::recv_browser(message, &mut store, &mut pending, &mut subscribers).await;
                    }
                    None => break,
                },
                msg = rx_connections.recv() => match msg {
                    Some(message) => {
                        Self::recv_connection(message, &store, &mut pending, &mut subscribers, &mut tx_browser).await?;
                    }
                    None => break,
                },
            }
        }

        Ok(())
    }

    /// Issues a synthesized `list` request over the browser channel and
    /// seeds the store from the reply.  Frames arriving before the reply
    /// are dropped: nothing downstream exists to receive them yet.
    async fn seed(
        store: &mut TabStore,
        rx_browser: &mut (impl Stream<Item = BrowserRecv> + Unpin),
        tx_browser: &mut (impl Sink<Item = BrowserSend> + Unpin),
    ) -> anyhow::Result<usize> {
        let request = Request::new(method::LIST);
        let id = request.id;
        tx_browser
            .send(BrowserSend(Message::Request(request)))
            .await
            .map_err(|_| anyhow::Error::msg("tx BrowserSend closed"))?;

        let response = time::timeout(SEED_TIMEOUT, Self::seed_response(id, rx_browser))
            .await
            .context("timed out waiting for the initial tab list")??;

        let info = response
            .info
            .ok_or_else(|| anyhow::Error::msg("initial tab list response carried no payload"))?;
        let tabs: Vec<Tab> =
            serde_json::from_value(info).context("unable to read the initial tab list")?;

        let count = tabs.len();
        store.seed(tabs);

        Ok(count)
    }

    async fn seed_response(
        id: Uuid,
        rx_browser: &mut (impl Stream<Item = BrowserRecv> + Unpin),
    ) -> anyhow::Result<Response> {
        while let Some(BrowserRecv(message)) = rx_browser.recv().await {
            match message {
                Message::Response(response) if response.id == id => return Ok(response),
                other => debug!("dropping frame received before the initial tab list: {:?}", other),
            }
        }

        Err(anyhow::Error::msg(
            "browser channel closed before the initial tab list",
        ))
    }

    async fn recv_browser(
        message: Message,
        store: &mut TabStore,
        pending: &mut HashMap<Uuid, ConnectionId>,
        subscribers: &mut HashMap<ConnectionId, ClientConnection>,
    ) {
        match message {
            Message::Response(response) => {
                let connection = match pending.remove(&response.id) {
                    Some(connection) => connection,
                    None => {
                        warn!("dropping response for unknown request {}", response.id);
                        return;
                    }
                };

                let delivered = match subscribers.get_mut(&connection) {
                    Some(client) => {
                        Self::send_client(client, FrameSend(Message::Response(response))).await
                    }
                    None => {
                        debug!("dropping response for departed client {}", connection);
                        true
                    }
                };

                if !delivered {
                    Self::drop_client(connection, pending, subscribers);
                }
            }
            Message::Event(event) => {
                if let Err(err) = store.apply(&event) {
                    // the browser's view is authoritative; the event is
                    // consumed either way
                    error!("failed to apply {} event: {}", event.name(), err);
                }

                let frame = FrameSend(Message::Event(event));
                let mut dropped = Vec::new();
                for (id, client) in subscribers.iter_mut() {
                    if !Self::send_client(client, frame.clone()).await {
                        dropped.push(*id);
                    }
                }
                for id in dropped {
                    Self::drop_client(id, pending, subscribers);
                }
            }
            Message::Request(request) => {
                warn!(
                    "dropping out-of-protocol request {} ({}) from browser",
                    request.id, request.method
                );
            }
        }
    }

    async fn recv_connection(
        message: ConnectionRecv,
        store: &TabStore,
        pending: &mut HashMap<Uuid, ConnectionId>,
        subscribers: &mut HashMap<ConnectionId, ClientConnection>,
        tx_browser: &mut (impl Sink<Item = BrowserSend> + Unpin),
    ) -> anyhow::Result<()> {
        match message {
            ConnectionRecv::Connected(client) => {
                debug!("client {} connected", client.id);
                subscribers.insert(client.id, client);
            }
            ConnectionRecv::Frame(id, Message::Request(request)) => {
                if request.method == method::LIST {
                    let response = Self::list_response(&request, store);
                    let delivered = match subscribers.get_mut(&id) {
                        Some(client) => {
                            Self::send_client(client, FrameSend(Message::Response(response))).await
                        }
                        None => true,
                    };

                    if !delivered {
                        Self::drop_client(id, pending, subscribers);
                    }
                } else {
                    pending.insert(request.id, id);
                    tx_browser
                        .send(BrowserSend(Message::Request(request)))
                        .await
                        .map_err(|_| anyhow::Error::msg("tx BrowserSend closed"))?;
                }
            }
            ConnectionRecv::Frame(id, message) => {
                warn!("dropping non-request frame from client {}: {:?}", id, message);
            }
            ConnectionRecv::Disconnected(id) => {
                debug!("client {} disconnected", id);
                Self::drop_client(id, pending, subscribers);
            }
        }

        Ok(())
    }

    /// Marshals the store's open tabs.  Never forwarded to the browser: the
    /// store is the authoritative copy for reads.
    fn list_response(request: &Request, store: &TabStore) -> Response {
        let tabs: Vec<&Tab> = store.tabs().collect();
        match serde_json::to_value(&tabs) {
            Ok(info) => Response::success(request.id, Some(info)),
            Err(err) => {
                error!("failed to list tabs: {}", err);
                Response::error(request.id, err.to_string())
            }
        }
    }

    /// Returns false if the connection is gone, or too slow to keep.
    async fn send_client(client: &mut ClientConnection, frame: FrameSend) -> bool {
        match time::timeout(SUBSCRIBER_SEND_TIMEOUT, client.sink.send(frame)).await {
            Ok(Ok(())) => true,
            Ok(Err(_closed)) => false,
            Err(_elapsed) => {
                warn!("dropping slow client {}", client.id);
                false
            }
        }
    }

    /// Removes a client's subscription and reaps its pending requests.
    /// Dropping the [`ClientConnection`] shutdown handle closes the socket.
    fn drop_client(
        id: ConnectionId,
        pending: &mut HashMap<Uuid, ConnectionId>,
        subscribers: &mut HashMap<ConnectionId, ClientConnection>,
    ) {
        subscribers.remove(&id);
        pending.retain(|_, connection| *connection != id);
    }
}
