use crate::message::client::{RequestCancel, RequestSend};
use crate::prelude::*;
use lifeline::dyn_bus::DynBus;
use postage::oneshot;
use std::collections::HashMap;
use tabgate_api::message::{Message, Response, TabEvent};
use tabgate_wire::bus::FrameConnectionBus;
use tabgate_wire::message::connection::{FrameRecv, FrameSend};
use tabgate_wire::resource::connection::FrameStreamResource;
use tabgate_wire::service::FrameConnectionService;
use tokio::select;
use uuid::Uuid;

/// Drives the client's gateway socket.  A single correlation task owns the
/// pending-request table: it installs reply sinks for submitted requests,
/// resolves them when responses arrive, and forwards events to the bus.
///
/// When the socket closes, the table is dropped and every outstanding
/// request fails with a closed error.
pub struct ClientService {
    _frames: FrameConnectionService,
    _run: Lifeline,
}

impl Service for ClientService {
    type Bus = ClientBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let stream = bus.resource::<FrameStreamResource>()?;

        let conn_bus = FrameConnectionBus::default();
        conn_bus.store_resource(stream);
        let _frames = FrameConnectionService::spawn(&conn_bus)?;

        let rx_frames = conn_bus.rx::<FrameRecv>()?;
        let tx_frames = conn_bus.tx::<FrameSend>()?;

        let rx_requests = bus.rx::<RequestSend>()?;
        let rx_cancel = bus.rx::<RequestCancel>()?;
        let tx_events = bus.tx::<TabEvent>()?;

        let _run = Self::try_task(
            "run",
            Self::run(rx_frames, tx_frames, rx_requests, rx_cancel, tx_events),
        );

        Ok(Self { _frames, _run })
    }
}

impl ClientService {
    async fn run(
        mut rx_frames: impl Stream<Item = FrameRecv> + Unpin,
        mut tx_frames: impl Sink<Item = FrameSend> + Unpin,
        mut rx_requests: impl Stream<Item = RequestSend> + Unpin,
        mut rx_cancel: impl Stream<Item = RequestCancel> + Unpin,
        mut tx_events: impl Sink<Item = TabEvent> + Unpin,
    ) -> anyhow::Result<()> {
        let mut pending: HashMap<Uuid, oneshot::Sender<Response>> = HashMap::new();

        loop {
            select! {
                msg = rx_requests.recv() => match msg {
                    Some(RequestSend { request, reply }) => {
                        let id = request.id;
                        pending.insert(id, reply);

                        if tx_frames.send(FrameSend(Message::Request(request))).await.is_err() {
                            pending.remove(&id);
                            break;
                        }
                    }
                    None => break,
                },
                msg = rx_cancel.recv() => match msg {
                    Some(RequestCancel(id)) => {
                        pending.remove(&id);
                    }
                    None => break,
                },
                msg = rx_frames.recv() => match msg {
                    Some(FrameRecv(Message::Response(response))) => {
                        match pending.remove(&response.id) {
                            Some(mut reply) => {
                                reply.send(response).await.ok();
                            }
                            None => debug!("dropping response for unknown request {}", response.id),
                        }
                    }
                    Some(FrameRecv(Message::Event(event))) => {
                        tx_events.send(event).await.ok();
                    }
                    Some(FrameRecv(message)) => {
                        warn!("dropping unexpected frame from gateway: {:?}", message);
                    }
                    None => {
                        debug!("gateway connection closed");
                        break;
                    }
                },
            }
        }

        // dropping `pending` fails every outstanding request

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::TabsClient;
    use lifeline::assert_completes;
    use postage::stream::Stream;
    use std::time::Duration;
    use tabgate_api::message::{Message, Request, Response, TabEvent, Updated};
    use tabgate_api::tab::{TabDelta, TabId};
    use tabgate_wire::{read_frame, write_frame};
    use tokio::net::{UnixListener, UnixStream};

    async fn connect_pair() -> anyhow::Result<(TabsClient, UnixStream, tempfile::TempDir)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("gateway.sock");
        let listener = UnixListener::bind(&path)?;

        let (accepted, client) = tokio::join!(listener.accept(), TabsClient::connect(&path));
        let (server, _addr) = accepted?;

        Ok((client?, server, dir))
    }

    fn tab_id(id: u32) -> TabId {
        TabId::new(id).expect("nonzero id")
    }

    #[tokio::test]
    async fn request_resolves_with_matching_response() -> anyhow::Result<()> {
        let (client, mut server, _dir) = connect_pair().await?;

        let server_task = tokio::spawn(async move {
            let message = read_frame(&mut server).await.expect("read").expect("frame");
            let request = match message {
                Message::Request(request) => request,
                other => panic!("expected request, got {:?}", other),
            };
            write_frame(
                &mut server,
                &Message::Response(Response::success(request.id, None)),
            )
            .await
            .expect("write response");
            server
        });

        let response = client.request(Request::new("update")).await?;
        assert!(response.is_success());

        server_task.await?;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_requests_resolve_independently() -> anyhow::Result<()> {
        let (client, mut server, _dir) = connect_pair().await?;

        let server_task = tokio::spawn(async move {
            let first = match read_frame(&mut server).await.expect("read").expect("frame") {
                Message::Request(request) => request,
                other => panic!("expected request, got {:?}", other),
            };
            let second = match read_frame(&mut server).await.expect("read").expect("frame") {
                Message::Request(request) => request,
                other => panic!("expected request, got {:?}", other),
            };

            // answer in reverse order
            write_frame(
                &mut server,
                &Message::Response(Response::success(
                    second.id,
                    Some(serde_json::json!("second")),
                )),
            )
            .await
            .expect("write second");
            write_frame(
                &mut server,
                &Message::Response(Response::success(
                    first.id,
                    Some(serde_json::json!("first")),
                )),
            )
            .await
            .expect("write first");
            server
        });

        let (first, second) = tokio::join!(
            client.request(Request::new("goBack")),
            client.request(Request::new("goForward"))
        );

        assert_eq!(Some(serde_json::json!("first")), first?.info);
        assert_eq!(Some(serde_json::json!("second")), second?.info);

        server_task.await?;
        Ok(())
    }

    #[tokio::test]
    async fn timeout_reaps_the_pending_entry() -> anyhow::Result<()> {
        let (mut client, mut server, _dir) = connect_pair().await?;
        client.set_timeout(Duration::from_millis(50));

        let request = Request::new("update");
        let id = request.id;
        let result = client.request(request).await;
        assert!(matches!(result, Err(crate::client::ClientError::Timeout(_))));

        // a response racing the timeout is discarded cleanly
        let stale = read_frame(&mut server).await?.expect("request frame");
        assert!(matches!(stale, Message::Request(_)));
        write_frame(&mut server, &Message::Response(Response::success(id, None))).await?;

        // and the client still serves later requests
        let server_task = tokio::spawn(async move {
            let request = match read_frame(&mut server).await.expect("read").expect("frame") {
                Message::Request(request) => request,
                other => panic!("expected request, got {:?}", other),
            };
            write_frame(
                &mut server,
                &Message::Response(Response::success(request.id, None)),
            )
            .await
            .expect("write response");
        });

        client.set_timeout(Duration::from_secs(5));
        let response = client.request(Request::new("reload")).await?;
        assert!(response.is_success());

        server_task.await?;
        Ok(())
    }

    #[tokio::test]
    async fn closed_socket_fails_outstanding_requests() -> anyhow::Result<()> {
        let (client, server, _dir) = connect_pair().await?;

        drop(server);

        let result = client.request(Request::new("update")).await;
        assert!(matches!(result, Err(crate::client::ClientError::Closed)));

        Ok(())
    }

    #[tokio::test]
    async fn events_reach_the_subscriber() -> anyhow::Result<()> {
        let (client, mut server, _dir) = connect_pair().await?;
        let mut events = client.events()?;

        let event = TabEvent::Updated(Updated {
            tab_id: tab_id(1),
            delta: TabDelta {
                title: Some("New".into()),
                ..TabDelta::default()
            },
        });
        write_frame(&mut server, &Message::Event(event.clone())).await?;

        assert_completes!(async move {
            assert_eq!(Some(event), events.recv().await);
        });

        Ok(())
    }
}
