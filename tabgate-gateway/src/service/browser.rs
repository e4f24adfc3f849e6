use crate::message::gateway::{BrowserRecv, BrowserSend, GatewayShutdown};
use crate::prelude::*;
use crate::resource::BrowserIoResource;
use anyhow::Context;
use lifeline::dyn_bus::DynBus;
use tabgate_wire::{read_frame, write_frame};
use tokio::io::{AsyncRead, AsyncWrite};

/// Owns the browser channel.  One task reads framed messages from the
/// browser into the dispatcher; one task is the channel's sole writer.
/// EOF from the browser terminates the gateway.
pub struct BrowserService {
    _read: Lifeline,
    _write: Lifeline,
}

impl Service for BrowserService {
    type Bus = GatewayBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let io = bus.resource::<BrowserIoResource>()?;

        let tx = bus.tx::<BrowserRecv>()?;
        let tx_shutdown = bus.tx::<GatewayShutdown>()?;
        let _read = Self::try_task("read", Self::read_browser(io.0.reader, tx, tx_shutdown));

        let rx = bus.rx::<BrowserSend>()?;
        let _write = Self::try_task("write", Self::write_browser(io.0.writer, rx));

        Ok(Self { _read, _write })
    }
}

impl BrowserService {
    async fn read_browser(
        mut reader: impl AsyncRead + Unpin,
        mut tx: impl Sink<Item = BrowserRecv> + Unpin,
        mut tx_shutdown: impl Sink<Item = GatewayShutdown> + Unpin,
    ) -> anyhow::Result<()> {
        loop {
            match read_frame(&mut reader).await {
                Ok(Some(message)) => {
                    if tx.send(BrowserRecv(message)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    info!("EOF from browser, shutting down");
                    break;
                }
                Err(err) if err.is_decode() => {
                    warn!("dropping undecodable frame from browser: {}", err);
                }
                Err(err) => {
                    error!("browser read error: {}", err);
                    break;
                }
            }
        }

        tx_shutdown.send(GatewayShutdown {}).await.ok();

        Ok(())
    }

    async fn write_browser(
        mut writer: impl AsyncWrite + Unpin,
        mut rx: impl Stream<Item = BrowserSend> + Unpin,
    ) -> anyhow::Result<()> {
        while let Some(BrowserSend(message)) = rx.recv().await {
            write_frame(&mut writer, &message)
                .await
                .context("write to browser stdout")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BrowserService;
    use crate::bus::GatewayBus;
    use crate::message::gateway::{BrowserRecv, BrowserSend, GatewayShutdown};
    use crate::resource::{BrowserIo, BrowserIoResource};
    use lifeline::{assert_completes, dyn_bus::DynBus, Bus, Service};
    use postage::{sink::Sink, stream::Stream};
    use tabgate_api::message::{method, Message, Request};
    use tabgate_wire::{read_frame, write_frame};

    fn spawn_with_io() -> anyhow::Result<(
        GatewayBus,
        BrowserService,
        tokio::io::DuplexStream,
        tokio::io::DuplexStream,
    )> {
        let (gateway_read, browser_write) = tokio::io::duplex(4096);
        let (gateway_write, browser_read) = tokio::io::duplex(4096);

        let bus = GatewayBus::default();
        bus.store_resource(BrowserIoResource(BrowserIo::new(gateway_read, gateway_write)));
        let service = BrowserService::spawn(&bus)?;

        Ok((bus, service, browser_read, browser_write))
    }

    #[tokio::test]
    async fn frames_from_browser_reach_the_bus() -> anyhow::Result<()> {
        let (bus, _service, _browser_read, mut browser_write) = spawn_with_io()?;
        let mut rx = bus.rx::<BrowserRecv>()?;

        let message = Message::Request(Request::new(method::LIST));
        write_frame(&mut browser_write, &message).await?;

        assert_completes!(async move {
            assert_eq!(Some(BrowserRecv(message)), rx.recv().await);
        });

        Ok(())
    }

    #[tokio::test]
    async fn outbound_frames_reach_the_browser() -> anyhow::Result<()> {
        let (bus, _service, mut browser_read, _browser_write) = spawn_with_io()?;
        let mut tx = bus.tx::<BrowserSend>()?;

        let message = Message::Request(Request::new(method::LIST));
        tx.send(BrowserSend(message.clone())).await?;

        assert_completes!(async move {
            assert_eq!(
                Some(message),
                read_frame(&mut browser_read).await.expect("read")
            );
        });

        Ok(())
    }

    #[tokio::test]
    async fn browser_eof_triggers_shutdown() -> anyhow::Result<()> {
        let (bus, _service, _browser_read, browser_write) = spawn_with_io()?;
        let mut rx_shutdown = bus.rx::<GatewayShutdown>()?;

        drop(browser_write);

        assert_completes!(async move {
            assert!(rx_shutdown.recv().await.is_some());
        });

        Ok(())
    }
}
