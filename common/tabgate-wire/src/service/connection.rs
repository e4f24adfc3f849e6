use crate::bus::FrameConnectionBus;
use crate::message::connection::{FrameRecv, FrameSend};
use crate::resource::connection::FrameStreamResource;
use crate::{read_frame, write_frame};
use lifeline::{Bus, Lifeline, Service, Task};
use log::{debug, error, warn};
use postage::{sink::Sink, stream::Stream};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

/// Drives one framed socket: a reader task that decodes inbound frames onto
/// the bus, and a writer task that drains the outbound channel.  Decode
/// failures poison a single frame; EOF or an I/O error ends the stream.
#[derive(Debug)]
pub struct FrameConnectionService {
    _read: Lifeline,
    _write: Lifeline,
}

impl Service for FrameConnectionService {
    type Bus = FrameConnectionBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let stream = bus.resource::<FrameStreamResource>()?;
        let (read_half, write_half) = stream.0.into_split();

        let tx = bus.tx::<FrameRecv>()?;
        let _read = Self::try_task("read", Self::read_frames(read_half, tx));

        let rx = bus.rx::<FrameSend>()?;
        let _write = Self::try_task("write", Self::write_frames(write_half, rx));

        Ok(Self { _read, _write })
    }
}

impl FrameConnectionService {
    async fn read_frames(
        mut read_half: OwnedReadHalf,
        mut tx: impl Sink<Item = FrameRecv> + Unpin,
    ) -> anyhow::Result<()> {
        loop {
            match read_frame(&mut read_half).await {
                Ok(Some(message)) => {
                    if tx.send(FrameRecv(message)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("socket closed by peer");
                    break;
                }
                Err(err) if err.is_decode() => {
                    warn!("dropping undecodable frame: {}", err);
                }
                Err(err) => {
                    error!("socket read error: {}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn write_frames(
        mut write_half: OwnedWriteHalf,
        mut rx: impl Stream<Item = FrameSend> + Unpin,
    ) -> anyhow::Result<()> {
        while let Some(FrameSend(message)) = rx.recv().await {
            if let Err(err) = write_frame(&mut write_half, &message).await {
                error!("socket write error: {}", err);
                break;
            }
        }

        Ok(())
    }
}
