use crate::bus::FrameConnectionBus;
use crate::service::FrameConnectionService;

/// An accepted socket: its connection bus, and the service driving it.
#[derive(Debug)]
pub struct FrameConnectionMessage {
    pub bus: FrameConnectionBus,
    pub lifeline: FrameConnectionService,
}
