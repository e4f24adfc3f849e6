use crate::{
    message::connection::{FrameRecv, FrameSend},
    resource::connection::FrameStreamResource,
};
use lifeline::{lifeline_bus, Message, Resource};
use postage::mpsc;

lifeline_bus!(pub struct FrameConnectionBus);

impl Message<FrameConnectionBus> for FrameRecv {
    type Channel = mpsc::Sender<Self>;
}

impl Message<FrameConnectionBus> for FrameSend {
    type Channel = mpsc::Sender<Self>;
}

impl Resource<FrameConnectionBus> for FrameStreamResource {}
