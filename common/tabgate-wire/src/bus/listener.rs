use crate::{
    message::listener::FrameConnectionMessage, resource::listener::FrameListenerResource,
};
use lifeline::{lifeline_bus, Message, Resource};
use postage::mpsc;

lifeline_bus!(pub struct FrameListenerBus);

impl Message<FrameListenerBus> for FrameConnectionMessage {
    type Channel = mpsc::Sender<Self>;
}

impl Resource<FrameListenerBus> for FrameListenerResource {}
