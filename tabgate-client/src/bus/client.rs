use crate::message::client::{RequestCancel, RequestSend};
use lifeline::{lifeline_bus, Message, Resource};
use postage::{broadcast, mpsc};
use tabgate_api::message::TabEvent;
use tabgate_wire::resource::connection::FrameStreamResource;

lifeline_bus!(pub struct ClientBus);

impl Message<ClientBus> for RequestSend {
    type Channel = mpsc::Sender<Self>;
}

impl Message<ClientBus> for RequestCancel {
    type Channel = mpsc::Sender<Self>;
}

impl Message<ClientBus> for TabEvent {
    type Channel = broadcast::Sender<Self>;
}

impl Resource<ClientBus> for FrameStreamResource {}
