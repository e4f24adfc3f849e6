use crate::message::connection::ConnectionRecv;
use crate::message::gateway::{BrowserRecv, BrowserSend, GatewayReady, GatewayShutdown};
use crate::resource::BrowserIoResource;
use lifeline::{lifeline_bus, Message, Resource};
use postage::{mpsc, oneshot};
use tabgate_api::config::GatewayConfig;
use tabgate_wire::resource::listener::FrameListenerResource;

lifeline_bus!(pub struct GatewayBus);

impl Message<GatewayBus> for BrowserRecv {
    type Channel = mpsc::Sender<Self>;
}

impl Message<GatewayBus> for BrowserSend {
    type Channel = mpsc::Sender<Self>;
}

impl Message<GatewayBus> for ConnectionRecv {
    type Channel = mpsc::Sender<Self>;
}

impl Message<GatewayBus> for GatewayReady {
    type Channel = oneshot::Sender<Self>;
}

impl Message<GatewayBus> for GatewayShutdown {
    type Channel = mpsc::Sender<Self>;
}

impl Resource<GatewayBus> for BrowserIoResource {}
impl Resource<GatewayBus> for FrameListenerResource {}
impl Resource<GatewayBus> for GatewayConfig {}
