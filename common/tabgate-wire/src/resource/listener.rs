use lifeline::impl_storage_take;
use tokio::net::UnixListener;

#[derive(Debug)]
pub struct FrameListenerResource(pub UnixListener);

impl_storage_take!(FrameListenerResource);
