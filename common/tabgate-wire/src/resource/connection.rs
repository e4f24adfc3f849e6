use lifeline::impl_storage_take;
use tokio::net::UnixStream;

#[derive(Debug)]
pub struct FrameStreamResource(pub UnixStream);

impl_storage_take!(FrameStreamResource);
