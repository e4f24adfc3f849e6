use lifeline::impl_storage_take;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};

/// The browser channel: whatever byte streams the browser spawned us with.
/// Stdio in gateway mode; in-memory pipes in tests.
pub struct BrowserIo {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
}

impl BrowserIo {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }

    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

pub struct BrowserIoResource(pub BrowserIo);

impl_storage_take!(BrowserIoResource);

impl fmt::Debug for BrowserIoResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BrowserIoResource")
    }
}
