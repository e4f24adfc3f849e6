use tabgate_api::message::Message;

/// A frame read from the browser channel (the gateway's stdin).
///
/// Usage:
/// - Tx from BrowserService, in the order frames were read.
/// - Rx into DispatcherService, the only consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserRecv(pub Message);

/// A frame queued for the browser channel (the gateway's stdout).
///
/// Usage:
/// - Tx from DispatcherService, for forwarded client requests.
/// - Rx into BrowserService, the sole stdout writer.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSend(pub Message);

/// Announced once the tab store has been seeded from the browser's initial
/// tab list.  Client connections are not accepted before this.
#[derive(Debug, Clone)]
pub struct GatewayReady {
    pub tabs: usize,
}

/// Terminates the gateway.  Sent on browser EOF; there is no graceful drain.
#[derive(Debug, Clone, Default)]
pub struct GatewayShutdown {}
