//! Process lifecycle helpers.
//!
//! The gateway is spawned by the browser (its native-messaging manifest
//! points at `tabgate --_launch gateway`), so there is no launcher here; the
//! socket path in [`crate::config`] is the rendezvous for clients.

use postage::stream::Stream;
use tokio::{select, signal::ctrl_c};

/// Waits for either a ctrl-c signal, or a message on the given channel.
///
/// Useful in main() functions.
pub async fn wait_for_shutdown<T: Default>(mut receiver: impl Stream<Item = T> + Unpin) -> T {
    select! {
        _ = ctrl_c() => T::default(),
        msg = receiver.recv() => msg.unwrap_or_default(),
    }
}
