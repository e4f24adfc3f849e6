use postage::oneshot;
use std::fmt;
use tabgate_api::message::{Request, Response};
use uuid::Uuid;

/// A request submitted to the correlation task, with the single-shot sink
/// that receives the matching response.  The sink fires at most once.
pub struct RequestSend {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

impl fmt::Debug for RequestSend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSend")
            .field("request", &self.request)
            .finish()
    }
}

/// Withdraws a pending request whose deadline has elapsed.  A response
/// racing the cancellation is discarded cleanly on arrival.
#[derive(Debug, Clone)]
pub struct RequestCancel(pub Uuid);
