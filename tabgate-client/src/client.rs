use crate::message::client::{RequestCancel, RequestSend};
use crate::prelude::*;
use crate::service::ClientService;
use anyhow::Context;
use lifeline::dyn_bus::DynBus;
use postage::{mpsc, oneshot};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tabgate_api::message::{method, Request, Response, TabEvent};
use tabgate_api::props::{
    CreateProperties, DuplicateProperties, MoveProperties, ReloadProperties, UpdateProperties,
};
use tabgate_api::tab::{Tab, TabId};
use tabgate_wire::resource::connection::FrameStreamResource;
use thiserror::Error;
use tokio::net::UnixStream;
use tokio::time;

/// How long a request waits for its response before failing with
/// [`ClientError::Timeout`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection to the gateway.  Requests are correlated by uuid, so calls
/// may overlap freely; events arrive on a separate bounded stream.
///
/// The client never fabricates a response: every request ends in exactly one
/// of a gateway response, [`ClientError::Timeout`], or [`ClientError::Closed`].
pub struct TabsClient {
    bus: ClientBus,
    tx_requests: mpsc::Sender<RequestSend>,
    tx_cancel: mpsc::Sender<RequestCancel>,
    timeout: Duration,
    _service: ClientService,
}

impl TabsClient {
    /// Connects to the gateway socket from [`tabgate_api::config::socket_path`].
    pub async fn connect_default() -> anyhow::Result<Self> {
        let path = tabgate_api::config::socket_path()?;
        Self::connect(&path).await
    }

    pub async fn connect(path: &Path) -> anyhow::Result<Self> {
        let stream = UnixStream::connect(path)
            .await
            .with_context(|| format!("unable to connect to gateway socket {}", path.display()))?;

        let bus = ClientBus::default();
        bus.capacity::<TabEvent>(128)?;
        bus.store_resource(FrameStreamResource(stream));

        let _service = ClientService::spawn(&bus)?;
        let tx_requests = bus.tx::<RequestSend>()?;
        let tx_cancel = bus.tx::<RequestCancel>()?;

        debug!("connected to gateway at {}", path.display());

        Ok(Self {
            bus,
            tx_requests,
            tx_cancel,
            timeout: REQUEST_TIMEOUT,
            _service,
        })
    }

    /// Overrides the default request deadline.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// The gateway's event stream, starting with events observed after this
    /// call.  The channel is bounded; an idle subscriber eventually applies
    /// backpressure to its own socket reader.
    pub fn events(&self) -> anyhow::Result<impl Stream<Item = TabEvent> + Unpin> {
        let rx = self.bus.rx::<TabEvent>()?;
        Ok(rx)
    }

    /// Sends one request and waits for the correlated response.  On timeout
    /// the pending entry is withdrawn, so a late response is discarded.
    pub async fn request(&self, request: Request) -> Result<Response, ClientError> {
        let id = request.id;
        let (reply, mut rx_reply) = oneshot::channel();

        let mut tx_requests = self.tx_requests.clone();
        tx_requests
            .send(RequestSend { request, reply })
            .await
            .map_err(|_| ClientError::Closed)?;

        match time::timeout(self.timeout, rx_reply.recv()).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(ClientError::Closed),
            Err(_elapsed) => {
                let mut tx_cancel = self.tx_cancel.clone();
                tx_cancel.send(RequestCancel(id)).await.ok();
                Err(ClientError::Timeout(self.timeout))
            }
        }
    }

    async fn checked(&self, request: Request) -> Result<Response, ClientError> {
        let response = self.request(request).await?;
        if !response.is_success() {
            return Err(ClientError::Rejected {
                status: response.status,
                info: response
                    .info
                    .map(|info| info.to_string())
                    .unwrap_or_default(),
            });
        }

        Ok(response)
    }

    /// The current open tabs.  Served by the gateway's mirror, without a
    /// browser round-trip.
    pub async fn list(&self) -> Result<Vec<Tab>, ClientError> {
        let response = self.checked(Request::new(method::LIST)).await?;
        let info = response.info.unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(serde_json::from_value(info)?)
    }

    pub async fn activate(&self, tab_id: TabId) -> Result<(), ClientError> {
        let props = UpdateProperties {
            active: Some(true),
            ..UpdateProperties::default()
        };
        self.update(tab_id, props).await
    }

    /// Creates a tab, and returns the id the browser assigned it.
    pub async fn create(&self, props: CreateProperties) -> Result<TabId, ClientError> {
        let request = Request::new(method::CREATE).with_props(serde_json::to_value(props)?);
        let response = self.checked(request).await?;
        let info = response.info.unwrap_or(Value::Null);
        Ok(serde_json::from_value(info)?)
    }

    pub async fn duplicate(
        &self,
        tab_id: TabId,
        props: DuplicateProperties,
    ) -> Result<TabId, ClientError> {
        let request =
            Request::with_tab(method::DUPLICATE, tab_id).with_props(serde_json::to_value(props)?);
        let response = self.checked(request).await?;
        let info = response.info.unwrap_or(Value::Null);
        Ok(serde_json::from_value(info)?)
    }

    pub async fn update(&self, tab_id: TabId, props: UpdateProperties) -> Result<(), ClientError> {
        let request =
            Request::with_tab(method::UPDATE, tab_id).with_props(serde_json::to_value(props)?);
        self.checked(request).await?;
        Ok(())
    }

    pub async fn move_tab(&self, tab_id: TabId, props: MoveProperties) -> Result<(), ClientError> {
        let request =
            Request::with_tab(method::MOVE, tab_id).with_props(serde_json::to_value(props)?);
        self.checked(request).await?;
        Ok(())
    }

    pub async fn reload(&self, tab_id: TabId, props: ReloadProperties) -> Result<(), ClientError> {
        let request =
            Request::with_tab(method::RELOAD, tab_id).with_props(serde_json::to_value(props)?);
        self.checked(request).await?;
        Ok(())
    }

    pub async fn close(&self, tab_ids: &[TabId]) -> Result<(), ClientError> {
        let request = Request::with_tabs(method::REMOVE, tab_ids.to_vec());
        self.checked(request).await?;
        Ok(())
    }

    pub async fn discard(&self, tab_ids: &[TabId]) -> Result<(), ClientError> {
        let request = Request::with_tabs(method::DISCARD, tab_ids.to_vec());
        self.checked(request).await?;
        Ok(())
    }

    pub async fn hide(&self, tab_ids: &[TabId]) -> Result<(), ClientError> {
        let request = Request::with_tabs(method::HIDE, tab_ids.to_vec());
        self.checked(request).await?;
        Ok(())
    }

    pub async fn show(&self, tab_ids: &[TabId]) -> Result<(), ClientError> {
        let request = Request::with_tabs(method::SHOW, tab_ids.to_vec());
        self.checked(request).await?;
        Ok(())
    }

    pub async fn toggle_reader_mode(&self, tab_id: TabId) -> Result<(), ClientError> {
        self.checked(Request::with_tab(method::TOGGLE_READER_MODE, tab_id))
            .await?;
        Ok(())
    }

    pub async fn go_back(&self, tab_id: TabId) -> Result<(), ClientError> {
        self.checked(Request::with_tab(method::GO_BACK, tab_id))
            .await?;
        Ok(())
    }

    pub async fn go_forward(&self, tab_id: TabId) -> Result<(), ClientError> {
        self.checked(Request::with_tab(method::GO_FORWARD, tab_id))
            .await?;
        Ok(())
    }

    /// Registers interest in an event by name.  The gateway currently
    /// broadcasts every event to every socket, so this is advisory; clients
    /// wanting a subset filter their [`TabsClient::events`] stream locally.
    pub async fn subscribe(&self, event: &str) -> Result<(), ClientError> {
        let request = Request::new(method::SUBSCRIBE).with_props(Value::String(event.to_string()));
        self.checked(request).await?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("gateway connection closed")]
    Closed,
    #[error("gateway responded {status}: {info}")]
    Rejected { status: String, info: String },
    #[error("malformed response payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}
