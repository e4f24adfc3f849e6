//! The tabgate broker.  Spawned by the browser over native messaging, it
//! mirrors the tab inventory, answers `list` locally, forwards every other
//! request to the browser by uuid, and fans events out to every client
//! connected on the Unix socket.

use crate::message::connection::ConnectionRecv;
use crate::message::gateway::{BrowserRecv, BrowserSend, GatewayReady, GatewayShutdown};
use crate::prelude::*;
use crate::resource::{BrowserIo, BrowserIoResource};
use crate::service::{BrowserService, DispatcherService, ListenerService};
use anyhow::Context;
use lifeline::dyn_bus::DynBus;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use std::time::Duration;
use tabgate_api::config::{self, GatewayConfig};
use tabgate_api::launch::wait_for_shutdown;
use tabgate_api::log::get_level;
use tabgate_wire::resource::listener::FrameListenerResource;
use tokio::net::UnixListener;
use tokio::select;

pub mod bus;
pub mod message;
mod prelude;
pub mod resource;
pub mod service;
pub mod state;

pub fn gateway_main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap();

    let result = runtime.block_on(async { main_async().await });

    runtime.shutdown_timeout(Duration::from_millis(25));

    result?;

    Ok(())
}

async fn main_async() -> anyhow::Result<()> {
    let log_file = config::gateway_log()?;

    let level = get_level().unwrap_or(LevelFilter::Info);
    CombinedLogger::init(vec![
        // stdout belongs to the browser channel; the terminal logger stays
        // on stderr
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Never,
        ),
        WriteLogger::new(
            level,
            simplelog::Config::default(),
            std::fs::File::create(log_file)?,
        ),
    ])
    .unwrap();

    log_panics::init();

    let config = GatewayConfig {
        pid: std::process::id(),
        socket_path: config::socket_path()?,
    };

    info!("gateway started");
    info!("gateway pid: {}", config.pid);
    info!("gateway socket: {}", config.socket_path.display());

    let bus = new_bus(BrowserIo::stdio(), config)?;
    run_gateway(bus).await?;

    info!("gateway shutdown.");

    Ok(())
}

pub fn new_bus(io: BrowserIo, config: GatewayConfig) -> anyhow::Result<GatewayBus> {
    let bus = GatewayBus::default();
    bus.capacity::<BrowserRecv>(128)?;
    bus.capacity::<BrowserSend>(128)?;
    bus.capacity::<ConnectionRecv>(128)?;
    bus.store_resource::<BrowserIoResource>(BrowserIoResource(io));
    bus.store_resource::<GatewayConfig>(config);

    Ok(bus)
}

/// Runs the gateway to completion: browser + dispatcher first, then (once
/// the tab store is seeded) the socket listener.  Returns when the browser
/// channel closes; startup failures are errors.
pub async fn run_gateway(bus: GatewayBus) -> anyhow::Result<()> {
    let config = bus.resource::<GatewayConfig>()?;

    let _browser = BrowserService::spawn(&bus)?;
    let _dispatcher = DispatcherService::spawn(&bus)?;

    let mut rx_ready = bus.rx::<GatewayReady>()?;
    let mut rx_shutdown = bus.rx::<GatewayShutdown>()?;

    let ready = select! {
        ready = rx_ready.recv() => ready,
        _ = rx_shutdown.recv() => return Ok(()),
    };
    let ready = ready
        .ok_or_else(|| anyhow::Error::msg("gateway startup failed: no initial tab list"))?;
    info!("tab store seeded with {} tabs", ready.tabs);

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path).with_context(|| {
            format!("unable to remove stale socket {}", config.socket_path.display())
        })?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .with_context(|| format!("unable to bind {}", config.socket_path.display()))?;
    bus.store_resource::<FrameListenerResource>(FrameListenerResource(listener));

    let _listener = ListenerService::spawn(&bus)?;

    wait_for_shutdown(rx_shutdown).await;

    Ok(())
}
