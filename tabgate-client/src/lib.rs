//! The tabgate client library: a correlated request/response channel to the
//! gateway, plus the broadcast tab event stream.  Also hosts the `tabgate`
//! binary's client modes.

use clap::ArgMatches;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::time::Duration;
use tabgate_api::log::get_level;
use tokio::select;
use tokio::signal::ctrl_c;

use crate::prelude::*;

pub mod bus;
pub mod client;
pub mod message;
mod prelude;
pub mod service;

pub use client::{ClientError, TabsClient, REQUEST_TIMEOUT};

pub fn client_main(args: ArgMatches) -> anyhow::Result<()> {
    TermLogger::init(
        get_level().unwrap_or(LevelFilter::Warn),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .unwrap();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap();

    let result = runtime.block_on(async { main_async(args).await });

    runtime.shutdown_timeout(Duration::from_millis(25));

    result?;

    Ok(())
}

async fn main_async(matches: ArgMatches<'_>) -> anyhow::Result<()> {
    let client = TabsClient::connect_default().await?;

    if matches.is_present("LIST") {
        let mut tabs = client.list().await?;
        tabs.sort_by_key(|tab| (tab.window_id, tab.index));

        for tab in tabs {
            println!("{}\t{}\t{}", tab.id, tab.title, tab.url);
        }

        return Ok(());
    }

    // default: follow the event stream until ctrl-c
    let mut events = client.events()?;
    loop {
        select! {
            _ = ctrl_c() => break,
            event = events.recv() => match event {
                Some(event) => println!("{}", serde_json::to_string(&event)?),
                None => {
                    info!("gateway connection closed");
                    break;
                }
            }
        }
    }

    Ok(())
}
