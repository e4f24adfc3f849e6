//! `tabgate`, a native-messaging gateway that mirrors browser tabs to local
//! clients over a Unix socket.
//!
//! The browser's native-messaging manifest launches `tabgate --_launch
//! gateway`; every other invocation is a client of the running gateway.

mod cli;

use cli::init;
use log::LevelFilter;
use std::str::FromStr;

pub fn main() -> anyhow::Result<()> {
    let args = init();

    // create the dotdir path, so the modules don't need to worry about it.
    tabgate_api::config::mkdir()?;

    if let Some(level) = args.value_of("LOG") {
        if let Ok(level) = LevelFilter::from_str(level) {
            tabgate_api::log::set_level(level);
        }
    }

    if let Some(launch) = args.value_of("LAUNCH") {
        match launch {
            "gateway" => tabgate_gateway::gateway_main(),
            _ => panic!("unsupported --_launch value"),
        }
    } else {
        tabgate_client::client_main(args)
    }
}
