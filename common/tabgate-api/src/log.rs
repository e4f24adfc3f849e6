//! A global, configurable level filter.
//!
//! The gateway and client honor this level on startup.  The main executable
//! configures it if the `--log <level>` option is provided.
//!
//! get_level() returns None unless set_level has been called.
use std::sync::atomic::{AtomicU8, Ordering};

use log::LevelFilter;

// 0 = unset
static LOG_LEVEL: AtomicU8 = AtomicU8::new(0);

pub fn set_level(level: LevelFilter) {
    let byte_repr = discriminant_of(level);
    LOG_LEVEL.store(byte_repr, Ordering::SeqCst);
}

pub fn get_level() -> Option<LevelFilter> {
    level_of(LOG_LEVEL.load(Ordering::SeqCst))
}

fn discriminant_of(level: LevelFilter) -> u8 {
    match level {
        LevelFilter::Off => 1,
        LevelFilter::Error => 2,
        LevelFilter::Warn => 3,
        LevelFilter::Info => 4,
        LevelFilter::Debug => 5,
        LevelFilter::Trace => 6,
    }
}

fn level_of(byte_repr: u8) -> Option<LevelFilter> {
    match byte_repr {
        1 => Some(LevelFilter::Off),
        2 => Some(LevelFilter::Error),
        3 => Some(LevelFilter::Warn),
        4 => Some(LevelFilter::Info),
        5 => Some(LevelFilter::Debug),
        6 => Some(LevelFilter::Trace),
        _ => None,
    }
}
