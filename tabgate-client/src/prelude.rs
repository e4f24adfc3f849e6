pub use crate::bus::*;
pub use lifeline::{Bus, Lifeline, Service, Task};
pub use log::{debug, error, info, trace, warn};
pub use postage::sink::Sink;
pub use postage::stream::Stream;
