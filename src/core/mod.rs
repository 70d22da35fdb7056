//! Ambient pieces shared by the queue and its sinks: errors, clocks and
//! configuration.

pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, QuantaClock, SystemClock};
pub use config::{FailurePolicy, QueueConfig};
pub use error::{Error, Result};
