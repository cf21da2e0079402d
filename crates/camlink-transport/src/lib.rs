//! Byte transports for talking to a camera module.
//!
//! The frame layer never touches a port. It hands complete frames to a
//! [`Transport`] and gets raw byte buffers back:
//! - [`SerialTransport`] drives a UART through the `serialport` crate.
//! - [`LoopbackTransport`] replays scripted responses for tests and
//!   simulators.

pub mod error;
pub mod loopback;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use loopback::LoopbackTransport;
pub use serial::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE, DEFAULT_LINE_TERMINATOR};
pub use traits::Transport;
