//! Host-side protocol stack for serial-attached camera modules.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte pipes to the module (serial port, in-memory loopback)
//! - [`frame`]: command, acknowledgement and data-package frames
//! - [`session`]: request/response pacing and whole-file transfers

/// Re-export transport types.
pub mod transport {
    pub use camlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use camlink_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use camlink_session::*;
}
