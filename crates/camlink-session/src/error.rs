use std::time::Duration;

/// Errors that can occur during a session with the camera.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] camlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] camlink_frame::FrameError),

    /// No response arrived in time.
    #[error("no response after {0:?}")]
    Timeout(Duration),

    /// The module answered with the literal NACK frame.
    #[error("command {specifier:#04x} was not acknowledged")]
    Nack { specifier: u8 },

    /// The module did not recognise or could not serve the command.
    #[error("command {specifier:#04x} rejected by camera")]
    Rejected { specifier: u8 },

    /// The command has no acknowledgement to wait for.
    #[error("command {specifier:#04x} has no acknowledgement")]
    NoAcknowledgement { specifier: u8 },

    /// The module found no file near the requested time.
    #[error("no file found for the requested time")]
    NoFile,
}

pub type Result<T> = std::result::Result<T, SessionError>;
