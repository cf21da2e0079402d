//! Request/response sessions with a camera module.
//!
//! A [`Session`] owns its transport exclusively, so at most one command is
//! ever in flight. It decides when a response is complete (expected length
//! or a silence gap) and drives whole file transfers through the
//! [`PackageAssembler`](camlink_frame::PackageAssembler).

pub mod error;
pub mod session;
pub mod transfer;

pub use error::{Result, SessionError};
pub use session::{Session, SessionConfig};
pub use transfer::{FileTransfer, NextFileRequest, TransferState};
