use std::fmt;

use bytes::Bytes;
use camlink_frame::PackageSize;

/// Where a file transfer currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    AwaitingNextFileAck,
    RequestingPackage { number: u8, total: u8 },
    Complete,
    Failed,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferState::Idle => write!(f, "idle"),
            TransferState::AwaitingNextFileAck => write!(f, "awaiting next-file ack"),
            TransferState::RequestingPackage { number, total } => {
                write!(f, "requesting package {number}/{total}")
            }
            TransferState::Complete => write!(f, "complete"),
            TransferState::Failed => write!(f, "failed"),
        }
    }
}

/// Timestamp and chunk size for a GetNextFile request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextFileRequest {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub package_size: PackageSize,
}

/// A file pulled off the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransfer {
    pub camera_id: u8,
    /// Hour of the file the packages were requested for.
    pub hour: u8,
    pub minute: u8,
    pub total_packages: u8,
    pub data: Bytes,
}
