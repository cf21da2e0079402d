use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::protocol::PROTOCOL;

/// Header (1) + specifier (1) + camera id (1).
pub const PREFIX_SIZE: usize = 3;

/// Trailing checksum width on data-transfer frames.
pub const CHECKSUM_SIZE: usize = 2;

/// Smallest buffer `parse_data_frame` will look at.
pub const MIN_DATA_FRAME_SIZE: usize = 8;

/// Fixed bytes around the payload of a data frame:
/// prefix (3) + package number (2) + package size (2) + checksum (2).
pub const DATA_FRAME_OVERHEAD: usize = PREFIX_SIZE + 2 + 2 + CHECKSUM_SIZE;

/// One complete, immutable protocol message as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    pub(crate) fn from_bytes(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Command specifier byte.
    pub fn specifier(&self) -> u8 {
        self.bytes[1]
    }

    /// Target camera id.
    pub fn camera_id(&self) -> u8 {
        self.bytes[2]
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// A parsed data-transfer frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    pub header: u8,
    pub command_specifier: u8,
    pub camera_id: u8,
    pub package_number: u16,
    pub package_size: u16,
    pub package_data: Bytes,
}

/// Sum of every byte, truncated to 16 bits.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

/// Compare a computed checksum against a big-endian 2-byte trailer.
pub fn verify_checksum(computed: u16, trailer: [u8; 2]) -> Result<()> {
    let received = u16::from_be_bytes(trailer);
    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }
    Ok(())
}

/// Build a data-transfer frame.
///
/// Wire format:
/// ```text
/// ┌────────┬───────────┬────────┬──────────┬──────────┬──────────┬──────────┐
/// │ 0x55   │ Specifier │ Camera │ Pkg no.  │ Pkg size │ Data     │ Checksum │
/// │ (1B)   │ (1B)      │ (1B)   │ (2B BE)  │ (2B BE)  │ (≤1024B) │ (2B BE)  │
/// └────────┴───────────┴────────┴──────────┴──────────┴──────────┴──────────┘
/// ```
///
/// The checksum covers every byte before it.
pub fn construct_data_frame(
    command_specifier: u8,
    camera_id: u8,
    package_number: u16,
    package_data: &[u8],
) -> Result<Frame> {
    if package_data.len() > PROTOCOL.max_package_data {
        return Err(FrameError::PayloadTooLarge {
            size: package_data.len(),
            max: PROTOCOL.max_package_data,
        });
    }

    let mut dst = BytesMut::with_capacity(DATA_FRAME_OVERHEAD + package_data.len());
    dst.put_u8(PROTOCOL.header);
    dst.put_u8(command_specifier);
    dst.put_u8(camera_id);
    dst.put_u16(package_number);
    dst.put_u16(package_data.len() as u16);
    dst.put_slice(package_data);
    let sum = checksum(&dst);
    dst.put_u16(sum);

    Ok(Frame::from_bytes(dst.freeze()))
}

/// Parse and validate a data-transfer frame.
///
/// Checks run in order: minimum length, checksum, header, declared size.
pub fn parse_data_frame(bytes: &[u8]) -> Result<DataFrame> {
    let len = bytes.len();
    if len < MIN_DATA_FRAME_SIZE {
        return Err(FrameError::FrameTooShort {
            len,
            min: MIN_DATA_FRAME_SIZE,
        });
    }

    let (body, trailer) = bytes.split_at(len - CHECKSUM_SIZE);
    verify_checksum(checksum(body), [trailer[0], trailer[1]])?;

    if body[0] != PROTOCOL.header {
        return Err(FrameError::InvalidFrameFormat("bad header byte"));
    }

    // An 8-byte frame passes the length gate but its size field runs into
    // the checksum.
    let Some(actual) = len.checked_sub(DATA_FRAME_OVERHEAD) else {
        return Err(FrameError::FrameTooShort {
            len,
            min: DATA_FRAME_OVERHEAD,
        });
    };

    let package_number = u16::from_be_bytes([body[3], body[4]]);
    let package_size = u16::from_be_bytes([body[5], body[6]]);
    if usize::from(package_size) != actual {
        return Err(FrameError::PackageSizeMismatch {
            declared: usize::from(package_size),
            actual,
        });
    }

    Ok(DataFrame {
        header: body[0],
        command_specifier: body[1],
        camera_id: body[2],
        package_number,
        package_size,
        package_data: Bytes::copy_from_slice(&body[7..]),
    })
}
