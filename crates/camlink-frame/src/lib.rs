//! Frame protocol layer for serial-attached camera modules.
//!
//! Every message starts with the `0x55` header, a command specifier and a
//! camera id:
//! - Command and acknowledgement frames end with the `0x23` end mark.
//! - Data-transfer frames end with a 2-byte big-endian byte-sum checksum.
//!
//! Nothing in this crate performs I/O. Builders validate before emitting
//! bytes, parsers validate before returning values.

pub mod ack;
pub mod assembler;
pub mod codec;
pub mod command;
pub mod error;
pub mod protocol;

pub use ack::{parse_ack, parse_fixed_ack, Ack, AckKind, AckShape, AckStatus};
pub use assembler::{parse_package, Package, PackageAssembler, PackageLayout, SizeField};
pub use codec::{
    checksum, construct_data_frame, parse_data_frame, verify_checksum, DataFrame, Frame,
    DATA_FRAME_OVERHEAD, MIN_DATA_FRAME_SIZE,
};
pub use command::{Command, MAX_LIST_PACKAGE_SIZE, MAX_OSD_TEXT_LEN};
pub use error::{FrameError, Result};
pub use protocol::{
    BaudRate, OsdPosition, PackageSize, ProtocolDefinition, ACK_FRAME, END_MARK, HEADER,
    MAX_PACKAGE_DATA_SIZE, NACK_FRAME, PROTOCOL, REJECTED_SPECIFIER,
};
