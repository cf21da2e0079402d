//! Wire constants and closed enumerations shared by every frame kind.
//!
//! All constants live in one immutable [`ProtocolDefinition`] value,
//! [`PROTOCOL`], which components borrow rather than copy around.

use crate::error::{FrameError, Result};

/// Start-of-frame byte.
pub const HEADER: u8 = 0x55;

/// Terminates every command and acknowledgement frame.
pub const END_MARK: u8 = 0x23;

/// Largest package data field a single data frame may carry.
pub const MAX_PACKAGE_DATA_SIZE: usize = 1024;

/// Specifier the module answers with when it did not understand a command.
pub const REJECTED_SPECIFIER: u8 = 0x63;

/// Literal positive acknowledgement.
pub const ACK_FRAME: [u8; 5] = [HEADER, 0x4D, 0x00, 0x83, END_MARK];

/// Literal negative acknowledgement.
pub const NACK_FRAME: [u8; 5] = [HEADER, 0x4D, 0x00, 0x84, END_MARK];

/// Command specifier bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specifiers {
    pub list_files: u8,
    pub get_next_file: u8,
    pub get_spec_file: u8,
    pub send_spec_file: u8,
    pub baudrate: u8,
    pub osd: u8,
    pub rtc: u8,
}

/// The complete, immutable description of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolDefinition {
    pub header: u8,
    pub end_mark: u8,
    pub specifiers: Specifiers,
    pub max_package_data: usize,
}

/// The protocol spoken by the camera module.
pub const PROTOCOL: ProtocolDefinition = ProtocolDefinition {
    header: HEADER,
    end_mark: END_MARK,
    specifiers: Specifiers {
        list_files: 0x4C,
        get_next_file: 0x4D,
        get_spec_file: 0x45,
        send_spec_file: 0x46,
        baudrate: 0x49,
        osd: 0x4F,
        rtc: 0x54,
    },
    max_package_data: MAX_PACKAGE_DATA_SIZE,
};

impl ProtocolDefinition {
    /// Returns a human-readable name for a command specifier.
    pub fn specifier_name(&self, specifier: u8) -> &'static str {
        let s = &self.specifiers;
        match specifier {
            x if x == s.list_files => "LIST_FILES",
            x if x == s.get_next_file => "GET_NEXT_FILE",
            x if x == s.get_spec_file => "GET_SPEC_FILE",
            x if x == s.send_spec_file => "SEND_SPEC_FILE",
            x if x == s.baudrate => "BAUDRATE",
            x if x == s.osd => "OSD",
            x if x == s.rtc => "RTC",
            REJECTED_SPECIFIER => "REJECTED",
            _ => "UNKNOWN",
        }
    }
}

/// Chunk size the camera uses when splitting a file into packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PackageSize {
    Small = 0,
    Medium = 1,
    Large = 2,
}

impl PackageSize {
    /// Wire code sent in the GetNextFile command.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Chunk length in bytes.
    pub fn bytes(self) -> usize {
        match self {
            PackageSize::Small => 512,
            PackageSize::Medium => 1024,
            PackageSize::Large => 2048,
        }
    }
}

impl TryFrom<u8> for PackageSize {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(PackageSize::Small),
            1 => Ok(PackageSize::Medium),
            2 => Ok(PackageSize::Large),
            other => Err(FrameError::out_of_range("package_size", other)),
        }
    }
}

/// Where the on-screen-display text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OsdPosition {
    Top = 0x54,
    Bottom = 0x42,
}

impl OsdPosition {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for OsdPosition {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x54 => Ok(OsdPosition::Top),
            0x42 => Ok(OsdPosition::Bottom),
            other => Err(FrameError::out_of_range("position", other)),
        }
    }
}

/// Link speeds the module can be switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BaudRate {
    B9600 = 0x30,
    B19200 = 0x31,
    B38400 = 0x32,
    B57600 = 0x33,
    #[default]
    B115200 = 0x34,
}

impl BaudRate {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
        }
    }

    /// Looks up the rate matching a numeric speed.
    pub fn from_bits_per_second(bps: u32) -> Result<Self> {
        match bps {
            9_600 => Ok(BaudRate::B9600),
            19_200 => Ok(BaudRate::B19200),
            38_400 => Ok(BaudRate::B38400),
            57_600 => Ok(BaudRate::B57600),
            115_200 => Ok(BaudRate::B115200),
            other => Err(FrameError::out_of_range("baud_rate", other)),
        }
    }
}

impl TryFrom<u8> for BaudRate {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x30 => Ok(BaudRate::B9600),
            0x31 => Ok(BaudRate::B19200),
            0x32 => Ok(BaudRate::B38400),
            0x33 => Ok(BaudRate::B57600),
            0x34 => Ok(BaudRate::B115200),
            other => Err(FrameError::out_of_range("baud_rate", other)),
        }
    }
}
