//! Host-to-camera command frames.
//!
//! Every command shares one layout:
//!
//! ```text
//! ┌──────┬───────────┬───────────┬──────────────────┬──────┐
//! │ 0x55 │ Specifier │ Camera id │ Command content  │ 0x23 │
//! └──────┴───────────┴───────────┴──────────────────┴──────┘
//! ```
//!
//! Fields are validated before a single byte is written, so a failed
//! encode never leaves a partial frame behind.

use bytes::{BufMut, Bytes, BytesMut};

use crate::ack::AckKind;
use crate::codec::{Frame, PREFIX_SIZE};
use crate::error::{FrameError, Result};
use crate::protocol::{BaudRate, OsdPosition, PackageSize, PROTOCOL};

/// Largest package size a ListFiles request may ask for.
pub const MAX_LIST_PACKAGE_SIZE: u16 = 1024;

/// Longest OSD text the one-byte length field can describe.
pub const MAX_OSD_TEXT_LEN: usize = 255;

const NEXT_FILE_BASE_YEAR: u16 = 2000;

/// A command the host can send to the camera module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Count the files recorded in a given hour.
    ListFiles {
        camera_id: u8,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        package_size: u16,
    },
    /// Locate the file nearest a timestamp and report its package count.
    GetNextFile {
        camera_id: u8,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        package_size: PackageSize,
    },
    /// Request one package of the file recorded at `hour:minute`.
    GetSpecifiedPackage {
        camera_id: u8,
        hour: u8,
        minute: u8,
        package_number: u8,
    },
    /// Overlay text on the video.
    Osd {
        camera_id: u8,
        position: OsdPosition,
        text: Bytes,
    },
    /// Set the real-time clock (big-endian unix seconds on the module).
    Rtc { camera_id: u8, time: [u8; 4] },
    /// Switch the module's UART speed.
    Baudrate { camera_id: u8, rate: BaudRate },
}

impl Command {
    pub fn list_files(
        camera_id: u8,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        package_size: u16,
    ) -> Result<Self> {
        let cmd = Command::ListFiles {
            camera_id,
            year,
            month,
            day,
            hour,
            package_size,
        };
        cmd.validate()?;
        Ok(cmd)
    }

    pub fn get_next_file(
        camera_id: u8,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        package_size: PackageSize,
    ) -> Result<Self> {
        let cmd = Command::GetNextFile {
            camera_id,
            year,
            month,
            day,
            hour,
            minute,
            package_size,
        };
        cmd.validate()?;
        Ok(cmd)
    }

    /// `package_number` is taken wide so callers get a range error rather
    /// than a silent truncation.
    pub fn get_specified_package(
        camera_id: u8,
        hour: u8,
        minute: u8,
        package_number: u16,
    ) -> Result<Self> {
        let package_number = u8::try_from(package_number)
            .map_err(|_| FrameError::out_of_range("package_number", package_number))?;
        let cmd = Command::GetSpecifiedPackage {
            camera_id,
            hour,
            minute,
            package_number,
        };
        cmd.validate()?;
        Ok(cmd)
    }

    pub fn osd(camera_id: u8, position: OsdPosition, text: impl AsRef<[u8]>) -> Result<Self> {
        let cmd = Command::Osd {
            camera_id,
            position,
            text: Bytes::copy_from_slice(text.as_ref()),
        };
        cmd.validate()?;
        Ok(cmd)
    }

    pub fn rtc(camera_id: u8, time: [u8; 4]) -> Self {
        Command::Rtc { camera_id, time }
    }

    /// RTC command carrying a unix timestamp.
    pub fn rtc_from_unix(camera_id: u8, secs: u32) -> Self {
        Command::rtc(camera_id, secs.to_be_bytes())
    }

    pub fn baudrate(camera_id: u8, rate: BaudRate) -> Self {
        Command::Baudrate { camera_id, rate }
    }

    pub fn camera_id(&self) -> u8 {
        match self {
            Command::ListFiles { camera_id, .. }
            | Command::GetNextFile { camera_id, .. }
            | Command::GetSpecifiedPackage { camera_id, .. }
            | Command::Osd { camera_id, .. }
            | Command::Rtc { camera_id, .. }
            | Command::Baudrate { camera_id, .. } => *camera_id,
        }
    }

    pub fn specifier(&self) -> u8 {
        let s = &PROTOCOL.specifiers;
        match self {
            Command::ListFiles { .. } => s.list_files,
            Command::GetNextFile { .. } => s.get_next_file,
            Command::GetSpecifiedPackage { .. } => s.get_spec_file,
            Command::Osd { .. } => s.osd,
            Command::Rtc { .. } => s.rtc,
            Command::Baudrate { .. } => s.baudrate,
        }
    }

    /// Which acknowledgement the module answers this command with.
    ///
    /// `None` for GetSpecifiedPackage: the module replies with the data
    /// package itself.
    pub fn ack_kind(&self) -> Option<AckKind> {
        match self {
            Command::ListFiles { .. } => Some(AckKind::ListFiles),
            Command::GetNextFile { .. } => Some(AckKind::NextFile),
            Command::GetSpecifiedPackage { .. } => None,
            Command::Osd { .. } => Some(AckKind::Osd),
            Command::Rtc { .. } => Some(AckKind::Rtc),
            Command::Baudrate { .. } => Some(AckKind::Baudrate),
        }
    }

    fn content_len(&self) -> usize {
        match self {
            Command::ListFiles { .. } => 7,
            Command::GetNextFile { .. } => 6,
            Command::GetSpecifiedPackage { .. } => 3,
            Command::Osd { text, .. } => 2 + text.len(),
            Command::Rtc { .. } => 4,
            Command::Baudrate { .. } => 1,
        }
    }

    /// Total encoded length including header and end mark.
    pub fn wire_size(&self) -> usize {
        PREFIX_SIZE + self.content_len() + 1
    }

    /// Check every range constraint; the first violation is returned.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::ListFiles {
                hour, package_size, ..
            } => {
                check_hour_minute(*hour, 0)?;
                if *package_size > MAX_LIST_PACKAGE_SIZE {
                    return Err(FrameError::out_of_range("package_size", *package_size));
                }
            }
            Command::GetNextFile {
                year, hour, minute, ..
            } => {
                if !(NEXT_FILE_BASE_YEAR..=NEXT_FILE_BASE_YEAR + 255).contains(year) {
                    return Err(FrameError::out_of_range("year", *year));
                }
                check_hour_minute(*hour, *minute)?;
            }
            Command::GetSpecifiedPackage { hour, minute, .. } => {
                check_hour_minute(*hour, *minute)?;
            }
            Command::Osd { text, .. } => {
                if text.len() > MAX_OSD_TEXT_LEN {
                    return Err(FrameError::out_of_range("text_length", text.len() as u32));
                }
            }
            Command::Rtc { .. } | Command::Baudrate { .. } => {}
        }
        Ok(())
    }

    /// Encode into `dst`. Nothing is written if validation fails.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        self.validate()?;

        dst.reserve(self.wire_size());
        dst.put_u8(PROTOCOL.header);
        dst.put_u8(self.specifier());
        dst.put_u8(self.camera_id());

        match self {
            Command::ListFiles {
                year,
                month,
                day,
                hour,
                package_size,
                ..
            } => {
                dst.put_u16(*year);
                dst.put_slice(&[*month, *day, *hour]);
                dst.put_u16(*package_size);
            }
            Command::GetNextFile {
                year,
                month,
                day,
                hour,
                minute,
                package_size,
                ..
            } => {
                let year_offset = (*year - NEXT_FILE_BASE_YEAR) as u8;
                dst.put_slice(&[year_offset, *month, *day, *hour, *minute]);
                dst.put_u8(package_size.code());
            }
            Command::GetSpecifiedPackage {
                hour,
                minute,
                package_number,
                ..
            } => {
                dst.put_slice(&[*hour, *minute, *package_number]);
            }
            Command::Osd { position, text, .. } => {
                dst.put_u8(position.code());
                dst.put_u8(text.len() as u8);
                dst.put_slice(text);
            }
            Command::Rtc { time, .. } => dst.put_slice(time),
            Command::Baudrate { rate, .. } => dst.put_u8(rate.code()),
        }

        dst.put_u8(PROTOCOL.end_mark);
        Ok(())
    }

    /// Encode into a standalone frame.
    pub fn to_frame(&self) -> Result<Frame> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        self.encode(&mut dst)?;
        Ok(Frame::from_bytes(dst.freeze()))
    }
}

pub(crate) fn check_hour_minute(hour: u8, minute: u8) -> Result<()> {
    if hour > 23 {
        return Err(FrameError::out_of_range("hour", hour));
    }
    if minute > 59 {
        return Err(FrameError::out_of_range("minute", minute));
    }
    Ok(())
}
