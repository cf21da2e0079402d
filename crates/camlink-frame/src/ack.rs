//! Fixed-size acknowledgement frames.
//!
//! Acks do not say which command they answer, and two command families
//! produce the same shape. The caller names the shape it expects; the
//! parser only checks framing.

use crate::error::{FrameError, Result};
use crate::protocol::{ACK_FRAME, NACK_FRAME, PROTOCOL, REJECTED_SPECIFIER};

/// Byte layout of an acknowledgement frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckShape {
    /// `55 spec id 23`.
    Plain,
    /// `55 spec id count 23`.
    Counted,
    /// `55 spec id hour minute count 23`, sent by firmware that reports the
    /// timestamp of the file it located.
    Timed,
}

impl AckShape {
    /// Exact frame length for this shape.
    pub fn frame_len(self) -> usize {
        match self {
            AckShape::Plain => 4,
            AckShape::Counted => 5,
            AckShape::Timed => 7,
        }
    }
}

/// Which command an acknowledgement answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckKind {
    ListFiles,
    NextFile,
    Osd,
    SpecifiedPackage,
    Rtc,
    Baudrate,
}

impl AckKind {
    /// Shape the module uses for this kind unless told otherwise.
    pub fn shape(self) -> AckShape {
        match self {
            AckKind::ListFiles | AckKind::NextFile => AckShape::Counted,
            AckKind::Osd | AckKind::SpecifiedPackage | AckKind::Rtc | AckKind::Baudrate => {
                AckShape::Plain
            }
        }
    }
}

/// A parsed acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub command_specifier: u8,
    pub camera_id: u8,
    /// File count (ListFiles) or total package count (NextFile).
    pub count: Option<u8>,
    /// `(hour, minute)` of the located file, timed shape only.
    pub time: Option<(u8, u8)>,
}

impl Ack {
    /// Total packages announced by a NextFile ack.
    pub fn total_packages(&self) -> Option<u8> {
        self.count
    }

    /// The module did not recognise or could not serve the command.
    pub fn is_rejected(&self) -> bool {
        self.command_specifier == REJECTED_SPECIFIER
    }
}

/// Parse an acknowledgement frame against the shape the caller expects.
pub fn parse_fixed_ack(bytes: &[u8], shape: AckShape) -> Result<Ack> {
    let expected = shape.frame_len();
    if bytes.len() != expected {
        return Err(FrameError::AckFrameSizeIncorrect {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes[0] != PROTOCOL.header {
        return Err(FrameError::InvalidFrameFormat("bad header byte"));
    }
    if bytes[expected - 1] != PROTOCOL.end_mark {
        return Err(FrameError::InvalidFrameFormat("bad end mark"));
    }

    let (count, time) = match shape {
        AckShape::Plain => (None, None),
        AckShape::Counted => (Some(bytes[3]), None),
        AckShape::Timed => (Some(bytes[5]), Some((bytes[3], bytes[4]))),
    };

    Ok(Ack {
        command_specifier: bytes[1],
        camera_id: bytes[2],
        count,
        time,
    })
}

/// Parse the acknowledgement for a known command kind.
pub fn parse_ack(bytes: &[u8], kind: AckKind) -> Result<Ack> {
    parse_fixed_ack(bytes, kind.shape())
}

/// Recognises the literal ACK/NACK frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Ack,
    Nack,
    Other,
}

impl AckStatus {
    pub fn classify(bytes: &[u8]) -> Self {
        if bytes == ACK_FRAME.as_slice() {
            AckStatus::Ack
        } else if bytes == NACK_FRAME.as_slice() {
            AckStatus::Nack
        } else {
            AckStatus::Other
        }
    }
}
