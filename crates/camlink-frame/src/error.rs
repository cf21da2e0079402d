/// Errors that can occur while building or parsing camera frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The package data exceeds the protocol maximum.
    #[error("package data too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The buffer is shorter than the smallest valid frame of its kind.
    #[error("frame too short ({len} bytes, min {min})")]
    FrameTooShort { len: usize, min: usize },

    /// The trailing checksum does not match the recomputed one.
    #[error("checksum mismatch (frame carries {received:#06x}, computed {computed:#06x})")]
    ChecksumMismatch { received: u16, computed: u16 },

    /// The declared package size disagrees with the bytes actually present.
    #[error("package size mismatch (declared {declared}, actual {actual})")]
    PackageSizeMismatch { declared: usize, actual: usize },

    /// Header or end-mark byte is wrong.
    #[error("invalid frame format: {0}")]
    InvalidFrameFormat(&'static str),

    /// An acknowledgement frame has the wrong length for the expected shape.
    #[error("ack frame size incorrect ({actual} bytes, expected {expected})")]
    AckFrameSizeIncorrect { expected: usize, actual: usize },

    /// A command or frame field is outside its allowed range.
    #[error("field `{field}` out of range: {value}")]
    FieldOutOfRange { field: &'static str, value: u32 },
}

impl FrameError {
    pub(crate) fn out_of_range(field: &'static str, value: impl Into<u32>) -> Self {
        Self::FieldOutOfRange {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
