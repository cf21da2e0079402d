use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// A half-duplex byte pipe to a camera module.
///
/// Implementations do no framing of their own. `write` gets one complete
/// frame; `read_available` returns whatever has arrived.
pub trait Transport {
    /// Send one complete frame.
    fn write(&mut self, frame: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for data, then return everything available.
    ///
    /// An empty buffer means nothing arrived before the timeout.
    fn read_available(&mut self, timeout: Duration) -> Result<Bytes>;

    /// Bytes received but not yet read.
    fn bytes_waiting(&mut self) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write(frame)
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Bytes> {
        (**self).read_available(timeout)
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        (**self).bytes_waiting()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write(frame)
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Bytes> {
        (**self).read_available(timeout)
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        (**self).bytes_waiting()
    }
}
