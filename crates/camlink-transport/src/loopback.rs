use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport with scripted responses.
///
/// Each queued chunk is returned by exactly one `read_available` call, which
/// lets tests model a response arriving in pieces. An empty queue reads as
/// silence.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    written: Vec<Bytes>,
    responses: VecDeque<Bytes>,
    closed: bool,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one chunk for a future read.
    pub fn push_response(&mut self, chunk: impl Into<Bytes>) {
        self.responses.push_back(chunk.into());
    }

    /// Queue a response split into chunks of at most `chunk_size` bytes.
    pub fn push_chunked(&mut self, response: &[u8], chunk_size: usize) {
        for chunk in response.chunks(chunk_size.max(1)) {
            self.push_response(Bytes::copy_from_slice(chunk));
        }
    }

    /// Queue a silent read (an empty chunk).
    pub fn push_silence(&mut self) {
        self.responses.push_back(Bytes::new());
    }

    /// Frames written so far, in order.
    pub fn written(&self) -> &[Bytes] {
        &self.written
    }

    /// Responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.len()
    }

    /// Make every further operation fail with `Closed`.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Transport for LoopbackTransport {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.written.push(Bytes::copy_from_slice(frame));
        Ok(())
    }

    fn read_available(&mut self, _timeout: Duration) -> Result<Bytes> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(self.responses.pop_front().unwrap_or_default())
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(self.responses.front().map_or(0, Bytes::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    #[test]
    fn records_writes_in_order() {
        let mut t = LoopbackTransport::new();
        t.write(b"one").unwrap();
        t.write(b"two").unwrap();
        assert_eq!(t.written(), &[Bytes::from_static(b"one"), Bytes::from_static(b"two")]);
    }

    #[test]
    fn replays_chunks_then_silence() {
        let mut t = LoopbackTransport::new();
        t.push_chunked(&[1, 2, 3, 4, 5], 2);
        assert_eq!(t.bytes_waiting().unwrap(), 2);

        assert_eq!(t.read_available(TICK).unwrap().as_ref(), &[1, 2]);
        assert_eq!(t.read_available(TICK).unwrap().as_ref(), &[3, 4]);
        assert_eq!(t.read_available(TICK).unwrap().as_ref(), &[5]);
        assert!(t.read_available(TICK).unwrap().is_empty());
        assert_eq!(t.bytes_waiting().unwrap(), 0);
    }

    #[test]
    fn closed_transport_errors() {
        let mut t = LoopbackTransport::new();
        t.close();
        assert!(matches!(t.write(b"x"), Err(TransportError::Closed)));
        assert!(matches!(t.read_available(TICK), Err(TransportError::Closed)));
    }

    #[test]
    fn works_through_mut_reference() {
        fn send<T: Transport>(mut t: T) {
            t.write(b"ping").unwrap();
        }
        let mut t = LoopbackTransport::new();
        send(&mut t);
        assert_eq!(t.written().len(), 1);
    }
}
