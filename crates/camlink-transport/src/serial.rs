use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, trace};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Speed the camera firmware boots with.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// The firmware reads commands line by line, so each frame is followed by
/// CR LF on the wire.
pub const DEFAULT_LINE_TERMINATOR: &[u8] = b"\r\n";

const READ_CHUNK_SIZE: usize = 2 * 1024;

/// Serial link settings. The framing is always 8N1 without flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub port: String,
    pub baud_rate: u32,
    /// Bytes written after every frame. Empty to disable.
    pub line_terminator: Vec<u8>,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            line_terminator: DEFAULT_LINE_TERMINATOR.to_vec(),
        }
    }

    /// Replace the line terminator.
    #[must_use]
    pub fn line_terminator(mut self, terminator: impl Into<Vec<u8>>) -> Self {
        self.line_terminator = terminator.into();
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE)
    }
}

/// A camera module attached to a local serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    config: SerialConfig,
}

impl SerialTransport {
    /// Open and configure the port, discarding anything already buffered.
    pub fn open(config: SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_secs(1))
            .open()
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;
        port.clear(ClearBuffer::All)?;

        info!(port = %config.port, baud = config.baud_rate, "serial port open");
        Ok(Self { port, config })
    }

    /// Change the local link speed, e.g. after the module accepted a
    /// baud-rate command.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.port.set_baud_rate(baud_rate)?;
        self.config.baud_rate = baud_rate;
        debug!(baud = baud_rate, "baud rate changed");
        Ok(())
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn read_chunk(&mut self, dst: &mut BytesMut) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.port.read(&mut chunk) {
                Ok(n) => {
                    dst.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => return Ok(0),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, frame: &[u8]) -> Result<()> {
        trace!(len = frame.len(), "serial write");
        self.port.write_all(frame)?;
        if !self.config.line_terminator.is_empty() {
            self.port.write_all(&self.config.line_terminator)?;
        }
        self.port.flush()?;
        Ok(())
    }

    fn read_available(&mut self, timeout: Duration) -> Result<Bytes> {
        self.port.set_timeout(timeout)?;

        let mut buf = BytesMut::new();
        if self.read_chunk(&mut buf)? == 0 {
            return Ok(buf.freeze());
        }

        // Drain whatever else is already sitting in the driver buffer.
        while self.port.bytes_to_read()? > 0 {
            if self.read_chunk(&mut buf)? == 0 {
                break;
            }
        }

        trace!(len = buf.len(), "serial read");
        Ok(buf.freeze())
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.config.port)
            .field("baud_rate", &self.config.baud_rate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_firmware() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.line_terminator, b"\r\n");
    }

    #[test]
    fn line_terminator_can_be_disabled() {
        let cfg = SerialConfig::new("/dev/ttyS1", 9_600).line_terminator(Vec::new());
        assert!(cfg.line_terminator.is_empty());
        assert_eq!(cfg.port, "/dev/ttyS1");
    }

    #[test]
    fn open_missing_port_reports_port_name() {
        let cfg = SerialConfig::new("/dev/camlink-does-not-exist", DEFAULT_BAUD_RATE);
        match SerialTransport::open(cfg) {
            Err(TransportError::Open { port, .. }) => {
                assert_eq!(port, "/dev/camlink-does-not-exist");
            }
            other => panic!("expected open error, got {other:?}"),
        }
    }
}
