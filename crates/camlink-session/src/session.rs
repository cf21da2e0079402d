use std::time::Duration;

use bytes::BytesMut;
use camlink_frame::{
    parse_fixed_ack, Ack, AckKind, AckShape, AckStatus, Command, Package, PackageAssembler,
    PackageLayout, SizeField, MAX_PACKAGE_DATA_SIZE,
};
use camlink_transport::Transport;
use tracing::{debug, info, trace, warn};

use crate::error::{Result, SessionError};
use crate::transfer::{FileTransfer, NextFileRequest, TransferState};

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Camera addressed by every command.
    pub camera_id: u8,
    /// How long to wait for the first byte of a response.
    pub response_timeout: Duration,
    /// A pause this long after data has started ends the response.
    pub silence_gap: Duration,
    /// Wire variant of data-package frames.
    pub package_layout: PackageLayout,
    /// Data bytes per package when the size byte is a chunk code. The
    /// firmware always fills a full UART buffer (1024 bytes), whatever
    /// `PackageSize` the GetNextFile request asked for.
    pub chunk_data_len: usize,
    /// Shape of the GetNextFile acknowledgement.
    pub next_file_ack: AckShape,
    /// Pause between consecutive package requests.
    pub inter_request_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera_id: 1,
            response_timeout: Duration::from_secs(1),
            silence_gap: Duration::from_millis(100),
            package_layout: PackageLayout::default(),
            chunk_data_len: MAX_PACKAGE_DATA_SIZE,
            next_file_ack: AckShape::Counted,
            inter_request_delay: Duration::ZERO,
        }
    }
}

impl SessionConfig {
    /// Settings matching the camera firmware's wire behaviour.
    pub fn device(camera_id: u8) -> Self {
        Self {
            camera_id,
            package_layout: PackageLayout::device(),
            next_file_ack: AckShape::Timed,
            ..Self::default()
        }
    }
}

/// One host's conversation with one camera.
pub struct Session<T> {
    transport: T,
    config: SessionConfig,
    state: TransferState,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            state: TransferState::Idle,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// State of the most recent file transfer.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Encode and write a command.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let frame = command.to_frame()?;
        debug!(
            specifier = command.specifier(),
            camera = command.camera_id(),
            len = frame.wire_size(),
            "sending command"
        );
        self.transport.write(frame.as_ref())?;
        Ok(())
    }

    /// Send a command and parse its acknowledgement.
    pub fn request_ack(&mut self, command: &Command) -> Result<Ack> {
        let shape = match command.ack_kind() {
            Some(AckKind::NextFile) => self.config.next_file_ack,
            Some(kind) => kind.shape(),
            None => {
                return Err(SessionError::NoAcknowledgement {
                    specifier: command.specifier(),
                })
            }
        };
        self.request_ack_as(command, shape)
    }

    /// Send a command and parse the response against an explicit shape.
    pub fn request_ack_as(&mut self, command: &Command, shape: AckShape) -> Result<Ack> {
        self.send(command)?;
        let expected = shape.frame_len();
        let raw = self.collect(|_| Some(expected))?;

        if AckStatus::classify(&raw) == AckStatus::Nack {
            warn!(specifier = command.specifier(), "camera sent NACK");
            return Err(SessionError::Nack {
                specifier: command.specifier(),
            });
        }

        let ack = parse_fixed_ack(&raw, shape)?;
        if ack.is_rejected() {
            warn!(specifier = command.specifier(), "camera rejected command");
            return Err(SessionError::Rejected {
                specifier: command.specifier(),
            });
        }
        if ack.command_specifier != command.specifier() || ack.camera_id != command.camera_id() {
            warn!(
                sent = command.specifier(),
                acked = ack.command_specifier,
                camera = ack.camera_id,
                "ack does not echo the command"
            );
        }
        debug!(?ack, "ack received");
        Ok(ack)
    }

    /// Request one data package of the file recorded at `hour:minute`.
    pub fn request_package(&mut self, hour: u8, minute: u8, number: u16) -> Result<Package> {
        let command = Command::get_specified_package(self.config.camera_id, hour, minute, number)?;
        self.send(&command)?;

        let layout = self.config.package_layout;
        let chunk = self.config.chunk_data_len;
        let raw = self.collect(|buf| match layout.size_field {
            SizeField::ChunkCode => Some(layout.frame_len(chunk)),
            SizeField::Length => buf.get(6).map(|&size| layout.frame_len(usize::from(size))),
        })?;

        let package = camlink_frame::parse_package(&raw, layout)?;
        trace!(
            number = package.package_number,
            len = package.package_data.len(),
            "package received"
        );
        Ok(package)
    }

    /// Locate the file nearest `request` and pull every package of it.
    pub fn fetch_next_file(&mut self, request: NextFileRequest) -> Result<FileTransfer> {
        self.state = TransferState::AwaitingNextFileAck;
        let result = self.run_transfer(request);
        self.state = match &result {
            Ok(_) => TransferState::Complete,
            Err(err) => {
                warn!(state = %self.state, error = %err, "file transfer failed");
                TransferState::Failed
            }
        };
        result
    }

    fn run_transfer(&mut self, request: NextFileRequest) -> Result<FileTransfer> {
        let command = Command::get_next_file(
            self.config.camera_id,
            request.year,
            request.month,
            request.day,
            request.hour,
            request.minute,
            request.package_size,
        )?;
        let ack = self.request_ack(&command)?;

        let total = ack.total_packages().unwrap_or(0);
        if total == 0 {
            return Err(SessionError::NoFile);
        }
        let (hour, minute) = ack.time.unwrap_or((request.hour, request.minute));
        info!(total, hour, minute, "file located");

        let mut assembler = PackageAssembler::with_layout(self.config.package_layout);
        for number in 1..=total {
            self.state = TransferState::RequestingPackage { number, total };
            if number > 1 && !self.config.inter_request_delay.is_zero() {
                std::thread::sleep(self.config.inter_request_delay);
            }

            let package = self.request_package(hour, minute, u16::from(number))?;
            if package.package_number != number {
                warn!(
                    requested = number,
                    got = package.package_number,
                    "package number differs from request"
                );
            }
            assembler.append(package);
        }

        let data = assembler.finish();
        info!(bytes = data.len(), packages = total, "file transfer complete");
        Ok(FileTransfer {
            camera_id: self.config.camera_id,
            hour,
            minute,
            total_packages: total,
            data,
        })
    }

    /// Read until `expected_len` is satisfied or the line goes quiet.
    ///
    /// `expected_len` sees the bytes so far and may return `None` while it
    /// cannot tell yet.
    fn collect(&mut self, expected_len: impl Fn(&[u8]) -> Option<usize>) -> Result<BytesMut> {
        let first = self.transport.read_available(self.config.response_timeout)?;
        if first.is_empty() {
            return Err(SessionError::Timeout(self.config.response_timeout));
        }

        let mut buf = BytesMut::from(first.as_ref());
        loop {
            if expected_len(&buf).is_some_and(|want| buf.len() >= want) {
                break;
            }
            let more = self.transport.read_available(self.config.silence_gap)?;
            if more.is_empty() {
                trace!(len = buf.len(), "response ended on silence");
                break;
            }
            buf.extend_from_slice(&more);
        }
        Ok(buf)
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use camlink_frame::{FrameError, OsdPosition, PackageSize, ACK_FRAME, NACK_FRAME};
    use camlink_transport::LoopbackTransport;

    use super::*;

    fn package_frame(number: u8, data: &[u8], layout: PackageLayout, size: u8) -> Vec<u8> {
        Package {
            camera_id: 1,
            hour: 14,
            minute: 20,
            package_number: number,
            package_size: size,
            package_data: Bytes::copy_from_slice(data),
        }
        .encode(0x46, layout)
        .unwrap()
        .as_ref()
        .to_vec()
    }

    fn request() -> NextFileRequest {
        NextFileRequest {
            year: 2024,
            month: 9,
            day: 11,
            hour: 14,
            minute: 20,
            package_size: PackageSize::Medium,
        }
    }

    #[test]
    fn osd_ack_roundtrip() {
        let mut transport = LoopbackTransport::new();
        transport.push_response(vec![0x55, 0x4F, 0x01, 0x23]);
        let mut session = Session::new(transport);

        let cmd = Command::osd(1, OsdPosition::Top, "hi").unwrap();
        let ack = session.request_ack(&cmd).unwrap();
        assert_eq!(ack.command_specifier, 0x4F);

        let written = session.transport().written();
        assert_eq!(
            written[0].as_ref(),
            &[0x55, 0x4F, 0x01, 0x54, 0x02, 0x68, 0x69, 0x23]
        );
    }

    #[test]
    fn ack_split_across_reads_is_collected() {
        let mut transport = LoopbackTransport::new();
        transport.push_chunked(&[0x55, 0x4D, 0x01, 0x40, 0x23], 2);
        let mut session = Session::new(transport);

        let cmd = Command::get_next_file(1, 2024, 9, 11, 14, 20, PackageSize::Medium).unwrap();
        let ack = session.request_ack(&cmd).unwrap();
        assert_eq!(ack.total_packages(), Some(0x40));
        assert_eq!(session.transport().pending(), 0);
    }

    #[test]
    fn silence_is_a_timeout() {
        let mut session = Session::new(LoopbackTransport::new());
        let cmd = Command::rtc_from_unix(1, 0);
        assert!(matches!(
            session.request_ack(&cmd),
            Err(SessionError::Timeout(_))
        ));
    }

    #[test]
    fn nack_is_reported() {
        let mut transport = LoopbackTransport::new();
        transport.push_response(NACK_FRAME.to_vec());
        let mut session = Session::new(transport);
        let cmd = Command::list_files(1, 2024, 9, 11, 14, 1024).unwrap();
        assert!(matches!(
            session.request_ack(&cmd),
            Err(SessionError::Nack { specifier: 0x4C })
        ));
    }

    #[test]
    fn literal_ack_parses_as_counted() {
        let mut transport = LoopbackTransport::new();
        transport.push_response(ACK_FRAME.to_vec());
        let mut session = Session::new(transport);
        let cmd = Command::list_files(1, 2024, 9, 11, 14, 1024).unwrap();
        let ack = session.request_ack(&cmd).unwrap();
        assert_eq!(ack.count, Some(0x83));
    }

    #[test]
    fn rejected_command_is_reported() {
        let mut transport = LoopbackTransport::new();
        transport.push_response(vec![0x55, 0x63, 0x01, 0x23]);
        let mut session = Session::new(transport);
        let cmd = Command::rtc(1, [0, 0, 0, 1]);
        assert!(matches!(
            session.request_ack(&cmd),
            Err(SessionError::Rejected { specifier: 0x54 })
        ));
    }

    #[test]
    fn package_request_has_no_ack() {
        let mut session = Session::new(LoopbackTransport::new());
        let cmd = Command::get_specified_package(1, 14, 20, 1).unwrap();
        assert!(matches!(
            session.request_ack(&cmd),
            Err(SessionError::NoAcknowledgement { specifier: 0x45 })
        ));
        assert!(session.transport().written().is_empty());
    }

    #[test]
    fn fetches_file_in_order() {
        let layout = PackageLayout::default();
        let mut transport = LoopbackTransport::new();
        transport.push_response(vec![0x55, 0x4D, 0x01, 0x03, 0x23]);
        transport.push_response(package_frame(1, b"A", layout, 1));
        transport.push_chunked(&package_frame(2, b"B", layout, 1), 4);
        transport.push_response(package_frame(3, b"C", layout, 1));
        let mut session = Session::new(transport);

        let file = session.fetch_next_file(request()).unwrap();
        assert_eq!(file.total_packages, 3);
        assert_eq!(file.data.as_ref(), b"ABC");
        assert_eq!(session.state(), TransferState::Complete);

        let written = session.transport().written();
        assert_eq!(written.len(), 4);
        assert_eq!(
            written[0].as_ref(),
            &[0x55, 0x4D, 0x01, 0x18, 0x09, 0x0B, 0x0E, 0x14, 0x01, 0x23]
        );
        for (i, frame) in written[1..].iter().enumerate() {
            assert_eq!(
                frame.as_ref(),
                &[0x55, 0x45, 0x01, 0x0E, 0x14, (i + 1) as u8, 0x23]
            );
        }
    }

    #[test]
    fn fetches_file_with_device_layout() {
        let layout = PackageLayout::device();
        let chunk_a = vec![0xA5; 1024];
        let chunk_b = vec![0x5A; 1024];

        let mut transport = LoopbackTransport::new();
        // Timed ack: the camera located the file recorded at 13:54.
        transport.push_response(vec![0x55, 0x4D, 0x02, 0x0D, 0x36, 0x02, 0x23]);
        transport.push_chunked(&package_frame(1, &chunk_a, layout, 0x02), 300);
        transport.push_chunked(&package_frame(2, &chunk_b, layout, 0x02), 700);
        let mut session = Session::with_config(transport, SessionConfig::device(2));

        let file = session.fetch_next_file(request()).unwrap();
        assert_eq!((file.hour, file.minute), (13, 54));
        assert_eq!(file.data.len(), 2048);
        assert_eq!(&file.data[..1024], chunk_a.as_slice());
        assert_eq!(&file.data[1024..], chunk_b.as_slice());

        let written = session.transport().written();
        assert_eq!(written[1].as_ref(), &[0x55, 0x45, 0x02, 0x0D, 0x36, 0x01, 0x23]);
    }

    #[test]
    fn corrupt_package_fails_transfer() {
        let layout = PackageLayout::default();
        let mut transport = LoopbackTransport::new();
        transport.push_response(vec![0x55, 0x4D, 0x01, 0x02, 0x23]);
        transport.push_response(package_frame(1, b"A", layout, 1));
        let mut bad = package_frame(2, b"B", layout, 1);
        bad[7] ^= 0x01;
        transport.push_response(bad);
        let mut session = Session::new(transport);

        let err = session.fetch_next_file(request()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Frame(FrameError::ChecksumMismatch { .. })
        ));
        assert_eq!(session.state(), TransferState::Failed);
    }

    #[test]
    fn zero_packages_means_no_file() {
        let mut transport = LoopbackTransport::new();
        transport.push_response(vec![0x55, 0x4D, 0x01, 0x00, 0x23]);
        let mut session = Session::new(transport);
        assert!(matches!(
            session.fetch_next_file(request()),
            Err(SessionError::NoFile)
        ));
        assert_eq!(session.state(), TransferState::Failed);
    }

    #[test]
    fn missing_package_times_out() {
        let layout = PackageLayout::default();
        let mut transport = LoopbackTransport::new();
        transport.push_response(vec![0x55, 0x4D, 0x01, 0x02, 0x23]);
        transport.push_response(package_frame(1, b"A", layout, 1));
        let mut session = Session::new(transport);

        assert!(matches!(
            session.fetch_next_file(request()),
            Err(SessionError::Timeout(_))
        ));
    }
}
