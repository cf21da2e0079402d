//! Reassembly of a file from its data packages.
//!
//! A package frame as sent by the module:
//!
//! ```text
//! ┌──────┬──────┬────┬──────┬────────┬────────┬──────┬──────────┬──────────┬────────┐
//! │ 0x55 │ Spec │ Id │ Hour │ Minute │ Pkg no │ Size │ Data     │ Checksum │ [0x23] │
//! │      │      │    │      │        │        │      │ (≤1024B) │ (2B BE)  │        │
//! └──────┴──────┴────┴──────┴────────┴────────┴──────┴──────────┴──────────┴────────┘
//! ```
//!
//! The checksum sums header, specifier, id, package number, size byte and
//! data. Hour and minute are not part of it.
//!
//! The assembler appends packages in the order it is given them. Deciding
//! when the transfer is complete is the caller's job.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{checksum, verify_checksum, Frame, CHECKSUM_SIZE, PREFIX_SIZE};
use crate::command::check_hour_minute;
use crate::error::{FrameError, Result};
use crate::protocol::PROTOCOL;

/// Header, specifier, id, hour, minute, package number, size byte.
pub const PACKAGE_PREFIX_SIZE: usize = PREFIX_SIZE + 4;

/// How to read the size byte of a package frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeField {
    /// The byte is the data length and must match it.
    #[default]
    Length,
    /// The byte is the module's chunk-size code; the frame length decides
    /// how much data there is.
    ChunkCode,
}

/// Wire variations of the package frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageLayout {
    /// An END mark follows the checksum.
    pub trailing_end_mark: bool,
    pub size_field: SizeField,
}

impl PackageLayout {
    /// Layout produced by the camera firmware.
    pub fn device() -> Self {
        Self {
            trailing_end_mark: true,
            size_field: SizeField::ChunkCode,
        }
    }

    fn trailer_len(&self) -> usize {
        CHECKSUM_SIZE + usize::from(self.trailing_end_mark)
    }

    /// Smallest frame this layout accepts (no data).
    pub fn min_frame_len(&self) -> usize {
        PACKAGE_PREFIX_SIZE + self.trailer_len()
    }

    /// Wire length of a frame carrying `data_len` bytes.
    pub fn frame_len(&self, data_len: usize) -> usize {
        self.min_frame_len() + data_len
    }
}

/// One chunk of a file transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub camera_id: u8,
    pub hour: u8,
    pub minute: u8,
    pub package_number: u8,
    /// Size byte as declared on the wire.
    pub package_size: u8,
    pub package_data: Bytes,
}

impl Package {
    /// Encode as the module would send it. Mostly useful for simulators
    /// and tests.
    pub fn encode(&self, command_specifier: u8, layout: PackageLayout) -> Result<Frame> {
        check_hour_minute(self.hour, self.minute)?;
        if self.package_data.len() > PROTOCOL.max_package_data {
            return Err(FrameError::PayloadTooLarge {
                size: self.package_data.len(),
                max: PROTOCOL.max_package_data,
            });
        }

        let mut dst = BytesMut::with_capacity(layout.frame_len(self.package_data.len()));
        dst.put_slice(&[
            PROTOCOL.header,
            command_specifier,
            self.camera_id,
            self.hour,
            self.minute,
            self.package_number,
            self.package_size,
        ]);
        dst.put_slice(&self.package_data);
        let sum = package_checksum(&dst);
        dst.put_u16(sum);
        if layout.trailing_end_mark {
            dst.put_u8(PROTOCOL.end_mark);
        }
        Ok(Frame::from_bytes(dst.freeze()))
    }
}

fn package_checksum(body: &[u8]) -> u16 {
    checksum(&body[..PREFIX_SIZE]).wrapping_add(checksum(&body[PREFIX_SIZE + 2..]))
}

/// Parse one package frame.
///
/// Checks run in order: length, framing bytes, hour/minute, data length,
/// declared size, checksum.
pub fn parse_package(raw: &[u8], layout: PackageLayout) -> Result<Package> {
    let len = raw.len();
    let min = layout.min_frame_len();
    if len < min {
        return Err(FrameError::FrameTooShort { len, min });
    }
    if raw[0] != PROTOCOL.header {
        return Err(FrameError::InvalidFrameFormat("bad header byte"));
    }
    if layout.trailing_end_mark && raw[len - 1] != PROTOCOL.end_mark {
        return Err(FrameError::InvalidFrameFormat("bad end mark"));
    }

    let hour = raw[3];
    let minute = raw[4];
    check_hour_minute(hour, minute)?;

    let body = &raw[..len - layout.trailer_len()];
    let data = &body[PACKAGE_PREFIX_SIZE..];
    if data.len() > PROTOCOL.max_package_data {
        return Err(FrameError::PayloadTooLarge {
            size: data.len(),
            max: PROTOCOL.max_package_data,
        });
    }

    let package_size = raw[6];
    if layout.size_field == SizeField::Length && usize::from(package_size) != data.len() {
        return Err(FrameError::PackageSizeMismatch {
            declared: usize::from(package_size),
            actual: data.len(),
        });
    }

    let trailer = &raw[body.len()..body.len() + CHECKSUM_SIZE];
    verify_checksum(package_checksum(body), [trailer[0], trailer[1]])?;

    Ok(Package {
        camera_id: raw[2],
        hour,
        minute,
        package_number: raw[5],
        package_size,
        package_data: Bytes::copy_from_slice(data),
    })
}

/// Collects package data into one contiguous buffer.
#[derive(Debug, Default)]
pub struct PackageAssembler {
    layout: PackageLayout,
    buf: BytesMut,
    packages: usize,
    last_number: Option<u8>,
}

impl PackageAssembler {
    /// Assembler for the default package layout.
    pub fn new() -> Self {
        Self::with_layout(PackageLayout::default())
    }

    pub fn with_layout(layout: PackageLayout) -> Self {
        Self {
            layout,
            buf: BytesMut::new(),
            packages: 0,
            last_number: None,
        }
    }

    /// Parse a raw package frame without touching the buffer.
    pub fn ingest(&self, raw: &[u8]) -> Result<Package> {
        parse_package(raw, self.layout)
    }

    /// Append a parsed package to the output.
    pub fn append(&mut self, package: Package) {
        if let Some(last) = self.last_number {
            if package.package_number <= last {
                tracing::warn!(
                    last,
                    got = package.package_number,
                    "package number did not advance; appending anyway"
                );
            }
        }
        tracing::trace!(
            number = package.package_number,
            len = package.package_data.len(),
            "package appended"
        );
        self.buf.extend_from_slice(&package.package_data);
        self.last_number = Some(package.package_number);
        self.packages += 1;
    }

    /// `ingest` then `append`. A failed frame leaves the buffer unchanged.
    pub fn push(&mut self, raw: &[u8]) -> Result<()> {
        let package = self.ingest(raw)?;
        self.append(package);
        Ok(())
    }

    /// Number of packages appended so far.
    pub fn packages(&self) -> usize {
        self.packages
    }

    /// Bytes assembled so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn layout(&self) -> PackageLayout {
        self.layout
    }

    /// Hand over the assembled file.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(number: u8, data: &[u8]) -> Package {
        Package {
            camera_id: 1,
            hour: 14,
            minute: 20,
            package_number: number,
            package_size: data.len() as u8,
            package_data: Bytes::copy_from_slice(data),
        }
    }

    fn wire(pkg: &Package, layout: PackageLayout) -> Vec<u8> {
        pkg.encode(0x46, layout).unwrap().as_ref().to_vec()
    }

    #[test]
    fn assembles_in_order_given() {
        let mut asm = PackageAssembler::new();
        for (n, data) in [(1, b"A"), (2, b"B"), (3, b"C")] {
            asm.push(&wire(&package(n, data), PackageLayout::default()))
                .unwrap();
        }
        assert_eq!(asm.packages(), 3);
        assert_eq!(asm.finish().as_ref(), b"ABC");
    }

    #[test]
    fn malformed_frame_does_not_corrupt_buffer() {
        let layout = PackageLayout::default();
        let mut asm = PackageAssembler::new();
        asm.push(&wire(&package(1, b"A"), layout)).unwrap();

        let mut bad = wire(&package(2, b"B"), layout);
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        assert!(matches!(
            asm.push(&bad),
            Err(FrameError::ChecksumMismatch { .. })
        ));
        assert!(asm.push(&bad[..4]).is_err());

        asm.push(&wire(&package(3, b"C"), layout)).unwrap();
        assert_eq!(asm.packages(), 2);
        assert_eq!(asm.finish().as_ref(), b"AC");
    }

    #[test]
    fn parses_known_frame() {
        // 55 46 01 | 0E 14 | 01 | 02 | AA BB | checksum
        let mut raw = vec![0x55, 0x46, 0x01, 0x0E, 0x14, 0x01, 0x02, 0xAA, 0xBB];
        let sum: u16 = [0x55u16, 0x46, 0x01, 0x01, 0x02, 0xAA, 0xBB].iter().sum();
        raw.extend_from_slice(&sum.to_be_bytes());

        let pkg = parse_package(&raw, PackageLayout::default()).unwrap();
        assert_eq!(pkg.camera_id, 1);
        assert_eq!((pkg.hour, pkg.minute), (14, 20));
        assert_eq!(pkg.package_number, 1);
        assert_eq!(pkg.package_data.as_ref(), &[0xAA, 0xBB]);
    }

    #[test]
    fn hour_and_minute_are_not_checksummed() {
        let layout = PackageLayout::default();
        let mut raw = wire(&package(1, b"xyz"), layout);
        raw[3] = 9;
        raw[4] = 45;
        let pkg = parse_package(&raw, layout).unwrap();
        assert_eq!((pkg.hour, pkg.minute), (9, 45));
    }

    #[test]
    fn rejects_out_of_range_time() {
        let layout = PackageLayout::default();
        let mut raw = wire(&package(1, b"x"), layout);
        raw[3] = 24;
        assert!(matches!(
            parse_package(&raw, layout),
            Err(FrameError::FieldOutOfRange { field: "hour", .. })
        ));

        let mut raw = wire(&package(1, b"x"), layout);
        raw[4] = 60;
        assert!(matches!(
            parse_package(&raw, layout),
            Err(FrameError::FieldOutOfRange { field: "minute", .. })
        ));
    }

    #[test]
    fn rejects_short_frame() {
        let layout = PackageLayout::default();
        assert!(matches!(
            parse_package(&[0x55; 8], layout),
            Err(FrameError::FrameTooShort { len: 8, min: 9 })
        ));
        assert!(matches!(
            parse_package(&[0x55; 9], PackageLayout::device()),
            Err(FrameError::FrameTooShort { len: 9, min: 10 })
        ));
    }

    #[test]
    fn rejects_declared_size_mismatch() {
        let mut pkg = package(1, b"abcd");
        pkg.package_size = 3;
        let raw = wire(&pkg, PackageLayout::default());
        assert_eq!(
            parse_package(&raw, PackageLayout::default()).unwrap_err(),
            FrameError::PackageSizeMismatch {
                declared: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn device_layout_full_chunk() {
        let layout = PackageLayout::device();
        let data: Vec<u8> = (0..1024).map(|i| (i % 251) as u8).collect();
        let mut pkg = package(5, &data);
        pkg.package_size = 0x02;

        let raw = wire(&pkg, layout);
        assert_eq!(raw.len(), 1034);
        assert_eq!(*raw.last().unwrap(), 0x23);

        let parsed = parse_package(&raw, layout).unwrap();
        assert_eq!(parsed.package_size, 0x02);
        assert_eq!(parsed.package_data.len(), 1024);
        assert_eq!(parsed.package_data.as_ref(), data.as_slice());
    }

    #[test]
    fn device_layout_checks_end_mark() {
        let layout = PackageLayout::device();
        let mut raw = wire(&package(1, b"abc"), layout);
        let last = raw.len() - 1;
        raw[last] = 0x00;
        assert!(matches!(
            parse_package(&raw, layout),
            Err(FrameError::InvalidFrameFormat("bad end mark"))
        ));
    }

    #[test]
    fn rejects_oversized_data() {
        let layout = PackageLayout::device();
        let mut raw = vec![0x55, 0x46, 0x01, 0x00, 0x00, 0x01, 0x02];
        raw.extend(std::iter::repeat(0u8).take(1025));
        raw.extend_from_slice(&[0x00, 0x00, 0x23]);
        assert!(matches!(
            parse_package(&raw, layout),
            Err(FrameError::PayloadTooLarge { size: 1025, .. })
        ));
    }

    #[test]
    fn out_of_order_packages_are_appended_as_given() {
        let layout = PackageLayout::default();
        let mut asm = PackageAssembler::with_layout(layout);
        asm.push(&wire(&package(2, b"B"), layout)).unwrap();
        asm.push(&wire(&package(1, b"A"), layout)).unwrap();
        assert_eq!(asm.len(), 2);
        assert_eq!(asm.finish().as_ref(), b"BA");
    }
}
