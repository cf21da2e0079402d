use std::path::PathBuf;
use std::time::Duration;

use camlink_frame::{OsdPosition, PackageSize};
use camlink_session::{Session, SessionConfig};
use camlink_transport::{SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{transport_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod baud;
pub mod fetch;
pub mod list;
pub mod next;
pub mod osd;
pub mod package;
pub mod rtc;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count the files recorded in one hour.
    List(ListArgs),
    /// Locate the file nearest a timestamp and report its package count.
    Next(NextArgs),
    /// Download a single data package.
    Package(PackageArgs),
    /// Download a whole file and write it to disk.
    Fetch(FetchArgs),
    /// Overlay text on the video.
    Osd(OsdArgs),
    /// Set the module's real-time clock.
    Rtc(RtcArgs),
    /// Switch the module's link speed.
    Baud(BaudArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::List(args) => list::run(args, link, format),
        Command::Next(args) => next::run(args, link, format),
        Command::Package(args) => package::run(args, link, format),
        Command::Fetch(args) => fetch::run(args, link, format),
        Command::Osd(args) => osd::run(args, link, format),
        Command::Rtc(args) => rtc::run(args, link, format),
        Command::Baud(args) => baud::run(args, link, format),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the camera.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial port the module is attached to.
    #[arg(long, env = "CAMLINK_PORT", global = true)]
    pub port: Option<String>,
    /// Local link speed in bits per second.
    #[arg(long, env = "CAMLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Camera id placed in every command.
    #[arg(long, default_value_t = 1, global = true)]
    pub camera: u8,
    /// Time to wait for the first byte of a response (e.g. 2s, 500ms).
    #[arg(long, default_value = "1s", global = true)]
    pub timeout: String,
    /// Expect the firmware's package layout and timed next-file ack.
    #[arg(long, global = true)]
    pub device_layout: bool,
}

impl LinkArgs {
    pub fn session_config(&self) -> CliResult<SessionConfig> {
        let base = if self.device_layout {
            SessionConfig::device(self.camera)
        } else {
            SessionConfig {
                camera_id: self.camera,
                ..SessionConfig::default()
            }
        };
        Ok(SessionConfig {
            response_timeout: parse_duration(&self.timeout)?,
            ..base
        })
    }

    /// Open the port. Call only once the command itself has been validated.
    pub fn open(&self) -> CliResult<Session<SerialTransport>> {
        self.open_with(self.session_config()?)
    }

    pub fn open_with(&self, config: SessionConfig) -> CliResult<Session<SerialTransport>> {
        let port = self
            .port
            .as_deref()
            .ok_or_else(|| CliError::usage("no serial port given (use --port or CAMLINK_PORT)"))?;
        let transport = SerialTransport::open(SerialConfig::new(port, self.baud))
            .map_err(|err| transport_error("open failed", err))?;
        Ok(Session::with_config(transport, config))
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Recording date (YYYY-MM-DD).
    pub date: String,
    /// Hour of day to count files in.
    #[arg(long, default_value_t = 0)]
    pub hour: u8,
    /// Package size to announce, in bytes.
    #[arg(long, default_value_t = 1024)]
    pub package_size: u16,
}

#[derive(Args, Debug)]
pub struct NextArgs {
    /// Recording date (YYYY-MM-DD).
    pub date: String,
    /// Time of day (HH:MM).
    pub time: String,
    /// Chunk size the module should split the file into.
    #[arg(long, value_enum, default_value = "medium")]
    pub size: SizeArg,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Time of the file (HH:MM), as reported by `next`.
    pub time: String,
    /// Package number, starting at 1.
    pub number: u16,
    /// Write the package data to this file.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Recording date (YYYY-MM-DD).
    pub date: String,
    /// Time of day (HH:MM).
    pub time: String,
    #[arg(long, value_enum, default_value = "medium")]
    pub size: SizeArg,
    /// Where to write the assembled file.
    #[arg(long, short = 'o')]
    pub output: PathBuf,
    /// Pause between package requests (e.g. 50ms).
    #[arg(long)]
    pub delay: Option<String>,
}

#[derive(Args, Debug)]
pub struct OsdArgs {
    /// Text to overlay (at most 255 bytes).
    pub text: String,
    #[arg(long, value_enum, default_value = "top")]
    pub position: PositionArg,
}

#[derive(Args, Debug)]
pub struct RtcArgs {
    /// Unix time to set. Defaults to the host clock.
    #[arg(long, value_name = "SECS")]
    pub unix: Option<u32>,
}

#[derive(Args, Debug)]
pub struct BaudArgs {
    /// New speed in bits per second (9600, 19200, 38400, 57600, 115200).
    pub rate: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SizeArg {
    Small,
    Medium,
    Large,
}

impl From<SizeArg> for PackageSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Small => PackageSize::Small,
            SizeArg::Medium => PackageSize::Medium,
            SizeArg::Large => PackageSize::Large,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PositionArg {
    Top,
    Bottom,
}

impl From<PositionArg> for OsdPosition {
    fn from(position: PositionArg) -> Self {
        match position {
            PositionArg::Top => OsdPosition::Top,
            PositionArg::Bottom => OsdPosition::Bottom,
        }
    }
}

/// Parse a calendar date `YYYY-MM-DD` into (year, month, day).
pub fn parse_date(input: &str) -> CliResult<(u16, u8, u8)> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|err| {
        CliError::usage(format!("invalid date (want YYYY-MM-DD): {input}: {err}"))
    })?;
    let year = u16::try_from(date.year())
        .map_err(|_| CliError::usage(format!("year out of range: {}", date.year())))?;
    Ok((year, date.month() as u8, date.day() as u8))
}

/// Parse a wall-clock time `HH:MM` into (hour, minute).
pub fn parse_time(input: &str) -> CliResult<(u8, u8)> {
    let time = NaiveTime::parse_from_str(input.trim(), "%H:%M").map_err(|err| {
        CliError::usage(format!("invalid time (want HH:MM): {input}: {err}"))
    })?;
    Ok((time.hour() as u8, time.minute() as u8))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
