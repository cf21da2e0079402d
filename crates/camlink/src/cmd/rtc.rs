use camlink_frame::Command as Request;

use crate::cmd::{LinkArgs, RtcArgs};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_report, AckReport, OutputFormat};

pub fn run(args: RtcArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let secs = match args.unix {
        Some(secs) => secs,
        None => host_unix_seconds()?,
    };
    let request = Request::rtc_from_unix(link.camera, secs);

    let mut session = link.open()?;
    let ack = session
        .request_ack(&request)
        .map_err(|err| session_error("RTC update failed", err))?;

    print_report(&AckReport::new("rtc", &ack), format);
    Ok(SUCCESS)
}

fn host_unix_seconds() -> CliResult<u32> {
    let secs = chrono::Utc::now().timestamp();
    u32::try_from(secs)
        .map_err(|_| CliError::new(INTERNAL, format!("host clock out of range: {secs}")))
}
