use camlink_frame::Command as Request;

use crate::cmd::{parse_date, parse_time, LinkArgs, NextArgs};
use crate::exit::{frame_error, session_error, CliResult, SUCCESS};
use crate::output::{print_report, AckReport, OutputFormat};

pub fn run(args: NextArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let (year, month, day) = parse_date(&args.date)?;
    let (hour, minute) = parse_time(&args.time)?;
    let request = Request::get_next_file(
        link.camera,
        year,
        month,
        day,
        hour,
        minute,
        args.size.into(),
    )
    .map_err(|err| frame_error("invalid next-file request", err))?;

    let mut session = link.open()?;
    let ack = session
        .request_ack(&request)
        .map_err(|err| session_error("next-file request failed", err))?;

    print_report(&AckReport::new("next", &ack), format);
    Ok(SUCCESS)
}
