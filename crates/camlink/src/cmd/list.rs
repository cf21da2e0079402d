use camlink_frame::Command as Request;

use crate::cmd::{parse_date, LinkArgs, ListArgs};
use crate::exit::{frame_error, session_error, CliResult, SUCCESS};
use crate::output::{print_report, AckReport, OutputFormat};

pub fn run(args: ListArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let (year, month, day) = parse_date(&args.date)?;
    let request = Request::list_files(link.camera, year, month, day, args.hour, args.package_size)
        .map_err(|err| frame_error("invalid list request", err))?;

    let mut session = link.open()?;
    let ack = session
        .request_ack(&request)
        .map_err(|err| session_error("list failed", err))?;

    print_report(&AckReport::new("list", &ack), format);
    Ok(SUCCESS)
}
