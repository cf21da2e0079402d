use std::fs;

use camlink_frame::Command as Request;
use camlink_session::NextFileRequest;
use tracing::info;

use crate::cmd::{parse_date, parse_duration, parse_time, FetchArgs, LinkArgs};
use crate::exit::{frame_error, io_error, session_error, CliResult, SUCCESS};
use crate::output::{format_time, print_report, FileReport, OutputFormat};

pub fn run(args: FetchArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let (year, month, day) = parse_date(&args.date)?;
    let (hour, minute) = parse_time(&args.time)?;
    let request = NextFileRequest {
        year,
        month,
        day,
        hour,
        minute,
        package_size: args.size.into(),
    };
    Request::get_next_file(link.camera, year, month, day, hour, minute, request.package_size)
        .map_err(|err| frame_error("invalid fetch request", err))?;
    let delay = args.delay.as_deref().map(parse_duration).transpose()?;

    let mut config = link.session_config()?;
    if let Some(delay) = delay {
        config.inter_request_delay = delay;
    }

    let mut session = link.open_with(config)?;

    let file = session
        .fetch_next_file(request)
        .map_err(|err| session_error("fetch failed", err))?;

    fs::write(&args.output, &file.data).map_err(|err| {
        io_error(&format!("failed writing {}", args.output.display()), err)
    })?;
    info!(path = %args.output.display(), bytes = file.data.len(), "file written");

    let report = FileReport {
        camera_id: file.camera_id,
        file_time: format_time(file.hour, file.minute),
        total_packages: file.total_packages,
        bytes: file.data.len(),
        written_to: args.output.display().to_string(),
    };
    print_report(&report, format);
    Ok(SUCCESS)
}
