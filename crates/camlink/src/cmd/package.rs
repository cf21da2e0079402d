use std::fs;

use camlink_frame::Command as Request;

use crate::cmd::{parse_time, LinkArgs, PackageArgs};
use crate::exit::{frame_error, io_error, session_error, CliResult, SUCCESS};
use crate::output::{format_time, print_report, OutputFormat, PackageReport};

pub fn run(args: PackageArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let (hour, minute) = parse_time(&args.time)?;
    // Validate before touching the port; the session rebuilds the same frame.
    Request::get_specified_package(link.camera, hour, minute, args.number)
        .map_err(|err| frame_error("invalid package request", err))?;

    let mut session = link.open()?;
    let package = session
        .request_package(hour, minute, args.number)
        .map_err(|err| session_error("package request failed", err))?;

    let written_to = match &args.output {
        Some(path) => {
            fs::write(path, &package.package_data).map_err(|err| {
                io_error(&format!("failed writing {}", path.display()), err)
            })?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let report = PackageReport {
        camera_id: package.camera_id,
        file_time: format_time(package.hour, package.minute),
        package_number: package.package_number,
        size_byte: package.package_size,
        data_len: package.package_data.len(),
        written_to,
    };
    print_report(&report, format);
    Ok(SUCCESS)
}
