use camlink_frame::Command as Request;

use crate::cmd::{LinkArgs, OsdArgs};
use crate::exit::{frame_error, session_error, CliResult, SUCCESS};
use crate::output::{print_report, AckReport, OutputFormat};

pub fn run(args: OsdArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let request = Request::osd(link.camera, args.position.into(), args.text.as_bytes())
        .map_err(|err| frame_error("invalid OSD text", err))?;

    let mut session = link.open()?;
    let ack = session
        .request_ack(&request)
        .map_err(|err| session_error("OSD failed", err))?;

    print_report(&AckReport::new("osd", &ack), format);
    Ok(SUCCESS)
}
