use camlink_frame::{BaudRate, Command as Request};
use tracing::info;

use crate::cmd::{BaudArgs, LinkArgs};
use crate::exit::{frame_error, session_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_report, AckReport, OutputFormat};

pub fn run(args: BaudArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let rate = BaudRate::from_bits_per_second(args.rate)
        .map_err(|err| frame_error("unsupported baud rate", err))?;
    let request = Request::baudrate(link.camera, rate);

    let mut session = link.open()?;
    let ack = session
        .request_ack(&request)
        .map_err(|err| session_error("baud change failed", err))?;

    // The module switches after acking; follow it locally.
    session
        .transport_mut()
        .set_baud_rate(rate.bits_per_second())
        .map_err(|err| transport_error("local baud change failed", err))?;
    info!(baud = rate.bits_per_second(), "link speed changed");

    print_report(&AckReport::new("baud", &ack), format);
    Ok(SUCCESS)
}
