mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, LinkArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "camlink", version, about = "Serial camera module CLI")]
struct Cli {
    #[command(flatten)]
    link: LinkArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.link, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_next_subcommand() {
        let cli = Cli::try_parse_from([
            "camlink",
            "--port",
            "/dev/ttyUSB1",
            "next",
            "2024-09-11",
            "14:20",
            "--size",
            "large",
        ])
        .expect("next args should parse");

        assert_eq!(cli.link.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(cli.link.baud, 115_200);
        assert_eq!(cli.link.camera, 1);
        assert!(matches!(cli.command, Command::Next(_)));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "camlink",
            "osd",
            "hello",
            "--camera",
            "3",
            "--baud",
            "57600",
            "--format",
            "pretty",
        ])
        .expect("global flags should parse after the subcommand");
        assert_eq!(cli.link.camera, 3);
        assert_eq!(cli.link.baud, 57_600);
        assert_eq!(cli.format, Some(OutputFormat::Pretty));
    }

    #[test]
    fn fetch_requires_output() {
        let err = Cli::try_parse_from(["camlink", "fetch", "2024-09-11", "14:20"])
            .expect_err("missing --output should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_osd_position() {
        let err = Cli::try_parse_from(["camlink", "osd", "hi", "--position", "middle"])
            .expect_err("unknown position should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn camera_id_is_a_byte() {
        assert!(Cli::try_parse_from(["camlink", "--camera", "256", "list", "2024-09-11"]).is_err());
    }
}
