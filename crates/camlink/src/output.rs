use std::io::IsTerminal;

use camlink_frame::{Ack, PROTOCOL};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Something a subcommand prints on success.
pub trait Report: Serialize {
    fn rows(&self) -> Vec<(&'static str, String)>;
}

pub fn print_report<R: Report>(report: &R, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in report.rows() {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", pretty_line(&report.rows())),
    }
}

fn pretty_line(rows: &[(&'static str, String)]) -> String {
    rows.iter()
        .map(|(field, value)| format!("{field}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize, Debug)]
pub struct AckReport {
    pub command: &'static str,
    pub specifier: u8,
    pub camera_id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_time: Option<String>,
}

impl AckReport {
    pub fn new(command: &'static str, ack: &Ack) -> Self {
        Self {
            command,
            specifier: ack.command_specifier,
            camera_id: ack.camera_id,
            count: ack.count,
            file_time: ack.time.map(|(h, m)| format_time(h, m)),
        }
    }
}

impl Report for AckReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("command", self.command.to_string()),
            (
                "acked",
                format!(
                    "{:#04x} ({})",
                    self.specifier,
                    PROTOCOL.specifier_name(self.specifier)
                ),
            ),
            ("camera", self.camera_id.to_string()),
        ];
        if let Some(count) = self.count {
            rows.push(("count", count.to_string()));
        }
        if let Some(time) = &self.file_time {
            rows.push(("file_time", time.clone()));
        }
        rows
    }
}

#[derive(Serialize, Debug)]
pub struct PackageReport {
    pub camera_id: u8,
    pub file_time: String,
    pub package_number: u8,
    pub size_byte: u8,
    pub data_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
}

impl Report for PackageReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("camera", self.camera_id.to_string()),
            ("file_time", self.file_time.clone()),
            ("package", self.package_number.to_string()),
            ("size_byte", format!("{:#04x}", self.size_byte)),
            ("data_len", self.data_len.to_string()),
        ];
        if let Some(path) = &self.written_to {
            rows.push(("written_to", path.clone()));
        }
        rows
    }
}

#[derive(Serialize, Debug)]
pub struct FileReport {
    pub camera_id: u8,
    pub file_time: String,
    pub total_packages: u8,
    pub bytes: usize,
    pub written_to: String,
}

impl Report for FileReport {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("camera", self.camera_id.to_string()),
            ("file_time", self.file_time.clone()),
            ("packages", self.total_packages.to_string()),
            ("bytes", self.bytes.to_string()),
            ("written_to", self.written_to.clone()),
        ]
    }
}

pub fn format_time(hour: u8, minute: u8) -> String {
    format!("{hour:02}:{minute:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_report_omits_absent_fields() {
        let ack = Ack {
            command_specifier: 0x4F,
            camera_id: 1,
            count: None,
            time: None,
        };
        let json = serde_json::to_string(&AckReport::new("osd", &ack)).unwrap();
        assert_eq!(
            json,
            r#"{"command":"osd","specifier":79,"camera_id":1}"#
        );
    }

    #[test]
    fn timed_ack_rows() {
        let ack = Ack {
            command_specifier: 0x4D,
            camera_id: 2,
            count: Some(3),
            time: Some((9, 5)),
        };
        let line = pretty_line(&AckReport::new("next", &ack).rows());
        assert_eq!(
            line,
            "command=next acked=0x4d (GET_NEXT_FILE) camera=2 count=3 file_time=09:05"
        );
    }
}
