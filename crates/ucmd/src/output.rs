use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use ucmd_frame::TypeTag;
use ucmd_registry::CommandSpec;
use ucmd_transport::PortInfo;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ArgOutput<'a> {
    name: Option<&'a str>,
    code: char,
    type_name: Option<&'static str>,
    width: Option<usize>,
}

#[derive(Serialize)]
struct CommandOutput<'a> {
    wire_id: u8,
    name: &'a str,
    args: Vec<ArgOutput<'a>>,
}

#[derive(Serialize)]
struct CommandListOutput<'a> {
    port: &'a str,
    commands: Vec<CommandOutput<'a>>,
}

fn command_output(spec: &CommandSpec) -> CommandOutput<'_> {
    let names = spec.arg_names();
    let args = spec
        .type_codes()
        .chars()
        .enumerate()
        .map(|(i, code)| {
            let tag = TypeTag::from_code(code);
            ArgOutput {
                name: names.and_then(|names| names.get(i)).map(String::as_str),
                code,
                type_name: tag.map(TypeTag::name),
                width: tag.map(TypeTag::width),
            }
        })
        .collect();
    CommandOutput {
        wire_id: spec.wire_id(),
        name: spec.name(),
        args,
    }
}

pub fn print_commands<'a>(
    port: &str,
    commands: impl Iterator<Item = &'a CommandSpec>,
    descriptor: Option<&[u8]>,
    format: OutputFormat,
) {
    let commands: Vec<&CommandSpec> = commands.collect();
    match format {
        OutputFormat::Json => {
            let out = CommandListOutput {
                port,
                commands: commands.iter().map(|spec| command_output(spec)).collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "COMMAND", "ARGUMENTS"]);
            for spec in &commands {
                let rendered = spec.to_string();
                let arguments = rendered
                    .split_once('\t')
                    .map(|(_, args)| args.to_string())
                    .unwrap_or_default();
                table.add_row(vec![
                    spec.wire_id().to_string(),
                    spec.name().to_string(),
                    arguments,
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Available commands:");
            for spec in &commands {
                println!(" {spec}");
            }
        }
        OutputFormat::Raw => print_raw(descriptor.unwrap_or_default()),
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    description: String,
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|port| PortOutput {
                    name: &port.name,
                    description: port.description(),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "DEVICE"]);
            for port in ports {
                table.add_row(vec![port.name.clone(), port.description()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("No serial ports found.");
            }
            for port in ports {
                println!("{port}");
            }
        }
        OutputFormat::Raw => {
            for port in ports {
                println!("{}", port.name);
            }
        }
    }
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    command: &'a str,
    size: usize,
    response: String,
}

pub fn print_response(command: &str, response: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ResponseOutput {
                command,
                size: response.len(),
                response: response_preview(response),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "SIZE", "RESPONSE"])
                .add_row(vec![
                    command.to_string(),
                    response.len().to_string(),
                    response_preview(response),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "command={} size={} response={}",
                command,
                response.len(),
                response_preview(response)
            );
        }
        OutputFormat::Raw => print_raw(response),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Text responses are shown as text, anything else as hex bytes.
fn response_preview(response: &[u8]) -> String {
    match std::str::from_utf8(response) {
        Ok(text) if !text.contains(|c: char| c.is_control() && !c.is_whitespace()) => {
            text.trim_end().to_string()
        }
        _ => response
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_response_preview() {
        assert_eq!(response_preview(b"ok\r\n"), "ok");
    }

    #[test]
    fn binary_response_preview_is_hex() {
        assert_eq!(response_preview(&[0x01, 0xff, 0x00]), "01 ff 00");
    }

    #[test]
    fn command_output_describes_arguments() {
        let spec = CommandSpec::new(1, "move", "hq", Some(vec!["x".into(), "y".into()])).unwrap();
        let out = command_output(&spec);
        assert_eq!(out.wire_id, 1);
        assert_eq!(out.args[0].name, Some("x"));
        assert_eq!(out.args[0].type_name, Some("SIGNED_SHORT_INT"));
        assert_eq!(out.args[0].width, Some(2));
        assert_eq!(out.args[1].type_name, None);

        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"name\":\"move\""));
    }
}
