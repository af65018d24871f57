use ucmd_transport::list_ports;

use crate::cmd::PortsArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = list_ports().map_err(|err| transport_error("listing ports failed", err))?;
    tracing::debug!(count = ports.len(), "enumerated serial ports");
    print_ports(&ports, format);
    Ok(SUCCESS)
}
