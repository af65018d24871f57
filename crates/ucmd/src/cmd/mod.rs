use std::time::Duration;

use clap::{Args, Subcommand};
use ucmd_registry::{CommandRegistry, RegistryConfig};
use ucmd_transport::{SerialTransport, DEFAULT_BAUD_RATE};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod discover;
pub mod ports;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports on this machine.
    Ports(PortsArgs),
    /// Ask the device for its commands and print them.
    Discover(DiscoverArgs),
    /// Run one device command.
    Run(RunArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Discover(args) => discover::run(args, link, format),
        Command::Run(args) => run::run(args, link, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the device is and how to talk to it.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial port of the device (e.g. /dev/ttyACM0, COM3).
    #[arg(long, short = 'p', env = "UCMD_PORT", global = true)]
    pub port: Option<String>,
    /// Serial baud rate.
    #[arg(long, short = 'b', env = "UCMD_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Time to let the device answer a discovery request (e.g. 50ms, 1s).
    #[arg(long, default_value = "50ms", global = true)]
    pub settle: String,
}

impl LinkArgs {
    /// A registry on the configured port. Fails with a usage error when no
    /// port was given.
    pub fn registry(&self) -> CliResult<CommandRegistry<SerialTransport>> {
        let port = self.port.as_deref().ok_or_else(|| {
            CliError::new(
                USAGE,
                "no serial port given: pass --port or set UCMD_PORT (see `ucmd ports`)",
            )
        })?;
        let config = RegistryConfig {
            settle_interval: parse_duration(&self.settle)?,
            ..RegistryConfig::default()
        };
        Ok(CommandRegistry::with_config(
            SerialTransport::new(port, self.baud),
            config,
        ))
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Print detailed help for this command only.
    pub command: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the command to run.
    pub command: String,
    /// Command parameters in order; use name=value for named parameters.
    #[arg(allow_negative_numbers = true)]
    pub params: Vec<String>,
    /// Wait this long for the device to answer and print the reply (e.g. 200ms).
    #[arg(long)]
    pub wait: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "s" => Duration::from_secs(value),
        _ => Duration::from_millis(value),
    })
}
