use tracing::info;
use ucmd_registry::Arguments;

use crate::cmd::{parse_duration, LinkArgs, RunArgs};
use crate::exit::{frame_error, registry_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_response, OutputFormat};

pub fn run(args: RunArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = args.wait.as_deref().map(parse_duration).transpose()?;
    let params = Arguments::from_params(&args.params)
        .map_err(|err| frame_error("invalid parameter", err))?;

    let mut registry = link.registry()?;
    registry
        .discover()
        .map_err(|err| registry_error("discovery failed", err))?;

    let Some(spec) = registry.get(&args.command) else {
        return Err(CliError::new(
            FAILURE,
            format!(
                "unknown command {} (available: {})",
                args.command,
                registry.names().collect::<Vec<_>>().join(", ")
            ),
        ));
    };
    if let Err(err) = spec.validate(&params) {
        return Err(CliError::new(
            FAILURE,
            format!("{err}\n\n{}", spec.usage()),
        ));
    }

    if let Some(wait) = wait {
        registry
            .set_response_wait(&args.command, wait)
            .map_err(|err| registry_error("run failed", err))?;
    }

    let response = registry
        .run(&args.command, &params)
        .map_err(|err| registry_error("run failed", err))?;
    info!(command = %args.command, response = response.len(), "command sent");

    if wait.is_some() {
        print_response(&args.command, &response, format);
    }
    Ok(SUCCESS)
}
