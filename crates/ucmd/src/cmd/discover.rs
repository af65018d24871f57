use ucmd_transport::Transport;

use crate::cmd::{DiscoverArgs, LinkArgs};
use crate::exit::{registry_error, CliResult, SUCCESS};
use crate::output::{print_commands, OutputFormat};

pub fn run(args: DiscoverArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut registry = link.registry()?;
    registry
        .discover()
        .map_err(|err| registry_error("discovery failed", err))?;

    if let Some(name) = &args.command {
        let spec = registry
            .command(name)
            .map_err(|err| registry_error("help failed", err))?;
        print!("{}", spec.usage());
        return Ok(SUCCESS);
    }

    print_commands(
        registry.transport().port_name(),
        registry.commands(),
        registry.descriptor().map(|descriptor| descriptor.as_ref()),
        format,
    );
    Ok(SUCCESS)
}
