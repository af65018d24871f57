use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("ucmd {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!(
        "target: {}",
        option_env!("UCMD_BUILD_TARGET").unwrap_or(std::env::consts::ARCH)
    );
    println!("os: {}", std::env::consts::OS);
    println!(
        "type codes: {}",
        ucmd_frame::TypeTag::ALL
            .iter()
            .map(|tag| tag.code().to_string())
            .collect::<String>()
    );
    println!(
        "discovery: request 0x{:02X}, settle {:?}",
        ucmd_frame::DISCOVERY_REQUEST,
        ucmd_frame::DISCOVERY_SETTLE
    );
    Ok(SUCCESS)
}
