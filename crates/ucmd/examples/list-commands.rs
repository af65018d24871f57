//! Discover a device's commands and optionally run one.
//!
//! Run with:
//!   cargo run --example list-commands -- /dev/ttyACM0
//!   cargo run --example list-commands -- /dev/ttyACM0 blink 13 500

use std::time::Duration;

use ucmd::transport::DEFAULT_BAUD_RATE;
use ucmd::Arguments;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args
        .next()
        .ok_or("usage: list-commands <port> [command [params...]]")?;

    let mut registry = ucmd::open_serial(port, DEFAULT_BAUD_RATE);
    let count = registry.discover()?;
    println!("{count} command(s):");
    for spec in registry.commands() {
        println!("  [{}] {spec}", spec.wire_id());
    }

    if let Some(name) = args.next() {
        let params = Arguments::from_params(args)?;
        registry.set_response_wait(&name, Duration::from_millis(100))?;
        let response = registry.run(&name, &params)?;
        println!("{name} -> {}", String::from_utf8_lossy(&response));
    }

    Ok(())
}
