use std::time::Duration;

use ucmd_frame::{DISCOVERY_SETTLE, MAX_WIRE_ID};

/// Controls discovery and invocation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Wait between the discovery request and reading the descriptor.
    pub settle_interval: Duration,
    /// Response wait given to every newly registered command. Zero: don't wait.
    pub default_response_wait: Duration,
    /// Maximum number of commands. Never more than the wire id space.
    pub max_commands: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            settle_interval: DISCOVERY_SETTLE,
            default_response_wait: Duration::ZERO,
            max_commands: usize::from(MAX_WIRE_ID) + 1,
        }
    }
}
