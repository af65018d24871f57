use std::fmt;
use std::io;

use ucmd_frame::FrameError;
use ucmd_registry::RegistryError;
use ucmd_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

fn serial_code(err: &serialport::Error) -> i32 {
    match err.kind() {
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
        serialport::ErrorKind::Io(io::ErrorKind::TimedOut) => TIMEOUT,
        serialport::ErrorKind::InvalidInput => USAGE,
        _ => TRANSPORT_ERROR,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::Open { ref source, .. }
        | TransportError::Enumerate(ref source)
        | TransportError::Serial(ref source) => {
            CliError::new(serial_code(source), format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::InvalidLiteral(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn registry_error(context: &str, err: RegistryError) -> CliError {
    match err {
        RegistryError::Transport(err) => transport_error(context, err),
        RegistryError::Frame(err) => frame_error(context, err),
        RegistryError::UnknownCommand(_) | RegistryError::Validation(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        RegistryError::DuplicateCommand(_)
        | RegistryError::TooManyCommands { .. }
        | RegistryError::InvalidCommand { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucmd_registry::ValidationError;

    #[test]
    fn missing_device_is_a_transport_failure() {
        let err = TransportError::Open {
            port: "/dev/ttyNOPE".into(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
        };
        let cli = transport_error("discovery failed", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("discovery failed: failed to open /dev/ttyNOPE"));
    }

    #[test]
    fn permission_denied_is_reported_as_such() {
        let err = TransportError::Open {
            port: "/dev/ttyS0".into(),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                "denied",
            ),
        };
        assert_eq!(transport_error("x", err).code, PERMISSION_DENIED);
    }

    #[test]
    fn caller_mistakes_map_to_failure() {
        let err = RegistryError::UnknownCommand("fly".into());
        assert_eq!(registry_error("run failed", err).code, FAILURE);

        let err = RegistryError::Validation(ValidationError::ArgumentCount {
            expected: 2,
            received: 1,
        });
        let cli = registry_error("run failed", err);
        assert_eq!(cli.code, FAILURE);
        assert_eq!(
            cli.message,
            "run failed: wrong argument count: expected 2 (got 1)"
        );
    }

    #[test]
    fn bad_device_data_maps_to_data_invalid() {
        let err = RegistryError::DuplicateCommand("led".into());
        assert_eq!(registry_error("discovery failed", err).code, DATA_INVALID);

        let err = RegistryError::Frame(FrameError::UnknownTypeTag('q'));
        assert_eq!(registry_error("run failed", err).code, DATA_INVALID);
    }

    #[test]
    fn poisoned_lock_is_internal() {
        assert_eq!(registry_error("x", RegistryError::Poisoned).code, INTERNAL);
    }
}
