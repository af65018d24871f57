use ucmd_frame::FrameError;
use ucmd_transport::TransportError;

/// Why a set of arguments does not fit a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Positional plus named arguments do not add up to the declared count.
    #[error("wrong argument count: expected {expected} (got {received})")]
    ArgumentCount { expected: usize, received: usize },

    /// The supplied names are not exactly the declared names.
    #[error("{}", describe_name_mismatch(.unexpected, .missing))]
    ArgumentNames {
        unexpected: Vec<String>,
        missing: Vec<String>,
    },
}

fn describe_name_mismatch(unexpected: &[String], missing: &[String]) -> String {
    if unexpected.is_empty() {
        format!("missing argument name(s): {}", missing.join(","))
    } else {
        format!("unknown argument name(s): {}", unexpected.join(","))
    }
}

/// Errors that can occur in registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No command with this name was discovered or registered.
    #[error("unknown command {0}")]
    UnknownCommand(String),

    /// A command with this name is already registered.
    #[error("duplicate command {0}")]
    DuplicateCommand(String),

    /// Every wire id is taken.
    #[error("too many commands (max {max})")]
    TooManyCommands { max: usize },

    /// The advertisement cannot describe a usable command.
    #[error("invalid command {name:?}: {reason}")]
    InvalidCommand { name: String, reason: String },

    /// Arguments rejected before anything was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Arguments could not be packed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The link failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A thread panicked while holding a shared registry.
    #[error("registry lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, RegistryError>;
