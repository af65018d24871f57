use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;
use ucmd_frame::{encode_frame, parse_type_codes, Frame, FrameError, TypeTag, Value};
use ucmd_transport::{Transport, TransportSession};

use crate::args::Arguments;
use crate::descriptor::Advertisement;
use crate::error::{RegistryError, Result, ValidationError};

/// One command advertised by the device.
///
/// Everything but the response wait is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    wire_id: u8,
    name: String,
    type_codes: String,
    arg_names: Option<Vec<String>>,
    response_wait: Duration,
}

impl CommandSpec {
    /// Build a command.
    ///
    /// `arg_names`, when present and non-empty, must hold one name per type
    /// code. An empty list is the same as no names.
    pub fn new(
        wire_id: u8,
        name: impl Into<String>,
        type_codes: impl Into<String>,
        arg_names: Option<Vec<String>>,
    ) -> Result<Self> {
        let name = name.into();
        let type_codes = type_codes.into();
        let arg_names = arg_names.filter(|names| !names.is_empty());

        if name.is_empty() {
            return Err(RegistryError::InvalidCommand {
                name,
                reason: "empty command name".to_string(),
            });
        }
        if let Some(names) = &arg_names {
            let arity = type_codes.chars().count();
            if names.len() != arity {
                return Err(RegistryError::InvalidCommand {
                    name,
                    reason: format!("{} argument names for {arity} types", names.len()),
                });
            }
        }

        Ok(Self {
            wire_id,
            name,
            type_codes,
            arg_names,
            response_wait: Duration::ZERO,
        })
    }

    /// Build a command from a parsed descriptor line.
    pub fn from_advertisement(wire_id: u8, advertisement: Advertisement) -> Result<Self> {
        Self::new(
            wire_id,
            advertisement.name,
            advertisement.type_codes,
            advertisement.arg_names,
        )
    }

    pub(crate) fn with_wire_id(mut self, wire_id: u8) -> Self {
        self.wire_id = wire_id;
        self
    }

    /// Set how long to wait for a response after sending.
    pub fn with_response_wait(mut self, wait: Duration) -> Self {
        self.response_wait = wait;
        self
    }

    pub fn wire_id(&self) -> u8 {
        self.wire_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw type codes as advertised.
    pub fn type_codes(&self) -> &str {
        &self.type_codes
    }

    /// Declared argument types. Fails if the device advertised a code
    /// outside the type table.
    pub fn arg_types(&self) -> std::result::Result<Vec<TypeTag>, FrameError> {
        parse_type_codes(&self.type_codes)
    }

    pub fn arg_names(&self) -> Option<&[String]> {
        self.arg_names.as_deref()
    }

    /// Number of declared arguments.
    pub fn arity(&self) -> usize {
        self.type_codes.chars().count()
    }

    /// Time to wait for a response after sending. Zero means no response is read.
    pub fn response_wait(&self) -> Duration {
        self.response_wait
    }

    pub fn set_response_wait(&mut self, wait: Duration) {
        self.response_wait = wait;
    }

    /// Check that `args` fit this command.
    ///
    /// The total count must match the declared count, and named arguments
    /// (if any) must name exactly the declared arguments. Values are not
    /// range-checked here; encoding does that.
    pub fn validate(&self, args: &Arguments) -> std::result::Result<(), ValidationError> {
        let expected = self.arity();
        let received = args.len();
        if received != expected {
            return Err(ValidationError::ArgumentCount { expected, received });
        }

        if args.named_values().is_empty() {
            return Ok(());
        }

        let declared: BTreeSet<&str> = self
            .arg_names()
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();
        let supplied: BTreeSet<&str> = args.named_values().keys().map(String::as_str).collect();
        if declared != supplied {
            return Err(ValidationError::ArgumentNames {
                unexpected: supplied
                    .difference(&declared)
                    .map(|s| s.to_string())
                    .collect(),
                missing: declared
                    .difference(&supplied)
                    .map(|s| s.to_string())
                    .collect(),
            });
        }

        Ok(())
    }

    /// Resolve `args` to one value per declared argument.
    ///
    /// Each position takes its positional value (or zero), then a named value
    /// for that position's name overrides it.
    pub fn bind(&self, args: &Arguments) -> Vec<Value> {
        let positional = args.positional_values();
        let named = args.named_values();

        (0..self.arity())
            .map(|i| {
                let named_value = self
                    .arg_names
                    .as_ref()
                    .and_then(|names| names.get(i))
                    .and_then(|name| named.get(name));
                named_value
                    .or_else(|| positional.get(i))
                    .copied()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Bind `args` and pack them into a frame. Does not validate.
    pub fn encode(&self, args: &Arguments) -> std::result::Result<Frame, FrameError> {
        let types = self.arg_types()?;
        encode_frame(self.wire_id, &types, &self.bind(args))
    }

    /// Validate, encode and send this command over `transport`.
    ///
    /// The transport is opened for this call only and closed on every path.
    /// With a non-zero response wait, the bytes available after the wait are
    /// returned; otherwise the response is empty. Nothing is sent if
    /// validation or encoding fails.
    pub fn run<T: Transport + ?Sized>(&self, transport: &mut T, args: &Arguments) -> Result<Bytes> {
        self.validate(args)?;
        let wire = self.encode(args)?.to_bytes();

        let mut session = TransportSession::acquire(transport)?;
        session.write(&wire)?;
        let response = if self.response_wait.is_zero() {
            Bytes::new()
        } else {
            std::thread::sleep(self.response_wait);
            session.read_available()?
        };
        session.release()?;

        debug!(
            command = %self.name,
            wire_id = self.wire_id,
            sent = wire.len(),
            received = response.len(),
            "ran command"
        );
        Ok(response)
    }

    /// Multi-line help text for this command.
    pub fn usage(&self) -> String {
        let mut text = format!("Runs the {} command on the device.\n", self.name);
        if self.arity() == 0 {
            text.push_str("\nTakes no parameters.\n");
            return text;
        }

        text.push_str("\nParameters\n----------\n");
        for (i, code) in self.type_codes.chars().enumerate() {
            let name = self
                .arg_names
                .as_ref()
                .and_then(|names| names.get(i))
                .map(String::as_str)
                .unwrap_or("");
            text.push_str(&format!("{name} : {}\n", describe_type(code)));
        }
        text
    }
}

fn describe_type(code: char) -> String {
    match TypeTag::from_code(code) {
        Some(tag) => format!("{}({})", tag.name(), tag.width()),
        None => format!("UNKNOWN[{code}](?)"),
    }
}

/// Listing form: `name<TAB>arg:TYPE(width), ...`.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t", self.name)?;
        for (i, code) in self.type_codes.chars().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(name) = self.arg_names.as_ref().and_then(|names| names.get(i)) {
                write!(f, "{name}:")?;
            }
            f.write_str(&describe_type(code))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ucmd_frame::decode_args;
    use ucmd_transport::{MemoryTransport, TransportError};

    use super::*;

    fn mv() -> CommandSpec {
        CommandSpec::new(0, "move", "hh", Some(vec!["x".into(), "y".into()])).unwrap()
    }

    #[test]
    fn name_count_must_match_type_count() {
        let err = CommandSpec::new(0, "move", "hh", Some(vec!["x".into()])).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCommand { .. }));
    }

    #[test]
    fn empty_name_list_means_no_names() {
        let spec = CommandSpec::new(0, "go", "bb", Some(vec![])).unwrap();
        assert_eq!(spec.arg_names(), None);
    }

    #[test]
    fn empty_command_name_is_rejected() {
        assert!(matches!(
            CommandSpec::new(0, "", "", None),
            Err(RegistryError::InvalidCommand { .. })
        ));
    }

    #[test]
    fn bind_positional() {
        let args = Arguments::positional([1, 2]);
        assert_eq!(mv().bind(&args), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn bind_named_fills_zero_defaults() {
        let args = Arguments::new().named_arg("x", 5);
        assert_eq!(mv().bind(&args), vec![Value::Int(5), Value::Int(0)]);
    }

    #[test]
    fn bind_named_overrides_positional() {
        let args = Arguments::positional([1, 2]).named_arg("y", 9);
        assert_eq!(mv().bind(&args), vec![Value::Int(1), Value::Int(9)]);
    }

    #[test]
    fn bind_ignores_names_on_unnamed_command() {
        let spec = CommandSpec::new(0, "go", "bb", None).unwrap();
        let args = Arguments::positional([4]).named_arg("x", 5);
        assert_eq!(spec.bind(&args), vec![Value::Int(4), Value::Int(0)]);
    }

    #[test]
    fn validate_rejects_missing_arguments() {
        let err = mv().validate(&Arguments::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ArgumentCount {
                expected: 2,
                received: 0
            }
        );
        assert!(err.to_string().contains("expected 2"));
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn validate_rejects_unknown_names() {
        let args = Arguments::new().named_arg("z", 1).named_arg("y", 2);
        let err = mv().validate(&args).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ArgumentNames {
                unexpected: vec!["z".to_string()],
                missing: vec!["x".to_string()],
            }
        );
        assert!(err.to_string().contains('z'));
    }

    #[test]
    fn validate_rejects_partial_names() {
        let args = Arguments::positional([1]).named_arg("y", 2);
        let err = mv().validate(&args).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ArgumentNames {
                unexpected: vec![],
                missing: vec!["x".to_string()],
            }
        );
    }

    #[test]
    fn validate_accepts_exact_calls() {
        assert!(mv().validate(&Arguments::positional([1, 2])).is_ok());
        assert!(mv()
            .validate(&Arguments::new().named_arg("y", 2).named_arg("x", 1))
            .is_ok());
    }

    #[test]
    fn zero_arg_command_accepts_nothing_else() {
        let spec = CommandSpec::new(3, "reset", "", None).unwrap();
        assert!(spec.validate(&Arguments::new()).is_ok());
        assert!(matches!(
            spec.validate(&Arguments::positional([1])),
            Err(ValidationError::ArgumentCount {
                expected: 0,
                received: 1
            })
        ));
    }

    #[test]
    fn names_on_unnamed_command_are_unexpected() {
        let spec = CommandSpec::new(0, "go", "b", None).unwrap();
        let err = spec.validate(&Arguments::new().named_arg("x", 1)).unwrap_err();
        assert!(matches!(err, ValidationError::ArgumentNames { ref unexpected, .. } if unexpected == &["x"]));
    }

    #[test]
    fn encode_one_byte_arguments() {
        let spec = CommandSpec::new(4, "move", "bb", Some(vec!["x".into(), "y".into()])).unwrap();
        let frame = spec.encode(&Arguments::positional([1, 2])).unwrap();
        assert_eq!(frame.to_bytes().as_ref(), &[4, 0x01, 0x02]);
    }

    #[test]
    fn encode_short_arguments() {
        let frame = mv().encode(&Arguments::positional([1, 2])).unwrap();
        assert_eq!(frame.to_bytes().as_ref(), &[0, 0x01, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn encode_fails_on_unknown_type_code() {
        let spec = CommandSpec::new(0, "odd", "hq", None).unwrap();
        assert_eq!(
            spec.encode(&Arguments::positional([1, 2])),
            Err(FrameError::UnknownTypeTag('q'))
        );
    }

    #[test]
    fn run_sends_frame_and_closes() {
        let mut stub = MemoryTransport::new("stub");
        let spec = mv();
        let response = spec.run(&mut stub, &Arguments::positional([-1, 300])).unwrap();

        assert!(response.is_empty());
        assert_eq!(stub.writes().len(), 1);
        let wire = stub.last_write().unwrap();
        assert_eq!(wire[0], 0);
        assert_eq!(
            decode_args(&spec.arg_types().unwrap(), &wire[1..]).unwrap(),
            vec![Value::Int(-1), Value::Int(300)]
        );
        assert_eq!(stub.open_count(), 1);
        assert_eq!(stub.close_count(), 1);
        assert_eq!(stub.read_count(), 0);
    }

    #[test]
    fn run_zero_arg_command_sends_id_byte() {
        let mut stub = MemoryTransport::new("stub");
        let spec = CommandSpec::new(5, "reset", "", None).unwrap();
        spec.run(&mut stub, &Arguments::new()).unwrap();
        assert_eq!(stub.last_write().unwrap().as_ref(), &[5]);
    }

    #[test]
    fn run_reads_response_after_wait() {
        let mut stub = MemoryTransport::new("stub").with_reply(2, &b"ok\n"[..]);
        let spec = CommandSpec::new(2, "status", "", None)
            .unwrap()
            .with_response_wait(Duration::from_millis(1));

        let response = spec.run(&mut stub, &Arguments::new()).unwrap();
        assert_eq!(response.as_ref(), b"ok\n");
        assert_eq!(stub.read_count(), 1);
    }

    #[test]
    fn invalid_arguments_send_nothing() {
        let mut stub = MemoryTransport::new("stub");
        let err = mv().run(&mut stub, &Arguments::positional([1])).unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let err = mv().run(&mut stub, &Arguments::positional([1, 70000])).unwrap_err();
        assert!(matches!(err, RegistryError::Frame(FrameError::OutOfRange { .. })));

        assert!(stub.writes().is_empty());
        assert_eq!(stub.open_count(), 0);
    }

    #[test]
    fn transport_failure_still_closes() {
        let mut stub = MemoryTransport::new("stub");
        stub.set_write_failure(Some(std::io::ErrorKind::BrokenPipe));

        let err = mv().run(&mut stub, &Arguments::positional([1, 2])).unwrap_err();
        assert!(matches!(err, RegistryError::Transport(TransportError::Io(_))));
        assert!(!stub.is_open());
        assert_eq!(stub.close_count(), 1);
    }

    #[test]
    fn display_lists_names_and_types() {
        assert_eq!(
            mv().to_string(),
            "move\tx:SIGNED_SHORT_INT(2), y:SIGNED_SHORT_INT(2)"
        );
        let spec = CommandSpec::new(1, "led", "Bf", None).unwrap();
        assert_eq!(spec.to_string(), "led\tUNSIGNED_CHAR(1), FLOAT(4)");
        let spec = CommandSpec::new(2, "reset", "", None).unwrap();
        assert_eq!(spec.to_string(), "reset\t");
    }

    #[test]
    fn usage_documents_parameters() {
        let text = mv().usage();
        assert!(text.starts_with("Runs the move command"));
        assert!(text.contains("x : SIGNED_SHORT_INT(2)"));
        assert!(text.contains("y : SIGNED_SHORT_INT(2)"));

        let reset = CommandSpec::new(2, "reset", "", None).unwrap();
        assert!(reset.usage().contains("Takes no parameters."));
    }
}
