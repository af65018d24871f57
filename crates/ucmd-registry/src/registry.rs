use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};
use ucmd_frame::{DISCOVERY_REQUEST, MAX_WIRE_ID};
use ucmd_transport::{Transport, TransportSession};

use crate::args::Arguments;
use crate::command::CommandSpec;
use crate::config::RegistryConfig;
use crate::descriptor::parse_descriptor;
use crate::error::{RegistryError, Result};

/// Host-side session with one device.
///
/// Owns the transport and the command table. The table is filled by
/// [`CommandRegistry::discover`] (once; later calls reuse the cached
/// descriptor) or by [`CommandRegistry::add_command`]. Wire ids are dense and
/// follow registration order.
///
/// Every operation that touches the device takes `&mut self`, so one
/// registry runs at most one invocation at a time. Use
/// [`crate::SharedRegistry`] to share a registry between threads.
pub struct CommandRegistry<T> {
    transport: T,
    config: RegistryConfig,
    descriptor: Option<Bytes>,
    commands: Vec<CommandSpec>,
    index: HashMap<String, usize>,
}

impl<T: Transport> CommandRegistry<T> {
    /// Create an empty registry with default config.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(transport: T, config: RegistryConfig) -> Self {
        Self {
            transport,
            config,
            descriptor: None,
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Ask the device for its descriptor and register every command in it.
    ///
    /// Only the first successful discovery talks to the device; after that
    /// this is a no-op until [`CommandRegistry::clear_cache`] is called.
    /// Returns the number of registered commands.
    ///
    /// Registration is all-or-nothing: on a duplicate name or an exhausted
    /// id space nothing from this descriptor is kept and it is not cached.
    pub fn discover(&mut self) -> Result<usize> {
        if self.descriptor.is_some() {
            debug!("descriptor cached; skipping discovery");
            return Ok(self.commands.len());
        }

        let descriptor = self.fetch_descriptor()?;
        debug!(len = descriptor.len(), "received descriptor");

        let mut staged: Vec<CommandSpec> = Vec::new();
        for advertisement in parse_descriptor(&descriptor) {
            // Malformed lines are dropped before they can clash with a real command.
            let spec = match CommandSpec::from_advertisement(0, advertisement) {
                Ok(spec) => spec,
                Err(err) => {
                    warn!(%err, "ignoring advertisement");
                    continue;
                }
            };
            if self.index.contains_key(spec.name())
                || staged.iter().any(|other| other.name() == spec.name())
            {
                return Err(RegistryError::DuplicateCommand(spec.name().to_string()));
            }

            let wire_id = self.wire_id_at(self.commands.len() + staged.len())?;
            staged.push(
                spec.with_wire_id(wire_id)
                    .with_response_wait(self.config.default_response_wait),
            );
        }

        for spec in staged {
            self.insert(spec);
        }
        if !descriptor.is_empty() {
            self.descriptor = Some(descriptor);
        }

        info!(
            port = %self.transport.port_name(),
            commands = self.commands.len(),
            "discovery complete"
        );
        Ok(self.commands.len())
    }

    fn fetch_descriptor(&mut self) -> Result<Bytes> {
        let mut session = TransportSession::acquire(&mut self.transport)?;
        session.write(&[DISCOVERY_REQUEST])?;
        std::thread::sleep(self.config.settle_interval);
        let descriptor = session.read_available()?;
        session.release()?;
        Ok(descriptor)
    }

    fn wire_id_at(&self, position: usize) -> Result<u8> {
        let max = self.config.max_commands.min(usize::from(MAX_WIRE_ID) + 1);
        if position >= max {
            return Err(RegistryError::TooManyCommands { max });
        }
        u8::try_from(position).map_err(|_| RegistryError::TooManyCommands { max })
    }

    fn insert(&mut self, spec: CommandSpec) {
        self.index.insert(spec.name().to_string(), self.commands.len());
        self.commands.push(spec);
    }

    /// Register a command by hand, taking the next wire id.
    ///
    /// Fails with [`RegistryError::DuplicateCommand`] if the name is taken;
    /// the existing entry is left unchanged.
    pub fn add_command(
        &mut self,
        name: &str,
        type_codes: &str,
        arg_names: Option<Vec<String>>,
    ) -> Result<&CommandSpec> {
        if self.index.contains_key(name) {
            return Err(RegistryError::DuplicateCommand(name.to_string()));
        }
        let wire_id = self.wire_id_at(self.commands.len())?;
        let spec = CommandSpec::new(wire_id, name, type_codes, arg_names)?
            .with_response_wait(self.config.default_response_wait);
        self.insert(spec);
        Ok(&self.commands[self.commands.len() - 1])
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// Look up a command by name for changing its response wait.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut CommandSpec> {
        let i = *self.index.get(name)?;
        self.commands.get_mut(i)
    }

    /// Look up a command by name, failing with [`RegistryError::UnknownCommand`].
    pub fn command(&self, name: &str) -> Result<&CommandSpec> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))
    }

    /// Commands in wire-id order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter()
    }

    /// Command names in wire-id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(CommandSpec::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The cached descriptor, if discovery has succeeded.
    pub fn descriptor(&self) -> Option<&Bytes> {
        self.descriptor.as_ref()
    }

    /// Forget the cached descriptor and every registered command so the next
    /// [`CommandRegistry::discover`] talks to the device again.
    pub fn clear_cache(&mut self) {
        self.descriptor = None;
        self.commands.clear();
        self.index.clear();
    }

    /// Set the response wait of a registered command.
    pub fn set_response_wait(&mut self, name: &str, wait: Duration) -> Result<()> {
        self.get_mut(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))?
            .set_response_wait(wait);
        Ok(())
    }

    /// Check `args` against the named command without sending anything.
    pub fn validate(&self, name: &str, args: &Arguments) -> Result<()> {
        self.command(name)?.validate(args)?;
        Ok(())
    }

    /// Run the named command. See [`CommandSpec::run`].
    pub fn run(&mut self, name: &str, args: &Arguments) -> Result<Bytes> {
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))?;
        self.commands[i].run(&mut self.transport, args)
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T> std::fmt::Debug for CommandRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands)
            .field("config", &self.config)
            .field("cached", &self.descriptor.is_some())
            .finish()
    }
}
