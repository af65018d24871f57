use std::sync::{Arc, Mutex};

use bytes::Bytes;
use ucmd_transport::Transport;

use crate::args::Arguments;
use crate::error::{RegistryError, Result};
use crate::registry::CommandRegistry;

/// A [`CommandRegistry`] shared between threads.
///
/// Each call holds the registry lock for its whole device round trip, so
/// invocations from different threads are serialized rather than interleaved
/// on the link.
pub struct SharedRegistry<T> {
    inner: Arc<Mutex<CommandRegistry<T>>>,
}

impl<T> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedRegistry<T> {
    pub fn new(registry: CommandRegistry<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Run `f` with exclusive access to the registry.
    pub fn with_registry<R>(
        &self,
        f: impl FnOnce(&mut CommandRegistry<T>) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.inner.lock().map_err(|_| RegistryError::Poisoned)?;
        f(&mut guard)
    }

    /// See [`CommandRegistry::discover`].
    pub fn discover(&self) -> Result<usize> {
        self.with_registry(|registry| registry.discover())
    }

    /// See [`CommandRegistry::validate`].
    pub fn validate(&self, name: &str, args: &Arguments) -> Result<()> {
        self.with_registry(|registry| registry.validate(name, args))
    }

    /// See [`CommandRegistry::run`].
    pub fn run(&self, name: &str, args: &Arguments) -> Result<Bytes> {
        self.with_registry(|registry| registry.run(name, args))
    }
}
