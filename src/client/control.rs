//! UI controls bound to commands.

use std::collections::HashMap;

use super::command_dispatcher::CommandDispatcher;
use crate::domain::CommandName;
use crate::error::ClientError;

/// Controls of the page, each bound to one fixed command.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    dispatcher: CommandDispatcher,
    bindings: HashMap<String, CommandName>,
}

impl ControlPanel {
    /// Creates a panel without controls.
    #[must_use]
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            dispatcher,
            bindings: HashMap::new(),
        }
    }

    /// Binds control `id` to `command`, replacing any earlier binding.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidCommand`] if `command` is not a valid
    /// path segment.
    pub fn bind(&mut self, id: impl Into<String>, command: &str) -> Result<(), ClientError> {
        let command =
            CommandName::new(command).map_err(|e| ClientError::InvalidCommand(e.0))?;
        self.bindings.insert(id.into(), command);
        Ok(())
    }

    /// Activates control `id`: sends its command once.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownControl`] if nothing is bound to `id`.
    pub fn activate(&self, id: &str) -> Result<(), ClientError> {
        let command = self
            .bindings
            .get(id)
            .ok_or_else(|| ClientError::UnknownControl(id.to_string()))?;
        self.dispatcher.send_command(command.as_str());
        Ok(())
    }

    /// Returns the command bound to `id`.
    #[must_use]
    pub fn command_for(&self, id: &str) -> Option<&CommandName> {
        self.bindings.get(id)
    }
}
