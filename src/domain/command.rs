//! Type-safe command name.
//!
//! [`CommandName`] is everything after `/api/` in `POST /api/<name>`,
//! nested segments included. It is validated once so that handlers and the
//! dispatcher never deal with raw strings that could change the request
//! query or fragment.

use std::fmt;
use std::str::FromStr;

/// Command that starts an execution on the panel.
pub const EXECUTE_COMMAND: &str = "execute";

/// Validated `/api/<name>` command name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandName(String);

/// Reason a command name was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid command name {0:?}")]
pub struct InvalidCommandName(pub String);

impl CommandName {
    /// Validates and wraps a command name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCommandName`] if the name is empty or contains
    /// `?`, `#` or a control character.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidCommandName> {
        let name = name.into();
        let valid = !name.is_empty()
            && !name
                .chars()
                .any(|c| matches!(c, '?' | '#') || c.is_control());
        if valid {
            Ok(Self(name))
        } else {
            Err(InvalidCommandName(name))
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the `execute` command.
    #[must_use]
    pub fn is_execute(&self) -> bool {
        self.0 == EXECUTE_COMMAND
    }
}

impl FromStr for CommandName {
    type Err = InvalidCommandName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
