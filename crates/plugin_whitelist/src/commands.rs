//! Administrative commands: add, remove and toggle.

use crate::config::{GateConfig, TOGGLE_COMMAND};
use crate::types::{GateState, Identity};

/// The three commands the gate answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    Add,
    Remove,
    Toggle,
}

/// Command names as registered with the host.
#[derive(Debug, Clone)]
pub struct CommandSet {
    pub add: String,
    pub remove: String,
    pub toggle: String,
}

impl CommandSet {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            add: config.add_command.clone(),
            remove: config.remove_command.clone(),
            toggle: TOGGLE_COMMAND.to_string(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<GateCommand> {
        if name == self.add {
            Some(GateCommand::Add)
        } else if name == self.remove {
            Some(GateCommand::Remove)
        } else if name == self.toggle {
            Some(GateCommand::Toggle)
        } else {
            None
        }
    }
}

/// What the host should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Send these lines back to the invoker
    Reply(Vec<String>),
    /// Nothing to say (missing argument, duplicate add, unknown identity)
    Silent,
    /// The invoker lacks the command permission
    PermissionDenied,
    /// Not one of the gate's commands
    Unknown,
}

/// Extract the single identity argument. Anything other than exactly one
/// whitespace-separated token yields `None`.
pub fn parse_identity(raw_args: &str) -> Option<Identity> {
    let mut tokens = raw_args.split_whitespace();
    let identity = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(Identity::from(identity))
}

pub(crate) fn added_reply(identity: &Identity) -> CommandOutcome {
    CommandOutcome::Reply(vec![format!("Added {identity} to the list.")])
}

pub(crate) fn removed_reply(identity: &Identity) -> CommandOutcome {
    CommandOutcome::Reply(vec![format!("Removed {identity} from the list.")])
}

pub(crate) fn toggled_reply(state: GateState) -> CommandOutcome {
    CommandOutcome::Reply(vec![
        format!("Whitelist is now {state}."),
        "The state survives map changes and resets to disabled when the server restarts."
            .to_string(),
    ])
}
