//! Gate configuration.
//!
//! The gate reads its settings from the `[gate]` table of the host's
//! configuration file. Every setting except `mode` has a default; `mode`
//! must be spelled out so the policy is always an explicit operator choice.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{GateMode, RejectReason};

/// Fixed name of the command that flips the gate switch.
pub const TOGGLE_COMMAND: &str = "whitelist";

fn default_add_command() -> String {
    "wl".to_string()
}

fn default_remove_command() -> String {
    "uwl".to_string()
}

fn default_command_permission() -> String {
    "admin.ban".to_string()
}

fn default_admin_exempt_permission() -> String {
    "admin.immunity".to_string()
}

fn default_storage_file() -> String {
    "whitelist.txt".to_string()
}

fn default_not_on_allow_list() -> String {
    "The whitelist is enabled and you are not on the allowed list.".to_string()
}

fn default_on_deny_list() -> String {
    "You are on the blacklist and may not join.".to_string()
}

/// Settings of the whitelist gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Gate policy: 1 = allow-list, 2 = deny-list
    pub mode: GateMode,
    /// Name of the command adding an identity to the list
    #[serde(default = "default_add_command")]
    pub add_command: String,
    /// Name of the command removing an identity from the list
    #[serde(default = "default_remove_command")]
    pub remove_command: String,
    /// Capability required to run any gate command
    #[serde(default = "default_command_permission")]
    pub command_permission: String,
    /// Capability that lets its holder bypass the gate
    #[serde(default = "default_admin_exempt_permission")]
    pub admin_exempt_permission: String,
    /// File name of the identity list, relative to the data directory
    #[serde(default = "default_storage_file")]
    pub storage_file: String,
    /// Confirm admissions one host tick after the connection event
    #[serde(default)]
    pub defer_permission_check: bool,
    /// Disconnect texts shown to refused participants
    #[serde(default)]
    pub messages: GateMessages,
}

/// Human-readable disconnect texts, one per rejection reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateMessages {
    #[serde(default = "default_not_on_allow_list")]
    pub not_on_allow_list: String,
    #[serde(default = "default_on_deny_list")]
    pub on_deny_list: String,
}

impl Default for GateMessages {
    fn default() -> Self {
        Self {
            not_on_allow_list: default_not_on_allow_list(),
            on_deny_list: default_on_deny_list(),
        }
    }
}

impl GateMessages {
    pub fn for_reason(&self, reason: RejectReason) -> &str {
        match reason {
            RejectReason::NotOnAllowList => &self.not_on_allow_list,
            RejectReason::OnDenyList => &self.on_deny_list,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            mode: GateMode::AllowList,
            add_command: default_add_command(),
            remove_command: default_remove_command(),
            command_permission: default_command_permission(),
            admin_exempt_permission: default_admin_exempt_permission(),
            storage_file: default_storage_file(),
            defer_permission_check: false,
            messages: GateMessages::default(),
        }
    }
}

impl GateConfig {
    /// Checks the settings for consistency.
    ///
    /// Command names, capability labels and the storage file must be
    /// non-empty, and the add, remove and toggle commands must have
    /// distinct names.
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("add_command", &self.add_command),
            ("remove_command", &self.remove_command),
            ("command_permission", &self.command_permission),
            ("admin_exempt_permission", &self.admin_exempt_permission),
            ("storage_file", &self.storage_file),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field));
            }
        }

        if self.add_command == self.remove_command {
            return Err(ConfigError::CommandNameClash(self.add_command.clone()));
        }
        for name in [&self.add_command, &self.remove_command] {
            if name == TOGGLE_COMMAND {
                return Err(ConfigError::CommandNameClash(name.clone()));
            }
        }

        Ok(())
    }
}
