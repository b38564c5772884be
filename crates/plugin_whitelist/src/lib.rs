//! # Whitelist - Connection Gate Plugin
//!
//! Decides at connection time whether a participant may join the server:
//! - Allow-list or deny-list policy, chosen in configuration
//! - Runtime on/off switch that starts disabled on every process start and
//!   survives map changes
//! - Identity list kept in a plain text file, reloaded on every map load
//! - Exemption for holders of an operator capability
//! - Add / remove / toggle commands for administrators
//! - Optional two-phase admission confirmed one host tick later
//!
//! The host owns the connections, the event loop, permission lookups and
//! chat. It reports events through [`GateEvents`] and enforces the
//! verdicts it gets back.
//!
//! ```rust,no_run
//! use plugin_whitelist::*;
//! use std::sync::Arc;
//!
//! struct NoPermissions;
//!
//! impl PermissionQuery for NoPermissions {
//!     fn has_permission(&self, _identity: &Identity, _permission: &str) -> bool {
//!         false
//!     }
//! }
//!
//! # fn main() -> Result<(), GateError> {
//! let store = TextFileStore::new("data/whitelist.txt");
//! let mut gate = WhitelistPlugin::new(GateConfig::default(), Box::new(store), Arc::new(NoPermissions))?;
//! gate.on_init()?;
//!
//! gate.on_command(&Invoker::Console, "whitelist", "")?;
//! let admission = gate.on_connect(Candidate::new("76500001", Liveness::new()));
//! assert_eq!(
//!     admission,
//!     Admission::Decided(Verdict::Reject(RejectReason::NotOnAllowList))
//! );
//! # Ok(())
//! # }
//! ```

pub mod admission;
pub mod commands;
pub mod config;
pub mod deferred;
pub mod error;
pub mod gate;
pub mod membership;
pub mod plugin;
pub mod storage;
pub mod types;

pub use crate::admission::{evaluate, PermissionQuery};
pub use crate::commands::{parse_identity, CommandOutcome, CommandSet, GateCommand};
pub use crate::config::{GateConfig, GateMessages, TOGGLE_COMMAND};
pub use crate::deferred::DeferredAdmissions;
pub use crate::error::*;
pub use crate::gate::GateSwitch;
pub use crate::membership::MembershipStore;
pub use crate::plugin::{Admission, GateEvents, Rejection, WhitelistPlugin};
pub use crate::storage::{BackingStore, TextFileStore};
pub use crate::types::*;
