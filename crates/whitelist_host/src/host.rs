//! Console host: owns the sessions and feeds host events to the gate.

use plugin_whitelist::{
    Admission, Candidate, CommandOutcome, GateEvents, Identity, Invoker, Liveness,
    PermissionQuery, Rejection, Verdict, WhitelistPlugin,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{error, info, warn};

use crate::console::HostEvent;

/// Static permission table taken from the `[permissions]` config section.
#[derive(Debug, Default)]
pub struct PermissionTable {
    grants: HashMap<String, HashSet<String>>,
}

impl PermissionTable {
    pub fn from_config(permissions: &BTreeMap<String, Vec<String>>) -> Self {
        let grants = permissions
            .iter()
            .map(|(identity, perms)| (identity.clone(), perms.iter().cloned().collect()))
            .collect();
        Self { grants }
    }
}

impl PermissionQuery for PermissionTable {
    fn has_permission(&self, identity: &Identity, permission: &str) -> bool {
        self.grants
            .get(identity.as_str())
            .is_some_and(|perms| perms.contains(permission))
    }
}

/// What the host loop should do after handling an event.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ConsoleHost {
    gate: WhitelistPlugin,
    sessions: HashMap<Identity, Liveness>,
}

impl ConsoleHost {
    pub fn new(gate: WhitelistPlugin) -> Self {
        Self {
            gate,
            sessions: HashMap::new(),
        }
    }

    pub fn gate(&self) -> &WhitelistPlugin {
        &self.gate
    }

    pub fn is_online(&self, identity: &str) -> bool {
        self.sessions.contains_key(identity)
    }

    /// Handle one console event, returning the lines to print.
    pub fn handle(&mut self, event: HostEvent) -> (Flow, Vec<String>) {
        let mut out = Vec::new();
        match event {
            HostEvent::Connect(identity) => self.connect(identity, &mut out),
            HostEvent::Disconnect(identity) => {
                if let Some(liveness) = self.sessions.remove(&identity) {
                    liveness.invalidate();
                    out.push(format!("{identity} disconnected"));
                } else {
                    out.push(format!("{identity} is not connected"));
                }
            }
            HostEvent::MapLoad(map) => match self.gate.on_map_load(&map) {
                Ok(()) => out.push(format!(
                    "Map {map} loaded, {} identities on the list",
                    self.gate.members().len()
                )),
                Err(e) => out.push(format!("Map {map} loaded, list reload failed: {e}")),
            },
            HostEvent::ConsoleCommand { name, args } => {
                self.command(Invoker::Console, &name, &args, &mut out)
            }
            HostEvent::PlayerCommand { player, name, args } => {
                if self.is_online(player.as_str()) {
                    self.command(Invoker::Player(player), &name, &args, &mut out)
                } else {
                    out.push(format!("{player} is not connected"));
                }
            }
            HostEvent::Status => out.push(format!(
                "Gate {} ({} mode), {} identities listed, {} online",
                self.gate.state(),
                self.gate.mode(),
                self.gate.members().len(),
                self.sessions.len()
            )),
            HostEvent::Quit => return (Flow::Quit, out),
        }
        (Flow::Continue, out)
    }

    /// Advance one host tick, returning the lines to print.
    pub fn tick(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        for rejection in self.gate.on_tick() {
            self.kick(rejection, &mut out);
        }
        out
    }

    fn connect(&mut self, identity: Identity, out: &mut Vec<String>) {
        let liveness = Liveness::new();
        if let Some(previous) = self.sessions.insert(identity.clone(), liveness.clone()) {
            previous.invalidate();
        }

        match self.gate.on_connect(Candidate::new(identity.clone(), liveness)) {
            Admission::Decided(Verdict::Accept) => out.push(format!("{identity} joined")),
            Admission::Decided(Verdict::Reject(reason)) => {
                let rejection = Rejection {
                    message: self.gate.message_for(reason).to_string(),
                    identity,
                    reason,
                };
                self.kick(rejection, out);
            }
            Admission::Deferred => out.push(format!("{identity} joined (pending confirmation)")),
        }
    }

    fn kick(&mut self, rejection: Rejection, out: &mut Vec<String>) {
        if let Some(liveness) = self.sessions.remove(&rejection.identity) {
            liveness.invalidate();
        }
        info!("👢 Disconnecting {} ({})", rejection.identity, rejection.reason);
        out.push(format!("{} was kicked: {}", rejection.identity, rejection.message));
    }

    fn command(&mut self, invoker: Invoker, name: &str, args: &str, out: &mut Vec<String>) {
        match self.gate.on_command(&invoker, name, args) {
            Ok(CommandOutcome::Reply(lines)) => {
                out.extend(lines.into_iter().map(|line| format!("[Whitelist] {line}")))
            }
            Ok(CommandOutcome::Silent) => {}
            Ok(CommandOutcome::PermissionDenied) => {
                out.push("You do not have permission to use this command.".to_string())
            }
            Ok(CommandOutcome::Unknown) => {
                warn!("Unknown command `{}` from {}", name, invoker);
                out.push(format!("Unknown command: {name}"));
            }
            Err(e) => {
                error!("Command `{}` from {} failed: {}", name, invoker, e);
                out.push(format!("Command failed: {e}"));
            }
        }
    }
}
