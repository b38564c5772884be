//! The whitelist plugin: wires membership, switch and admission to host events.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::admission::{evaluate, PermissionQuery};
use crate::commands::{
    added_reply, parse_identity, removed_reply, toggled_reply, CommandOutcome, CommandSet,
    GateCommand,
};
use crate::config::GateConfig;
use crate::deferred::DeferredAdmissions;
use crate::error::GateResult;
use crate::gate::GateSwitch;
use crate::membership::MembershipStore;
use crate::storage::BackingStore;
use crate::types::{Candidate, GateMode, GateState, Identity, Invoker, RejectReason, Verdict};

// ============================================================================
// Host-facing interface
// ============================================================================

/// Immediate answer to a connection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The verdict is final
    Decided(Verdict),
    /// The candidate is provisionally in; the verdict follows on the next tick
    Deferred,
}

/// A confirmed refusal the host must enforce by disconnecting the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub identity: Identity,
    pub reason: RejectReason,
    /// Text to show the participant
    pub message: String,
}

/// Events the host delivers to the gate.
///
/// The host owns the event loop and calls these from a single context; the
/// gate is purely reactive and every call returns synchronously.
pub trait GateEvents {
    /// Process start. Loads the identity list; a read failure is fatal.
    fn on_init(&mut self) -> GateResult<()>;

    /// A participant finished connecting.
    fn on_connect(&mut self, candidate: Candidate) -> Admission;

    /// A new map was loaded. Reloads the list and leaves the switch alone.
    fn on_map_load(&mut self, map: &str) -> GateResult<()>;

    /// An administrative command was invoked with its raw argument string.
    fn on_command(
        &mut self,
        invoker: &Invoker,
        name: &str,
        raw_args: &str,
    ) -> GateResult<CommandOutcome>;

    /// One host tick elapsed. Confirms deferred admissions.
    fn on_tick(&mut self) -> Vec<Rejection>;
}

// ============================================================================
// Plugin
// ============================================================================

/// Allow-list / deny-list connection gate.
pub struct WhitelistPlugin {
    name: String,
    config: GateConfig,
    commands: CommandSet,
    members: MembershipStore,
    switch: GateSwitch,
    permissions: Arc<dyn PermissionQuery>,
    deferred: DeferredAdmissions,
}

impl WhitelistPlugin {
    /// Create the plugin with a validated configuration.
    ///
    /// The switch always starts disabled and the membership set empty;
    /// call [`GateEvents::on_init`] to load the list.
    pub fn new(
        config: GateConfig,
        store: Box<dyn BackingStore>,
        permissions: Arc<dyn PermissionQuery>,
    ) -> GateResult<Self> {
        config.validate()?;

        Ok(Self {
            name: "whitelist".to_string(),
            commands: CommandSet::from_config(&config),
            config,
            members: MembershipStore::new(store),
            switch: GateSwitch::new(),
            permissions,
            deferred: DeferredAdmissions::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn state(&self) -> GateState {
        self.switch.state()
    }

    pub fn mode(&self) -> GateMode {
        self.config.mode
    }

    pub fn members(&self) -> &MembershipStore {
        &self.members
    }

    pub fn is_member(&self, identity: &str) -> bool {
        self.members.contains(identity)
    }

    /// Disconnect text configured for `reason`
    pub fn message_for(&self, reason: RejectReason) -> &str {
        self.config.messages.for_reason(reason)
    }

    fn decide(&self, identity: &Identity) -> Verdict {
        evaluate(
            self.switch.state(),
            self.config.mode,
            &self.members,
            identity,
            || {
                self.permissions
                    .has_permission(identity, &self.config.admin_exempt_permission)
            },
        )
    }

    fn is_authorised(&self, invoker: &Invoker) -> bool {
        match invoker {
            Invoker::Console => true,
            Invoker::Player(identity) => self
                .permissions
                .has_permission(identity, &self.config.command_permission),
        }
    }

    fn log_verdict(&self, identity: &Identity, verdict: Verdict) {
        match verdict {
            Verdict::Accept => debug!("✅ Admitted {}", identity),
            Verdict::Reject(reason) => warn!("⛔ Refused {}: {}", identity, reason),
        }
    }
}

impl GateEvents for WhitelistPlugin {
    fn on_init(&mut self) -> GateResult<()> {
        let count = self.members.load()?;
        info!(
            "🛡️ {} v{}: {} mode, {} identities, gate {} (resets to disabled on every restart)",
            self.name,
            self.version(),
            self.config.mode,
            count,
            self.switch.state()
        );
        Ok(())
    }

    fn on_connect(&mut self, candidate: Candidate) -> Admission {
        if !candidate.is_valid() {
            debug!("Ignoring connection of {}: already gone", candidate.identity);
            return Admission::Decided(Verdict::Accept);
        }

        if self.config.defer_permission_check {
            debug!("Deferring admission of {} to the next tick", candidate.identity);
            self.deferred.schedule(candidate);
            return Admission::Deferred;
        }

        let verdict = self.decide(&candidate.identity);
        self.log_verdict(&candidate.identity, verdict);
        Admission::Decided(verdict)
    }

    fn on_map_load(&mut self, map: &str) -> GateResult<()> {
        info!("🗺️ Map {} loaded, reloading identity list", map);
        if let Err(e) = self.members.load() {
            error!(
                "Keeping {} previously loaded identities: {}",
                self.members.len(),
                e
            );
            return Err(e.into());
        }
        Ok(())
    }

    fn on_command(
        &mut self,
        invoker: &Invoker,
        name: &str,
        raw_args: &str,
    ) -> GateResult<CommandOutcome> {
        let Some(command) = self.commands.resolve(name) else {
            return Ok(CommandOutcome::Unknown);
        };

        if !self.is_authorised(invoker) {
            warn!("{} may not run `{}`", invoker, name);
            return Ok(CommandOutcome::PermissionDenied);
        }

        match command {
            GateCommand::Toggle => {
                let state = self.switch.toggle();
                info!("{} switched the gate {}", invoker, state);
                Ok(toggled_reply(state))
            }
            GateCommand::Add => {
                let Some(identity) = parse_identity(raw_args) else {
                    return Ok(CommandOutcome::Silent);
                };
                if self.members.add(identity.clone())? {
                    info!("{} added {} to the list", invoker, identity);
                    Ok(added_reply(&identity))
                } else {
                    Ok(CommandOutcome::Silent)
                }
            }
            GateCommand::Remove => {
                let Some(identity) = parse_identity(raw_args) else {
                    return Ok(CommandOutcome::Silent);
                };
                if self.members.remove(identity.as_str())? {
                    info!("{} removed {} from the list", invoker, identity);
                    Ok(removed_reply(&identity))
                } else {
                    Ok(CommandOutcome::Silent)
                }
            }
        }
    }

    fn on_tick(&mut self) -> Vec<Rejection> {
        let mut rejections = Vec::new();
        for candidate in self.deferred.take_due() {
            if !candidate.is_valid() {
                debug!("Dropping deferred admission of {}: disconnected", candidate.identity);
                continue;
            }

            let verdict = self.decide(&candidate.identity);
            self.log_verdict(&candidate.identity, verdict);
            if let Verdict::Reject(reason) = verdict {
                rejections.push(Rejection {
                    message: self.message_for(reason).to_string(),
                    identity: candidate.identity,
                    reason,
                });
            }
        }
        rejections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GateError;
    use crate::storage::memory::MemoryStore;
    use crate::types::Liveness;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Grants(HashMap<String, Vec<String>>);

    impl Grants {
        fn with(mut self, identity: &str, permission: &str) -> Self {
            self.0
                .entry(identity.to_string())
                .or_default()
                .push(permission.to_string());
            self
        }
    }

    impl PermissionQuery for Grants {
        fn has_permission(&self, identity: &Identity, permission: &str) -> bool {
            self.0
                .get(identity.as_str())
                .is_some_and(|perms| perms.iter().any(|p| p == permission))
        }
    }

    fn plugin_with(
        mode: GateMode,
        contents: &str,
        grants: Grants,
    ) -> (WhitelistPlugin, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::with_contents(contents));
        let config = GateConfig {
            mode,
            ..GateConfig::default()
        };
        let mut plugin =
            WhitelistPlugin::new(config, Box::new(backing.clone()), Arc::new(grants)).unwrap();
        plugin.on_init().unwrap();
        (plugin, backing)
    }

    fn connect(plugin: &mut WhitelistPlugin, id: &str) -> Admission {
        plugin.on_connect(Candidate::new(id, Liveness::new()))
    }

    fn reject(reason: RejectReason) -> Admission {
        Admission::Decided(Verdict::Reject(reason))
    }

    #[test]
    fn test_invalid_config_is_refused_at_construction() {
        let config = GateConfig {
            add_command: String::new(),
            ..GateConfig::default()
        };
        let result = WhitelistPlugin::new(
            config,
            Box::new(Arc::new(MemoryStore::default())),
            Arc::new(Grants::default()),
        );
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_init_failure_is_surfaced() {
        let backing = Arc::new(MemoryStore::with_contents("a\n"));
        backing.fail_reads(true);
        let mut plugin = WhitelistPlugin::new(
            GateConfig::default(),
            Box::new(backing),
            Arc::new(Grants::default()),
        )
        .unwrap();

        assert!(matches!(plugin.on_init(), Err(GateError::Storage(_))));
    }

    #[test]
    fn test_starts_disabled_and_admits_everyone() {
        let (mut plugin, _) = plugin_with(GateMode::AllowList, "member\n", Grants::default());

        assert_eq!(plugin.state(), GateState::Disabled);
        assert_eq!(connect(&mut plugin, "stranger"), Admission::Decided(Verdict::Accept));
    }

    #[test]
    fn test_allow_list_flow() {
        let grants = Grants::default().with("admin", "admin.immunity");
        let (mut plugin, _) = plugin_with(GateMode::AllowList, "member\n", grants);
        plugin.on_command(&Invoker::Console, "whitelist", "").unwrap();

        assert_eq!(connect(&mut plugin, "member"), Admission::Decided(Verdict::Accept));
        assert_eq!(connect(&mut plugin, "admin"), Admission::Decided(Verdict::Accept));
        assert_eq!(
            connect(&mut plugin, "stranger"),
            reject(RejectReason::NotOnAllowList)
        );
    }

    #[test]
    fn test_deny_list_flow() {
        let grants = Grants::default().with("blocked_admin", "admin.immunity");
        let (mut plugin, _) =
            plugin_with(GateMode::DenyList, "blocked\nblocked_admin\n", grants);
        plugin.on_command(&Invoker::Console, "whitelist", "").unwrap();

        assert_eq!(connect(&mut plugin, "blocked"), reject(RejectReason::OnDenyList));
        assert_eq!(
            connect(&mut plugin, "blocked_admin"),
            Admission::Decided(Verdict::Accept)
        );
        assert_eq!(connect(&mut plugin, "visitor"), Admission::Decided(Verdict::Accept));
    }

    #[test]
    fn test_command_permission_does_not_exempt() {
        let grants = Grants::default().with("moderator", "admin.ban");
        let (mut plugin, _) = plugin_with(GateMode::AllowList, "", grants);
        plugin.on_command(&Invoker::Console, "whitelist", "").unwrap();

        assert_eq!(
            connect(&mut plugin, "moderator"),
            reject(RejectReason::NotOnAllowList)
        );
    }

    #[test]
    fn test_map_load_keeps_switch_and_reloads_members() {
        let (mut plugin, backing) = plugin_with(GateMode::AllowList, "a\n", Grants::default());
        plugin.on_command(&Invoker::Console, "whitelist", "").unwrap();

        backing.set_contents("b\n");
        plugin.on_map_load("de_dust2").unwrap();

        assert_eq!(plugin.state(), GateState::Enabled);
        assert!(plugin.is_member("b"));
        assert!(!plugin.is_member("a"));
    }

    #[test]
    fn test_failed_map_load_keeps_members() {
        let (mut plugin, backing) = plugin_with(GateMode::AllowList, "a\n", Grants::default());
        backing.fail_reads(true);

        assert!(plugin.on_map_load("de_inferno").is_err());
        assert!(plugin.is_member("a"));
    }

    #[test]
    fn test_restart_resets_switch() {
        let backing = Arc::new(MemoryStore::with_contents("a\n"));
        let make = || {
            let mut plugin = WhitelistPlugin::new(
                GateConfig::default(),
                Box::new(backing.clone()),
                Arc::new(Grants::default()),
            )
            .unwrap();
            plugin.on_init().unwrap();
            plugin
        };

        let mut first = make();
        first.on_command(&Invoker::Console, "whitelist", "").unwrap();
        assert_eq!(first.state(), GateState::Enabled);
        drop(first);

        let second = make();
        assert_eq!(second.state(), GateState::Disabled);
        assert_eq!(backing.contents().as_deref(), Some("a\n"));
    }

    #[test]
    fn test_add_and_remove_commands() {
        let (mut plugin, backing) = plugin_with(GateMode::AllowList, "", Grants::default());

        let outcome = plugin.on_command(&Invoker::Console, "wl", "76500001").unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Reply(vec!["Added 76500001 to the list.".to_string()])
        );
        assert_eq!(backing.contents().as_deref(), Some("76500001\n"));

        let outcome = plugin.on_command(&Invoker::Console, "wl", "76500001").unwrap();
        assert_eq!(outcome, CommandOutcome::Silent);

        let outcome = plugin.on_command(&Invoker::Console, "uwl", "76500001").unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Reply(vec!["Removed 76500001 from the list.".to_string()])
        );
        assert_eq!(backing.contents().as_deref(), Some(""));

        let outcome = plugin.on_command(&Invoker::Console, "uwl", "76500001").unwrap();
        assert_eq!(outcome, CommandOutcome::Silent);
    }

    #[test]
    fn test_missing_argument_is_silent() {
        let (mut plugin, backing) = plugin_with(GateMode::AllowList, "", Grants::default());

        assert_eq!(
            plugin.on_command(&Invoker::Console, "wl", "").unwrap(),
            CommandOutcome::Silent
        );
        assert_eq!(
            plugin.on_command(&Invoker::Console, "uwl", "  ").unwrap(),
            CommandOutcome::Silent
        );
        assert_eq!(backing.contents().as_deref(), Some(""));
    }

    #[test]
    fn test_failed_persist_is_reported() {
        let (mut plugin, backing) = plugin_with(GateMode::AllowList, "", Grants::default());
        backing.fail_writes(true);

        let result = plugin.on_command(&Invoker::Console, "wl", "76500001");
        assert!(matches!(result, Err(GateError::Storage(_))));
        assert!(!plugin.is_member("76500001"));
    }

    #[test]
    fn test_command_permission_required_for_players() {
        let grants = Grants::default().with("mod", "admin.ban");
        let (mut plugin, _) = plugin_with(GateMode::AllowList, "", grants);
        let player = Invoker::Player(Identity::from("player"));
        let moderator = Invoker::Player(Identity::from("mod"));

        assert_eq!(
            plugin.on_command(&player, "whitelist", "").unwrap(),
            CommandOutcome::PermissionDenied
        );
        assert_eq!(plugin.state(), GateState::Disabled);

        assert!(matches!(
            plugin.on_command(&moderator, "whitelist", "").unwrap(),
            CommandOutcome::Reply(_)
        ));
        assert_eq!(plugin.state(), GateState::Enabled);
    }

    #[test]
    fn test_unknown_command() {
        let (mut plugin, _) = plugin_with(GateMode::AllowList, "", Grants::default());
        assert_eq!(
            plugin.on_command(&Invoker::Console, "kick", "someone").unwrap(),
            CommandOutcome::Unknown
        );
    }

    #[test]
    fn test_stale_candidate_on_connect_is_a_no_op() {
        let (mut plugin, _) = plugin_with(GateMode::AllowList, "", Grants::default());
        plugin.on_command(&Invoker::Console, "whitelist", "").unwrap();

        let liveness = Liveness::new();
        liveness.invalidate();
        let admission = plugin.on_connect(Candidate::new("stranger", liveness));
        assert_eq!(admission, Admission::Decided(Verdict::Accept));
    }
}
