//! Connection admission decision.
//!
//! ## Exemption strategy
//!
//! Trusted operators are recognised by asking the host's permission
//! subsystem whether the candidate holds the configured
//! `admin_exempt_permission`. Membership in the list and the command
//! permission play no part in exemption.

use crate::membership::MembershipStore;
use crate::types::{GateMode, GateState, Identity, RejectReason, Verdict};

/// Permission lookup provided by the host.
pub trait PermissionQuery: Send + Sync {
    /// Whether `identity` currently holds the capability `permission`.
    fn has_permission(&self, identity: &Identity, permission: &str) -> bool;
}

/// Decide whether `identity` may join.
///
/// Checks run in a fixed order and stop at the first that settles the
/// outcome:
///
/// 1. A disabled gate accepts everyone.
/// 2. A candidate for which `is_exempt` returns true is accepted.
/// 3. In allow-list mode, members are accepted and everyone else is
///    rejected with [`RejectReason::NotOnAllowList`].
/// 4. In deny-list mode, members are rejected with
///    [`RejectReason::OnDenyList`] and everyone else is accepted.
///
/// `is_exempt` is only called when the gate is enabled.
pub fn evaluate(
    state: GateState,
    mode: GateMode,
    members: &MembershipStore,
    identity: &Identity,
    is_exempt: impl FnOnce() -> bool,
) -> Verdict {
    if state == GateState::Disabled {
        return Verdict::Accept;
    }

    if is_exempt() {
        return Verdict::Accept;
    }

    let is_member = members.contains(identity.as_str());
    match mode {
        GateMode::AllowList if is_member => Verdict::Accept,
        GateMode::AllowList => Verdict::Reject(RejectReason::NotOnAllowList),
        GateMode::DenyList if is_member => Verdict::Reject(RejectReason::OnDenyList),
        GateMode::DenyList => Verdict::Accept,
    }
}
