//! # Core Type Definitions
//!
//! Fundamental types shared by every part of the whitelist gate.
//!
//! ## Key Types
//!
//! - [`Identity`] - Opaque account token of a connecting participant
//! - [`GateMode`] - Allow-list or deny-list policy, fixed by configuration
//! - [`GateState`] - Runtime on/off switch of the admission check
//! - [`Verdict`] - Outcome of an admission decision
//! - [`Candidate`] - A connecting participant together with its liveness flag

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ConfigError;

// ============================================================================
// Identity
// ============================================================================

/// Unique account token of a participant (for example a platform account id).
///
/// No structure is interpreted: two identities are the same exactly when
/// their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a token verbatim. Trimming is the caller's concern.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Identity {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Gate Mode & State
// ============================================================================

/// Policy applied while the gate is enabled.
///
/// Configured as an integer: `1` selects [`GateMode::AllowList`], `2`
/// selects [`GateMode::DenyList`]. Any other value is rejected when the
/// configuration is parsed, so an unknown mode can never reach the
/// connection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GateMode {
    /// Only members of the list may join
    AllowList,
    /// Members of the list are refused
    DenyList,
}

impl TryFrom<u8> for GateMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GateMode::AllowList),
            2 => Ok(GateMode::DenyList),
            other => Err(ConfigError::UnknownMode(other)),
        }
    }
}

impl From<GateMode> for u8 {
    fn from(mode: GateMode) -> Self {
        match mode {
            GateMode::AllowList => 1,
            GateMode::DenyList => 2,
        }
    }
}

impl fmt::Display for GateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateMode::AllowList => f.write_str("allow-list"),
            GateMode::DenyList => f.write_str("deny-list"),
        }
    }
}

/// Runtime switch of the gate. Lives only in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Every candidate is admitted without further checks
    #[default]
    Disabled,
    /// Candidates are checked against mode, exemption and membership
    Enabled,
}

impl GateState {
    pub fn flipped(self) -> Self {
        match self {
            GateState::Disabled => GateState::Enabled,
            GateState::Enabled => GateState::Disabled,
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Disabled => f.write_str("disabled"),
            GateState::Enabled => f.write_str("enabled"),
        }
    }
}

// ============================================================================
// Verdicts
// ============================================================================

/// Why a candidate was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotOnAllowList,
    OnDenyList,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotOnAllowList => f.write_str("not on allow list"),
            RejectReason::OnDenyList => f.write_str("on deny list"),
        }
    }
}

/// Result of an admission decision. The gate never terminates a
/// connection itself; the host acts on a [`Verdict::Reject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Verdict::Accept => None,
            Verdict::Reject(reason) => Some(*reason),
        }
    }
}

// ============================================================================
// Candidates & Invokers
// ============================================================================

/// Shared liveness flag of a connection.
///
/// The host keeps one clone and calls [`Liveness::invalidate`] when the
/// participant drops; the gate keeps another to detect stale candidates
/// before applying a deferred verdict.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_valid(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn invalidate(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// A participant that has just finished connecting.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub identity: Identity,
    pub liveness: Liveness,
}

impl Candidate {
    pub fn new(identity: impl Into<Identity>, liveness: Liveness) -> Self {
        Self {
            identity: identity.into(),
            liveness,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.liveness.is_valid()
    }
}

/// Originator of an administrative command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invoker {
    /// The server console, always authorised
    Console,
    /// A connected participant, authorised by permission lookup
    Player(Identity),
}

impl fmt::Display for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invoker::Console => f.write_str("console"),
            Invoker::Player(identity) => write!(f, "player {identity}"),
        }
    }
}
