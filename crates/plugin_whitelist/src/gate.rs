//! Runtime on/off switch of the gate.
//!
//! The switch exists only in process memory. A new [`GateSwitch`] is always
//! [`GateState::Disabled`], so a restarted server comes back open, and
//! nothing but an explicit [`GateSwitch::toggle`] ever changes it. Map
//! changes reload the membership list and leave the switch alone.

use tracing::info;

use crate::types::GateState;

#[derive(Debug, Default)]
pub struct GateSwitch {
    state: GateState,
}

impl GateSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the switch and return the new state.
    pub fn toggle(&mut self) -> GateState {
        self.state = self.state.flipped();
        info!("🚦 Whitelist gate is now {}", self.state);
        self.state
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == GateState::Enabled
    }
}
