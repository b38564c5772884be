//! Two-phase admission.
//!
//! Some hosts have not finished setting up their permission subsystem at
//! the instant a participant connects. With `defer_permission_check`
//! enabled the connection event only hands the candidate over to this
//! queue; the verdict is computed on the next host tick, against the gate
//! state and membership as they are at that moment. Candidates that
//! disconnected in between are dropped without a verdict.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::types::Candidate;

#[derive(Debug)]
pub struct DeferredAdmissions {
    tx: UnboundedSender<Candidate>,
    rx: UnboundedReceiver<Candidate>,
}

impl DeferredAdmissions {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Queue `candidate` for confirmation on the next tick.
    pub fn schedule(&self, candidate: Candidate) {
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.tx.send(candidate);
    }

    /// Remove and return every candidate scheduled so far, oldest first.
    pub fn take_due(&mut self) -> Vec<Candidate> {
        let mut due = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(candidate) => due.push(candidate),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for DeferredAdmissions {
    fn default() -> Self {
        Self::new()
    }
}
