use std::sync::Arc;

use tokio::sync::watch;

use crate::core::progress::{Amount, ProgressView, GOAL};

/// Owned holder of the in-memory running total.
///
/// The ledger writes to it and the presentation layer reads from it.
/// Clones share the same value, so a single holder can be handed to
/// both sides instead of keeping the total in ambient global state.
#[derive(Clone, Debug)]
pub struct ProgressState {
    goal: Amount,
    amount: Arc<watch::Sender<Amount>>
}

impl ProgressState {
    pub fn new(goal: Amount) -> ProgressState {
        let (sender, _) = watch::channel(0.0);
        ProgressState { goal, amount: Arc::new(sender) }
    }

    pub fn goal(&self) -> Amount {
        self.goal
    }

    pub fn amount(&self) -> Amount {
        *self.amount.borrow()
    }

    pub fn set_amount(&self, amount: Amount) {
        self.amount.send_replace(amount);
    }

    pub fn view(&self) -> ProgressView {
        ProgressView::new(self.amount(), self.goal)
    }

    /// Receiver notified on every change of the amount.
    pub fn subscribe(&self) -> watch::Receiver<Amount> {
        self.amount.subscribe()
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        ProgressState::new(GOAL)
    }
}
