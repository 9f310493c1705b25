mod core;
pub mod backend;

pub use crate::core::{Amount, FundsProgress, ProgressView, Standing, GOAL};
pub use crate::core::{ContributionError, LedgerError, LedgerResult};
pub use crate::core::{ContributionForm, FundsLedger, ProgressState};
pub use crate::core::{contribution, form, ledger, progress, state};
