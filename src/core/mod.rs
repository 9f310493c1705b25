pub mod progress;
pub mod state;
pub mod contribution;
pub mod error;
pub mod ledger;
pub mod form;

pub use progress::{Amount, FundsProgress, ProgressView, Standing, GOAL};
pub use state::ProgressState;
pub use error::{ContributionError, LedgerError, LedgerResult};
pub use ledger::FundsLedger;
pub use form::ContributionForm;
