use thiserror::Error;

use crate::backend::StoreError;
use crate::core::progress::Amount;

#[derive(Debug, Error, PartialEq)]
pub enum ContributionError {
    /// Occurs when the input does not describe a finite number.
    #[error("not a number: {0:?}")]
    NotANumber(String),
    /// Occurs when the input is a number below zero;
    /// contributions are never withdrawn.
    #[error("contribution must not be negative: {0}")]
    Negative(Amount),
    /// Occurs when adding the contribution would push the total
    /// past what an amount can hold.
    #[error("contribution of {0} takes the total out of range")]
    TotalOutOfRange(Amount)
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The funds document could not be read, or could not be decoded.
    #[error("failed to read funds progress")]
    ReadFailure(#[source] StoreError),
    /// The new total could not be written back to the store.
    #[error("failed to write funds progress")]
    WriteFailure(#[source] StoreError),
    #[error("invalid contribution")]
    InvalidContribution(#[from] ContributionError)
}

pub type LedgerResult<T> = Result<T, LedgerError>;
