use crate::backend::DocumentStore;
use crate::core::error::LedgerResult;
use crate::core::ledger::FundsLedger;
use crate::core::progress::Amount;

/// The "add funds" input, as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContributionForm {
    input: String
}

impl ContributionForm {
    pub fn new() -> ContributionForm {
        ContributionForm::default()
    }

    pub fn with_input(input: &str) -> ContributionForm {
        ContributionForm { input: input.to_owned() }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_owned();
    }

    /// Submits the current input. The field is cleared only once the
    /// contribution was written; rejected input and failed writes keep it
    /// so the same value can be submitted again.
    pub async fn submit<S: DocumentStore>(&mut self, ledger: &FundsLedger<S>) -> LedgerResult<Amount> {
        let total = ledger.submit_contribution(&self.input).await?;
        self.input.clear();
        return Ok(total);
    }
}


#[cfg(test)]
mod tests {
    use crate::backend::{DocumentPath, MemoryStore};
    use crate::core::{ContributionForm, FundsLedger, ProgressState};

    use rstest::rstest;
    use serde_json::json;

    async fn ledger_at(amount: f64) -> FundsLedger<MemoryStore> {
        let store = MemoryStore::with_document(
            DocumentPath::funds_progress(),
            json!({"amount": amount}).as_object().unwrap().clone());
        let ledger = FundsLedger::new(store, ProgressState::default());
        ledger.initialize().await;
        ledger
    }

    #[tokio::test]
    async fn accepted_contribution_clears_input() {
        let ledger = ledger_at(1_900_000.0).await;
        let mut form = ContributionForm::with_input("150000");

        assert_eq!(form.submit(&ledger).await.unwrap(), 2_050_000.0);
        assert_eq!(form.input(), "");
    }

    #[rstest]
    #[case("-5")]
    #[case("abc")]
    #[tokio::test]
    async fn rejected_input_is_kept(#[case] raw: &str) {
        let ledger = ledger_at(10.0).await;
        let mut form = ContributionForm::new();
        form.set_input(raw);

        assert!(form.submit(&ledger).await.is_err());
        assert_eq!(form.input(), raw);
        assert_eq!(ledger.amount(), 10.0);
    }

    #[tokio::test]
    async fn overflowing_total_keeps_input() {
        let ledger = ledger_at(f64::MAX).await;
        let mut form = ContributionForm::with_input("1e308");

        assert!(form.submit(&ledger).await.is_err());
        assert_eq!(form.input(), "1e308");
        assert_eq!(ledger.amount(), f64::MAX);
    }

    #[tokio::test]
    async fn failed_write_keeps_input_for_retry() {
        let ledger = ledger_at(10.0).await;
        ledger.store().fail_writes(true);
        let mut form = ContributionForm::with_input("5");

        assert!(form.submit(&ledger).await.is_err());
        assert_eq!(form.input(), "5");
        assert_eq!(ledger.amount(), 10.0);

        ledger.store().fail_writes(false);
        assert_eq!(form.submit(&ledger).await.unwrap(), 15.0);
        assert_eq!(form.input(), "");
    }
}
