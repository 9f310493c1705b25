use serde_json::Value;

use crate::backend::{Document, DocumentPath, DocumentStore, StoreError};
use crate::core::contribution::parse_contribution;
use crate::core::error::{ContributionError, LedgerError, LedgerResult};
use crate::core::progress::{Amount, FundsProgress};
use crate::core::state::ProgressState;

const AMOUNT_FIELD: &str = "amount";

/// Keeps the in-memory running total in step with the funds document.
///
/// The total is read once with [`FundsLedger::initialize`] and then
/// rewritten on every accepted contribution. Each contribution is a
/// read-modify-write done here, followed by a full replace of the
/// document: two submissions in flight at the same time (from this
/// ledger or from another session sharing the store) compute from the
/// same snapshot, and the last write wins.
pub struct FundsLedger<S> {
    store: S,
    path: DocumentPath,
    state: ProgressState
}

impl<S: DocumentStore> FundsLedger<S> {
    pub fn new(store: S, state: ProgressState) -> FundsLedger<S> {
        FundsLedger { store, path: DocumentPath::funds_progress(), state }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn amount(&self) -> Amount {
        self.state.amount()
    }

    /// Loads the stored total into memory, silently degrading on failure:
    /// the error is logged and the current in-memory value is kept.
    pub async fn initialize(&self) -> Amount {
        match self.load().await {
            Ok(amount) => amount,
            Err(err) => {
                log::error!("Error fetching funds from {}: {}", self.path, describe(&err));
                self.state.amount()
            }
        }
    }

    /// Loads the stored total into memory. A missing document, or one
    /// without an amount, counts as nothing raised yet.
    pub async fn load(&self) -> LedgerResult<Amount> {
        let document = self.store.get(&self.path)
            .await
            .map_err(LedgerError::ReadFailure)?;

        let amount = match document {
            Some(document) => decode_amount(&document).map_err(LedgerError::ReadFailure)?,
            None => 0.0
        };
        log::debug!("Loaded {} from {}", amount, self.path);

        self.state.set_amount(amount);
        return Ok(amount);
    }

    /// Adds a contribution to the running total.
    ///
    /// Invalid input is rejected without touching the store. Otherwise the
    /// whole document is overwritten with the new total, and the in-memory
    /// value only moves once the store acknowledged the write. Write
    /// failures are logged and leave the in-memory value unchanged.
    pub async fn submit_contribution(&self, raw_input: &str) -> LedgerResult<Amount> {
        let contribution = parse_contribution(raw_input).map_err(|err| {
            log::debug!("Ignoring contribution {:?}: {}", raw_input, err);
            err
        })?;

        let new_amount = self.state.amount() + contribution;
        if !new_amount.is_finite() {
            log::debug!("Ignoring contribution {:?}: total would overflow", raw_input);
            return Err(ContributionError::TotalOutOfRange(contribution).into());
        }
        let progress = FundsProgress::new(new_amount);

        if let Err(err) = self.store.set(&self.path, encode(&progress)).await {
            log::error!("Error saving funds to {}: {}", self.path, err);
            return Err(LedgerError::WriteFailure(err));
        }

        log::info!("Added {} to funds, total now {}", contribution, new_amount);
        self.state.set_amount(new_amount);
        return Ok(new_amount);
    }
}

fn describe(err: &LedgerError) -> String {
    match err {
        LedgerError::ReadFailure(source) | LedgerError::WriteFailure(source) => format!("{}: {}", err, source),
        other => other.to_string()
    }
}

fn decode_amount(document: &Document) -> Result<Amount, StoreError> {
    match document.get(AMOUNT_FIELD) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(number)) => number.as_f64()
            .filter(|amount| amount.is_finite() && *amount >= 0.0)
            .ok_or_else(|| StoreError::Malformed(format!("amount out of range: {}", number))),
        Some(other) => Err(StoreError::Malformed(format!("amount is not a number: {}", other)))
    }
}

fn encode(progress: &FundsProgress) -> Document {
    let mut document = Document::new();
    document.insert(AMOUNT_FIELD.to_owned(), Value::from(progress.amount));
    document
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::backend::{Document, DocumentPath, DocumentStore, MemoryStore, StoreResult};
    use crate::core::{FundsLedger, ProgressState};
    use crate::core::error::{ContributionError, LedgerError};
    use crate::core::progress::Standing;

    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn progress(value: serde_json::Value) -> MemoryStore {
        MemoryStore::with_document(DocumentPath::funds_progress(), value.as_object().unwrap().clone())
    }

    async fn stored(store: &MemoryStore) -> Option<Document> {
        store.get(&DocumentPath::funds_progress()).await.unwrap()
    }

    #[fixture]
    fn empty_ledger() -> FundsLedger<MemoryStore> {
        FundsLedger::new(MemoryStore::new(), ProgressState::default())
    }

    #[rstest]
    #[tokio::test]
    async fn no_document_initializes_to_zero(empty_ledger: FundsLedger<MemoryStore>) {
        assert_eq!(empty_ledger.initialize().await, 0.0);
        assert_eq!(empty_ledger.amount(), 0.0);
    }

    #[tokio::test]
    async fn initializes_from_stored_amount() {
        let ledger = FundsLedger::new(progress(json!({"amount": 500000})), ProgressState::default());

        assert_eq!(ledger.initialize().await, 500_000.0);
        assert_eq!(ledger.state().view().remaining, 1_500_000.0);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"amount": null}))]
    #[case(json!({"note": "created by hand"}))]
    #[tokio::test]
    async fn document_without_amount_is_zero(#[case] document: serde_json::Value) {
        let state = ProgressState::default();
        state.set_amount(10.0);
        let ledger = FundsLedger::new(progress(document), state);

        assert_eq!(ledger.initialize().await, 0.0);
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let ledger = FundsLedger::new(progress(json!({"amount": 1234.5})), ProgressState::default());

        let first = ledger.initialize().await;
        let second = ledger.initialize().await;

        assert_eq!(first, 1234.5);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn read_failure_keeps_current_amount() {
        let store = progress(json!({"amount": 500000}));
        store.fail_reads(true);
        let ledger = FundsLedger::new(store, ProgressState::default());

        assert_eq!(ledger.initialize().await, 0.0);
        assert!(matches!(ledger.load().await, Err(LedgerError::ReadFailure(..))));
    }

    #[rstest]
    #[case(json!({"amount": "lots"}))]
    #[case(json!({"amount": -3}))]
    #[tokio::test]
    async fn malformed_amount_is_read_failure(#[case] document: serde_json::Value) {
        let state = ProgressState::default();
        state.set_amount(75.0);
        let ledger = FundsLedger::new(progress(document), state);

        assert!(matches!(ledger.load().await, Err(LedgerError::ReadFailure(..))));
        assert_eq!(ledger.initialize().await, 75.0);
    }

    #[rstest]
    #[case("100", 100.0)]
    #[case("0", 0.0)]
    #[case("", 0.0)]
    #[case("2.5", 2.5)]
    #[tokio::test]
    async fn contribution_adds_exactly(empty_ledger: FundsLedger<MemoryStore>, #[case] raw: &str, #[case] expected: f64) {
        empty_ledger.state().set_amount(1000.0);

        let total = empty_ledger.submit_contribution(raw).await.unwrap();

        assert_eq!(total, 1000.0 + expected);
        assert_eq!(empty_ledger.amount(), 1000.0 + expected);
        assert_eq!(stored(empty_ledger.store()).await, json!({"amount": 1000.0 + expected}).as_object().cloned());
    }

    #[tokio::test]
    async fn overflowing_total_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let ledger = FundsLedger::new(store.clone(), ProgressState::default());
        ledger.submit_contribution("1e308").await.unwrap();

        let res = ledger.submit_contribution("1e308").await;

        assert!(matches!(res, Err(LedgerError::InvalidContribution(ContributionError::TotalOutOfRange(..)))));
        assert_eq!(ledger.amount(), 1e308);
        assert_eq!(store.writes(), 1);

        // the stored total survives for the next session
        let reloaded = FundsLedger::new(store, ProgressState::default());
        assert_eq!(reloaded.initialize().await, 1e308);
    }

    #[tokio::test]
    async fn crossing_the_goal() {
        let ledger = FundsLedger::new(progress(json!({"amount": 1900000})), ProgressState::default());
        ledger.initialize().await;

        assert_eq!(ledger.submit_contribution("150000").await.unwrap(), 2_050_000.0);

        let view = ledger.state().view();
        assert_eq!(view.surplus, 50_000.0);
        assert_eq!(view.standing, Standing::Surplus(50_000.0));
        assert!(view.goal_reached);
    }

    #[rstest]
    #[case("-5")]
    #[case("abc")]
    #[tokio::test]
    async fn invalid_contribution_changes_nothing(#[case] raw: &str) {
        let ledger = FundsLedger::new(progress(json!({"amount": 300})), ProgressState::default());
        ledger.initialize().await;

        let res = ledger.submit_contribution(raw).await;

        assert!(matches!(res, Err(LedgerError::InvalidContribution(..))));
        assert_eq!(ledger.amount(), 300.0);
        assert_eq!(ledger.store().writes(), 0);
    }

    #[tokio::test]
    async fn negative_contribution_reports_value() {
        let ledger = FundsLedger::new(MemoryStore::new(), ProgressState::default());
        let res = ledger.submit_contribution("-5").await;
        assert!(matches!(res, Err(LedgerError::InvalidContribution(ContributionError::Negative(v))) if v == -5.0));
    }

    #[tokio::test]
    async fn write_failure_keeps_amount() {
        let ledger = FundsLedger::new(progress(json!({"amount": 300})), ProgressState::default());
        ledger.initialize().await;
        ledger.store().fail_writes(true);

        let res = ledger.submit_contribution("50").await;

        assert!(matches!(res, Err(LedgerError::WriteFailure(..))));
        assert_eq!(ledger.amount(), 300.0);
        assert_eq!(stored(ledger.store()).await, json!({"amount": 300}).as_object().cloned());

        ledger.store().fail_writes(false);
        assert_eq!(ledger.submit_contribution("50").await.unwrap(), 350.0);
    }

    #[tokio::test]
    async fn concurrent_sessions_lose_an_update() {
        let store = Arc::new(MemoryStore::new());
        let first = FundsLedger::new(store.clone(), ProgressState::default());
        let second = FundsLedger::new(store.clone(), ProgressState::default());
        first.initialize().await;
        second.initialize().await;

        first.submit_contribution("100").await.unwrap();
        second.submit_contribution("50").await.unwrap();

        // full replace from a stale snapshot: the first contribution is gone
        assert_eq!(store.get(&DocumentPath::funds_progress()).await.unwrap(),
            json!({"amount": 50.0}).as_object().cloned());
        assert_eq!(first.amount(), 100.0);
        assert_eq!(second.amount(), 50.0);
    }

    /// Memory store whose writes yield once before landing, so that
    /// submissions started together are really in flight together.
    struct SlowStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for SlowStore {
        async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
            self.0.get(path).await
        }

        async fn set(&self, path: &DocumentPath, document: Document) -> StoreResult<()> {
            tokio::task::yield_now().await;
            self.0.set(path, document).await
        }
    }

    #[tokio::test]
    async fn overlapping_submissions_race() {
        let ledger = FundsLedger::new(SlowStore(MemoryStore::new()), ProgressState::default());

        let (a, b) = tokio::join!(ledger.submit_contribution("10"), ledger.submit_contribution("20"));

        // both computed from zero; whichever write landed last is what remains
        assert_eq!((a.unwrap(), b.unwrap()), (10.0, 20.0));
        let last = ledger.amount();
        assert!(last == 10.0 || last == 20.0, "unexpected total {}", last);
        assert_eq!(ledger.store().0.writes(), 2);
        assert_eq!(stored(&ledger.store().0).await, json!({"amount": last}).as_object().cloned());
    }
}
