//! Persistent store port trait.

use crate::domain::error::PapertradeError;
use crate::domain::ledger::TradeOutcome;
use crate::domain::records::{Position, Transaction, User};

/// Contract the ledger logic depends on: users, cash balances, positions
/// and the append-only transaction history.
pub trait StorePort {
    /// Create a user with their initial cash balance. Fails with
    /// `DuplicateUsername` if the username is taken.
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: f64,
    ) -> Result<User, PapertradeError>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, PapertradeError>;

    fn get_user_by_id(&self, id: i64) -> Result<Option<User>, PapertradeError>;

    fn get_cash(&self, user_id: i64) -> Result<f64, PapertradeError>;

    fn get_position(
        &self,
        user_id: i64,
        symbol: &str,
    ) -> Result<Option<Position>, PapertradeError>;

    fn list_positions(&self, user_id: i64) -> Result<Vec<Position>, PapertradeError>;

    /// Full trade history, newest first.
    fn list_transactions(&self, user_id: i64) -> Result<Vec<Transaction>, PapertradeError>;

    /// Apply all effects of one executed order (append the transaction,
    /// set the cash balance, upsert or delete the position) atomically.
    fn apply_trade(&self, outcome: &TradeOutcome) -> Result<(), PapertradeError>;
}
