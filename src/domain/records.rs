//! Typed records for the ledger: users, positions, transactions, quotes.

use chrono::NaiveDateTime;

/// A registered account. The password hash is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Aggregated holding of one symbol for one user. Unique per
/// (user_id, symbol); the row is deleted when quantity reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub user_id: i64,
    pub symbol: String,
    pub quantity: i64,
}

/// One entry in the append-only trade history. Quantity is signed:
/// positive for buys, negative for sells.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub user_id: i64,
    pub company: String,
    pub quantity: i64,
    pub price: f64,
    pub executed_at: NaiveDateTime,
    pub symbol: String,
}

/// Externally sourced name and current price for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
}
