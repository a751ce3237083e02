//! SQLite ledger store.

use chrono::NaiveDateTime;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::domain::error::PapertradeError;
use crate::domain::ledger::TradeOutcome;
use crate::domain::records::{Position, Transaction, User};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> PapertradeError {
    PapertradeError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> PapertradeError {
    PapertradeError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PapertradeError> {
        let db_path =
            config
                .get_string("database", "path")
                .ok_or_else(|| PapertradeError::ConfigMissing {
                    section: "database".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("database", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, PapertradeError> {
        let manager = SqliteConnectionManager::memory();
        // A single connection so every caller sees the same in-memory db.
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_err)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cash (
                user_id INTEGER PRIMARY KEY REFERENCES users(id),
                amount REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS positions (
                user_id INTEGER NOT NULL REFERENCES users(id),
                symbol TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                PRIMARY KEY (user_id, symbol)
            );
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                company TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                executed_at TEXT NOT NULL,
                symbol TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
        })
    }
}

impl StorePort for SqliteStore {
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_cash: f64,
    ) -> Result<User, PapertradeError> {
        let mut conn = self.pool.get().map_err(pool_err)?;
        let tx = conn.transaction().map_err(query_err)?;

        let insert = tx.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        );
        match insert {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(PapertradeError::DuplicateUsername {
                    username: username.to_string(),
                });
            }
            Err(e) => return Err(query_err(e)),
        }

        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO cash (user_id, amount) VALUES (?1, ?2)",
            params![id, starting_cash],
        )
        .map_err(query_err)?;
        tx.commit().map_err(query_err)?;

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
            params![username],
            Self::row_to_user,
        )
        .optional()
        .map_err(query_err)
    }

    fn get_user_by_id(&self, id: i64) -> Result<Option<User>, PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT id, username, password_hash FROM users WHERE id = ?1",
            params![id],
            Self::row_to_user,
        )
        .optional()
        .map_err(query_err)
    }

    fn get_cash(&self, user_id: i64) -> Result<f64, PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT amount FROM cash WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(query_err)?
        .ok_or_else(|| PapertradeError::DatabaseQuery {
            reason: format!("no cash balance for user {user_id}"),
        })
    }

    fn get_position(
        &self,
        user_id: i64,
        symbol: &str,
    ) -> Result<Option<Position>, PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;
        conn.query_row(
            "SELECT user_id, symbol, quantity FROM positions
             WHERE user_id = ?1 AND symbol = ?2",
            params![user_id, symbol],
            |row| {
                Ok(Position {
                    user_id: row.get(0)?,
                    symbol: row.get(1)?,
                    quantity: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(query_err)
    }

    fn list_positions(&self, user_id: i64) -> Result<Vec<Position>, PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT user_id, symbol, quantity FROM positions
                 WHERE user_id = ?1 ORDER BY symbol",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(Position {
                    user_id: row.get(0)?,
                    symbol: row.get(1)?,
                    quantity: row.get(2)?,
                })
            })
            .map_err(query_err)?;

        let mut positions = Vec::new();
        for row in rows {
            positions.push(row.map_err(query_err)?);
        }
        Ok(positions)
    }

    fn list_transactions(&self, user_id: i64) -> Result<Vec<Transaction>, PapertradeError> {
        let conn = self.pool.get().map_err(pool_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT user_id, company, quantity, price, executed_at, symbol
                 FROM transactions WHERE user_id = ?1
                 ORDER BY executed_at DESC, id DESC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                let executed_str: String = row.get(4)?;
                let executed_at = NaiveDateTime::parse_from_str(&executed_str, DATETIME_FORMAT)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            executed_str.len(),
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                Ok(Transaction {
                    user_id: row.get(0)?,
                    company: row.get(1)?,
                    quantity: row.get(2)?,
                    price: row.get(3)?,
                    executed_at,
                    symbol: row.get(5)?,
                })
            })
            .map_err(query_err)?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row.map_err(query_err)?);
        }
        Ok(transactions)
    }

    fn apply_trade(&self, outcome: &TradeOutcome) -> Result<(), PapertradeError> {
        let mut conn = self.pool.get().map_err(pool_err)?;
        let tx = conn.transaction().map_err(query_err)?;

        let record = &outcome.transaction;
        tx.execute(
            "INSERT INTO transactions (user_id, company, quantity, price, executed_at, symbol)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.user_id,
                record.company,
                record.quantity,
                record.price,
                record.executed_at.format(DATETIME_FORMAT).to_string(),
                record.symbol
            ],
        )
        .map_err(query_err)?;

        tx.execute(
            "UPDATE cash SET amount = ?1 WHERE user_id = ?2",
            params![outcome.cash_after, record.user_id],
        )
        .map_err(query_err)?;

        match outcome.position_after {
            Some(quantity) => {
                tx.execute(
                    "INSERT INTO positions (user_id, symbol, quantity) VALUES (?1, ?2, ?3)
                     ON CONFLICT(user_id, symbol) DO UPDATE SET quantity = excluded.quantity",
                    params![record.user_id, record.symbol, quantity],
                )
                .map_err(query_err)?;
            }
            None => {
                tx.execute(
                    "DELETE FROM positions WHERE user_id = ?1 AND symbol = ?2",
                    params![record.user_id, record.symbol],
                )
                .map_err(query_err)?;
            }
        }

        tx.commit().map_err(query_err)
    }
}
