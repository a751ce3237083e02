//! Read-only portfolio valuation against live quotes.

use super::error::PapertradeError;
use crate::ports::quote_port::QuotePort;
use crate::ports::store_port::StorePort;

/// One held position priced at the current quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub company: String,
    pub quantity: i64,
    pub price: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioView {
    pub holdings: Vec<Holding>,
    pub cash: f64,
    /// Market value of all holdings plus cash. Depends on live quotes,
    /// so it can change between calls.
    pub grand_total: f64,
}

/// Value every held position at its current quote and add the cash
/// balance. No side effects. A held symbol that no longer resolves is a
/// `SymbolNotFound` error rather than a silently dropped row.
pub fn value_portfolio(
    store: &dyn StorePort,
    quotes: &dyn QuotePort,
    user_id: i64,
) -> Result<PortfolioView, PapertradeError> {
    let positions = store.list_positions(user_id)?;

    let mut holdings = Vec::with_capacity(positions.len());
    let mut total = 0.0;
    for position in positions {
        let quote = quotes.lookup(&position.symbol)?.ok_or_else(|| {
            PapertradeError::SymbolNotFound {
                symbol: position.symbol.clone(),
            }
        })?;
        let value = position.quantity as f64 * quote.price;
        total += value;
        holdings.push(Holding {
            symbol: position.symbol,
            company: quote.name,
            quantity: position.quantity,
            price: quote.price,
            value,
        });
    }

    let cash = store.get_cash(user_id)?;
    Ok(PortfolioView {
        holdings,
        cash,
        grand_total: total + cash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::TradeOutcome;
    use crate::domain::records::{Position, Quote, Transaction, User};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    struct FixedStore {
        cash: f64,
        positions: Vec<Position>,
    }

    impl StorePort for FixedStore {
        fn create_user(
            &self,
            _username: &str,
            _password_hash: &str,
            _starting_cash: f64,
        ) -> Result<User, PapertradeError> {
            unimplemented!()
        }

        fn get_user_by_username(&self, _username: &str) -> Result<Option<User>, PapertradeError> {
            Ok(None)
        }

        fn get_user_by_id(&self, _id: i64) -> Result<Option<User>, PapertradeError> {
            Ok(None)
        }

        fn get_cash(&self, _user_id: i64) -> Result<f64, PapertradeError> {
            Ok(self.cash)
        }

        fn get_position(
            &self,
            _user_id: i64,
            symbol: &str,
        ) -> Result<Option<Position>, PapertradeError> {
            Ok(self.positions.iter().find(|p| p.symbol == symbol).cloned())
        }

        fn list_positions(&self, _user_id: i64) -> Result<Vec<Position>, PapertradeError> {
            Ok(self.positions.clone())
        }

        fn list_transactions(&self, _user_id: i64) -> Result<Vec<Transaction>, PapertradeError> {
            Ok(Vec::new())
        }

        fn apply_trade(&self, _outcome: &TradeOutcome) -> Result<(), PapertradeError> {
            unimplemented!()
        }
    }

    struct FixedQuotes {
        prices: HashMap<String, f64>,
    }

    impl QuotePort for FixedQuotes {
        fn lookup(&self, symbol: &str) -> Result<Option<Quote>, PapertradeError> {
            Ok(self.prices.get(symbol).map(|price| Quote {
                symbol: symbol.to_string(),
                name: format!("{symbol} Corp"),
                price: *price,
            }))
        }
    }

    fn position(symbol: &str, quantity: i64) -> Position {
        Position {
            user_id: 1,
            symbol: symbol.to_string(),
            quantity,
        }
    }

    #[test]
    fn empty_portfolio_is_just_cash() {
        let store = FixedStore {
            cash: 10_000.0,
            positions: Vec::new(),
        };
        let quotes = FixedQuotes {
            prices: HashMap::new(),
        };

        let view = value_portfolio(&store, &quotes, 1).unwrap();
        assert!(view.holdings.is_empty());
        assert_relative_eq!(view.cash, 10_000.0);
        assert_relative_eq!(view.grand_total, 10_000.0);
    }

    #[test]
    fn holdings_are_priced_at_current_quotes() {
        let store = FixedStore {
            cash: 1_000.0,
            positions: vec![position("AAA", 10), position("BBB", 3)],
        };
        let quotes = FixedQuotes {
            prices: HashMap::from([("AAA".to_string(), 50.0), ("BBB".to_string(), 200.0)]),
        };

        let view = value_portfolio(&store, &quotes, 1).unwrap();
        assert_eq!(view.holdings.len(), 2);
        assert_relative_eq!(view.holdings[0].value, 500.0);
        assert_relative_eq!(view.holdings[1].value, 600.0);
        assert_relative_eq!(view.grand_total, 2_100.0);
    }

    #[test]
    fn unresolvable_held_symbol_is_an_error() {
        let store = FixedStore {
            cash: 0.0,
            positions: vec![position("GONE", 5)],
        };
        let quotes = FixedQuotes {
            prices: HashMap::new(),
        };

        let result = value_portfolio(&store, &quotes, 1);
        assert!(matches!(
            result,
            Err(PapertradeError::SymbolNotFound { .. })
        ));
    }
}
