//! Trade planning: pure functions that turn an order intent plus the
//! current ledger state into the set of store mutations to apply.
//!
//! No I/O happens here. Callers fetch cash and the existing position,
//! call [`execute_buy`] or [`execute_sell`], and hand the resulting
//! [`TradeOutcome`] to `StorePort::apply_trade`, which applies all three
//! mutations in one database transaction.

use chrono::NaiveDateTime;

use super::error::PapertradeError;
use super::records::{Quote, Transaction};

/// The complete effect of one executed order.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    /// Cash balance after the trade.
    pub cash_after: f64,
    /// Position quantity after the trade; `None` means the position row
    /// is deleted (sell brought it to exactly zero).
    pub position_after: Option<i64>,
    /// History entry to append.
    pub transaction: Transaction,
}

/// Plan a market buy of `quantity` shares at the quoted price.
///
/// `held` is the quantity of an existing position in this symbol, if any.
pub fn execute_buy(
    user_id: i64,
    cash: f64,
    held: Option<i64>,
    quote: &Quote,
    quantity: i64,
    executed_at: NaiveDateTime,
) -> Result<TradeOutcome, PapertradeError> {
    validate_quantity(quantity)?;

    let cost = quote.price * quantity as f64;
    if cash < cost {
        return Err(PapertradeError::InsufficientFunds {
            needed: cost,
            available: cash,
        });
    }

    Ok(TradeOutcome {
        cash_after: cash - cost,
        position_after: Some(held.unwrap_or(0) + quantity),
        transaction: Transaction {
            user_id,
            company: quote.name.clone(),
            quantity,
            price: quote.price,
            executed_at,
            symbol: quote.symbol.clone(),
        },
    })
}

/// Plan a market sell of `quantity` shares at the quoted price.
///
/// A missing position counts as holding zero shares.
pub fn execute_sell(
    user_id: i64,
    cash: f64,
    held: Option<i64>,
    quote: &Quote,
    quantity: i64,
    executed_at: NaiveDateTime,
) -> Result<TradeOutcome, PapertradeError> {
    validate_quantity(quantity)?;

    let held = held.unwrap_or(0);
    if quantity > held {
        return Err(PapertradeError::InsufficientShares {
            symbol: quote.symbol.clone(),
            requested: quantity,
            held,
        });
    }

    let remaining = held - quantity;
    Ok(TradeOutcome {
        cash_after: cash + quote.price * quantity as f64,
        position_after: if remaining == 0 { None } else { Some(remaining) },
        transaction: Transaction {
            user_id,
            company: quote.name.clone(),
            quantity: -quantity,
            price: quote.price,
            executed_at,
            symbol: quote.symbol.clone(),
        },
    })
}

fn validate_quantity(quantity: i64) -> Result<(), PapertradeError> {
    if quantity < 1 {
        return Err(PapertradeError::Validation {
            reason: "number of shares must be 1 or greater".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: format!("{symbol} Corp"),
            price,
        }
    }

    fn when() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn buy_deducts_cost_and_creates_position() {
        let outcome = execute_buy(1, 10_000.0, None, &quote("AAA", 50.0), 10, when()).unwrap();

        assert_relative_eq!(outcome.cash_after, 9_500.0);
        assert_eq!(outcome.position_after, Some(10));
        assert_eq!(outcome.transaction.quantity, 10);
        assert_relative_eq!(outcome.transaction.price, 50.0);
        assert_eq!(outcome.transaction.symbol, "AAA");
        assert_eq!(outcome.transaction.company, "AAA Corp");
    }

    #[test]
    fn buy_adds_to_existing_position() {
        let outcome = execute_buy(1, 10_000.0, Some(5), &quote("AAA", 50.0), 10, when()).unwrap();
        assert_eq!(outcome.position_after, Some(15));
    }

    #[test]
    fn buy_rejects_insufficient_funds() {
        let result = execute_buy(1, 100.0, None, &quote("AAA", 50.0), 10, when());
        match result {
            Err(PapertradeError::InsufficientFunds { needed, available }) => {
                assert_relative_eq!(needed, 500.0);
                assert_relative_eq!(available, 100.0);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn buy_rejects_non_positive_quantity() {
        for quantity in [0, -1, -100] {
            let result = execute_buy(1, 10_000.0, None, &quote("AAA", 50.0), quantity, when());
            assert!(matches!(result, Err(PapertradeError::Validation { .. })));
        }
    }

    #[test]
    fn sell_credits_proceeds_and_decrements_position() {
        let outcome = execute_sell(1, 1_000.0, Some(10), &quote("AAA", 60.0), 4, when()).unwrap();

        assert_relative_eq!(outcome.cash_after, 1_240.0);
        assert_eq!(outcome.position_after, Some(6));
        assert_eq!(outcome.transaction.quantity, -4);
    }

    #[test]
    fn sell_to_zero_deletes_position() {
        let outcome = execute_sell(1, 0.0, Some(10), &quote("AAA", 60.0), 10, when()).unwrap();
        assert_eq!(outcome.position_after, None);
    }

    #[test]
    fn sell_rejects_more_than_held() {
        let result = execute_sell(1, 0.0, Some(3), &quote("AAA", 60.0), 4, when());
        match result {
            Err(PapertradeError::InsufficientShares {
                symbol,
                requested,
                held,
            }) => {
                assert_eq!(symbol, "AAA");
                assert_eq!(requested, 4);
                assert_eq!(held, 3);
            }
            other => panic!("expected InsufficientShares, got {other:?}"),
        }
    }

    #[test]
    fn sell_without_position_is_rejected() {
        let result = execute_sell(1, 0.0, None, &quote("AAA", 60.0), 1, when());
        assert!(matches!(
            result,
            Err(PapertradeError::InsufficientShares { held: 0, .. })
        ));
    }

    #[test]
    fn sell_rejects_non_positive_quantity() {
        let result = execute_sell(1, 0.0, Some(10), &quote("AAA", 60.0), 0, when());
        assert!(matches!(result, Err(PapertradeError::Validation { .. })));
    }

    // Worked example: start with 10000, buy 10 AAA at 50, sell all at 60.
    #[test]
    fn buy_then_sell_full_round_trip() {
        let buy = execute_buy(7, 10_000.0, None, &quote("AAA", 50.0), 10, when()).unwrap();
        assert_relative_eq!(buy.cash_after, 9_500.0);
        assert_eq!(buy.position_after, Some(10));

        let sell = execute_sell(
            7,
            buy.cash_after,
            buy.position_after,
            &quote("AAA", 60.0),
            10,
            when(),
        )
        .unwrap();
        assert_relative_eq!(sell.cash_after, 10_100.0);
        assert_eq!(sell.position_after, None);
        assert_eq!(sell.transaction.quantity, -10);
        assert_relative_eq!(sell.transaction.price, 60.0);
    }

    proptest! {
        #[test]
        fn valid_buys_deduct_exactly_the_cost(
            cash in 0.0f64..1e9,
            price in 0.01f64..1e4,
            quantity in 1i64..10_000,
            held in proptest::option::of(1i64..10_000),
        ) {
            let cost = price * quantity as f64;
            prop_assume!(cash >= cost);

            let outcome = execute_buy(1, cash, held, &quote("AAA", price), quantity, when()).unwrap();
            prop_assert!((outcome.cash_after - (cash - cost)).abs() < 1e-6);
            prop_assert_eq!(outcome.position_after, Some(held.unwrap_or(0) + quantity));
            prop_assert_eq!(outcome.transaction.quantity, quantity);
        }

        #[test]
        fn valid_sells_credit_exactly_the_proceeds(
            cash in 0.0f64..1e9,
            price in 0.01f64..1e4,
            held in 1i64..10_000,
            quantity in 1i64..10_000,
        ) {
            prop_assume!(quantity <= held);

            let outcome = execute_sell(1, cash, Some(held), &quote("AAA", price), quantity, when()).unwrap();
            prop_assert!((outcome.cash_after - (cash + price * quantity as f64)).abs() < 1e-6);
            if quantity == held {
                prop_assert_eq!(outcome.position_after, None);
            } else {
                prop_assert_eq!(outcome.position_after, Some(held - quantity));
            }
        }

        #[test]
        fn overdrawn_buys_never_succeed(
            cash in 0.0f64..1e6,
            price in 0.01f64..1e4,
            quantity in 1i64..10_000,
        ) {
            prop_assume!(cash < price * quantity as f64);
            let result = execute_buy(1, cash, None, &quote("AAA", price), quantity, when());
            prop_assert!(
                matches!(result, Err(PapertradeError::InsufficientFunds { .. })),
                "expected InsufficientFunds, got {:?}", result
            );
        }

        #[test]
        fn oversells_never_succeed(
            held in 0i64..1_000,
            quantity in 1i64..10_000,
        ) {
            prop_assume!(quantity > held);
            let result = execute_sell(1, 0.0, Some(held), &quote("AAA", 50.0), quantity, when());
            prop_assert!(
                matches!(result, Err(PapertradeError::InsufficientShares { .. })),
                "expected InsufficientShares, got {:?}", result
            );
        }
    }
}
